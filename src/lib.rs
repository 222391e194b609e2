//! mapshell — scheduling identity and native-event bridge core for the
//! map application shell.
//!
//! This crate provides the three pieces of the shell with real
//! invariants, treating everything around them (views, lifecycle glue,
//! the native engine itself) as external collaborators:
//!
//! - A [`Dispatcher`] for the single foreground execution context, with
//!   run / run-later / cancel semantics and only-once synchronous
//!   execution when already on that context
//! - [`JobType`] / [`JobNamespace`] scheduling identity and
//!   capability-gated [`select_backend`] over the available
//!   [`SchedulingBackend`] mechanisms
//! - A generic [`Bridge`] delivering closed [`NativeState`] transitions
//!   (traffic / isolines / transit) to at most one attached listener,
//!   with per-state default actions and telemetry fallback
//!
//! # Event flow
//!
//! ```text
//!   native engine ──→ StateNotifier::notify(index)     (any thread)
//!                          │ marshalled via Dispatcher
//!                          ▼
//!                    Bridge::on_state_changed(index)   (foreground)
//!                          ├─ listener attached → forward once
//!                          └─ none → default action + diagnostic
//!
//!   registration  ──→ select_backend ──→ identifier ──→ BackendSink
//!                     (fresh per call)    (pure fn)     (platform)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mapshell::{Bridge, Dispatcher, StateNotifier, TrafficState};
//! use std::sync::{Arc, Mutex};
//!
//! let dispatcher = Dispatcher::new();
//! let bridge = Arc::new(Mutex::new(Bridge::<TrafficState>::new(notices, telemetry)));
//! let notifier = StateNotifier::new(bridge.clone(), dispatcher.handle());
//! // hand `notifier` to the native layer; attach/detach from UI lifecycle hooks
//! ```

pub mod backend;
pub mod bridge;
pub mod capability;
pub mod dispatch;
pub mod error;
pub mod job;
pub mod state;

pub use backend::{BackendSink, SchedulingBackend, register_job, select_backend};
pub use bridge::{Bridge, NoticeSink, StateListener, StateNotifier, Telemetry};
pub use capability::PlatformCapability;
pub use dispatch::{DispatchHandle, Dispatcher, Task};
pub use error::{ShellError, ShellResult};
pub use job::{JobNamespace, JobType, validate_namespace};
pub use state::{DefaultAction, IsolinesState, NativeState, TrafficState, TransitState};
