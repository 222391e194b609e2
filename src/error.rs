//! Shell error types.
//!
//! Errors are categorized by where they are allowed to stop the world:
//!
//! | Category | Variants | Handling |
//! |----------|----------|----------|
//! | **Boundary drift** | `UnknownState` | Contained at the bridge: logged, dropped |
//! | **Wiring** | `UnsupportedBackend` | Fail fast — deployment-time mistake |
//!
//! Task execution errors have no variant here on purpose: the dispatcher
//! neither catches nor retries them, they belong to the submitted task.

use thiserror::Error;

use crate::backend::SchedulingBackend;

/// Errors that can occur in the scheduling/bridge core.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShellError {
    /// A native state index outside the declared enumeration.
    ///
    /// Indicates drift between the native layer and the shell's state
    /// tables. Contained at the bridge (logged and dropped) — must never
    /// crash the process.
    #[error("Unknown {machine} state index {index}")]
    UnknownState {
        /// Tag of the state machine that received the index.
        machine: &'static str,
        /// The out-of-range index as delivered by the native layer.
        index: i32,
    },

    /// A job was routed to a backend it does not support, or to a backend
    /// whose minimum platform capability is not met.
    ///
    /// A programming/wiring error: surfaced immediately, never silently
    /// degraded — silent degradation would leave work unscheduled.
    #[error("Job {job} cannot use backend {backend:?}")]
    UnsupportedBackend {
        /// Name of the logical job.
        job: &'static str,
        /// The backend that was requested or claimed.
        backend: SchedulingBackend,
    },
}

impl ShellError {
    /// Returns `true` if this error indicates a deployment-time wiring
    /// mistake that should fail fast rather than be recovered.
    pub fn is_wiring_error(&self) -> bool {
        matches!(self, Self::UnsupportedBackend { .. })
    }
}

/// Result type for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;
