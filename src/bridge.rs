//! State-change listener bridge.
//!
//! One bridge per monitored feature (traffic, isolines, transit). The
//! native engine delivers a bare state index; the bridge resolves it and
//! either forwards the state to the one attached listener or performs
//! the state's declared default action:
//!
//! ```text
//!   native index ──→ resolve ──→ listener attached?  ── yes ──→ forward once
//!                       │                │
//!                       │                └─ no ──→ default action
//!                       │                          + diagnostic → telemetry
//!                       └─ out of range ──→ warn + drop
//! ```
//!
//! **Invariants:**
//! - At most one listener: `attach` replaces, `detach` clears.
//! - A detached bridge never invokes a previously attached listener —
//!   stale UI must not be called back into.
//! - The bridge caches no "current" state; it is a pure index → action
//!   dispatcher.
//! - An event with no listener never fails; it falls back to the state's
//!   default action.
//!
//! Bridge methods must run on the foreground execution context. The
//! native layer's callback thread carries no such guarantee, so
//! [`StateNotifier`] marshals delivery through the dispatcher first —
//! the only cross-context boundary in this core.

use std::sync::{Arc, Mutex, PoisonError};

use crate::dispatch::{DispatchHandle, Task};
use crate::state::{DefaultAction, NativeState};

/// Receiver for resolved state transitions of one feature.
pub trait StateListener<S>: Send {
    /// Called once per delivered state event while attached.
    fn on_state_changed(&mut self, state: S);
}

impl<S, F: FnMut(S) + Send> StateListener<S> for F {
    fn on_state_changed(&mut self, state: S) {
        self(state);
    }
}

/// Collaborator showing transient user-facing notices (the default
/// action for data-availability states).
pub trait NoticeSink: Send + Sync {
    /// Show a short-lived, non-blocking notice.
    fn show_notice(&self, message: &str);
}

/// External telemetry collaborator accepting one diagnostic tag per
/// reportable state transition.
pub trait Telemetry: Send + Sync {
    /// Record `tag` for this transition.
    fn report(&self, tag: &str);
}

/// Attach/detach wrapper delivering native state transitions to at most
/// one listener, with a defined default fallback.
pub struct Bridge<S: NativeState> {
    listener: Option<Box<dyn StateListener<S>>>,
    notices: Arc<dyn NoticeSink>,
    telemetry: Arc<dyn Telemetry>,
}

impl<S: NativeState> Bridge<S> {
    /// Build a bridge with its notice and telemetry collaborators.
    pub fn new(notices: Arc<dyn NoticeSink>, telemetry: Arc<dyn Telemetry>) -> Self {
        Self {
            listener: None,
            notices,
            telemetry,
        }
    }

    /// Attach `listener`, unconditionally replacing any previous one.
    pub fn attach(&mut self, listener: impl StateListener<S> + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Clear the attached listener. Subsequent events fall back to the
    /// per-state default action until the next [`attach`](Self::attach).
    pub fn detach(&mut self) {
        self.listener = None;
    }

    /// Whether a listener is currently attached.
    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    /// Handle one native state event. Must run on the foreground
    /// execution context (see [`StateNotifier`]).
    ///
    /// An out-of-range index is logged and dropped — native/shell table
    /// drift must not crash the process.
    pub fn on_state_changed(&mut self, index: i32) {
        let state = match S::from_index(index) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(%err, "dropping native state event");
                return;
            }
        };
        tracing::trace!(machine = S::MACHINE, state = state.name(), "state changed");

        if let Some(listener) = self.listener.as_mut() {
            listener.on_state_changed(state);
            return;
        }

        match state.default_action() {
            DefaultAction::Silent => {}
            DefaultAction::Notice(message) => self.notices.show_notice(message),
        }
        if let Some(tag) = state.diagnostic() {
            self.telemetry.report(tag);
        }
    }
}

/// `Send + Clone` handle registered with the native layer.
///
/// [`notify`](Self::notify) may be called from any thread (the native
/// callback thread in particular); delivery is marshalled onto the
/// foreground context through the dispatcher before it reaches the
/// bridge.
pub struct StateNotifier<S: NativeState> {
    bridge: Arc<Mutex<Bridge<S>>>,
    dispatch: DispatchHandle,
}

impl<S: NativeState> Clone for StateNotifier<S> {
    fn clone(&self) -> Self {
        Self {
            bridge: Arc::clone(&self.bridge),
            dispatch: self.dispatch.clone(),
        }
    }
}

impl<S: NativeState> StateNotifier<S> {
    /// Pair `bridge` with the foreground dispatcher.
    pub fn new(bridge: Arc<Mutex<Bridge<S>>>, dispatch: DispatchHandle) -> Self {
        Self { bridge, dispatch }
    }

    /// Deliver one native state index to the bridge on the foreground
    /// context. One-way: errors past the bridge boundary do not exist.
    pub fn notify(&self, index: i32) {
        let bridge = Arc::clone(&self.bridge);
        self.dispatch.run(Task::new(move || {
            // The bridge's only state is the listener slot, so a guard
            // poisoned by a panicking task is safe to take over.
            let mut bridge = bridge.lock().unwrap_or_else(PoisonError::into_inner);
            bridge.on_state_changed(index);
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::state::{IsolinesState, TrafficState, TransitState};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        notices: Mutex<Vec<String>>,
        reports: Mutex<Vec<String>>,
    }

    impl NoticeSink for Recorder {
        fn show_notice(&self, message: &str) {
            self.notices.lock().unwrap().push(message.to_string());
        }
    }

    impl Telemetry for Recorder {
        fn report(&self, tag: &str) {
            self.reports.lock().unwrap().push(tag.to_string());
        }
    }

    fn traffic_bridge() -> (Bridge<TrafficState>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let bridge = Bridge::new(recorder.clone(), recorder.clone());
        (bridge, recorder)
    }

    #[test]
    fn test_no_listener_runs_default_action_once() {
        let (mut bridge, recorder) = traffic_bridge();

        // Index 4 is NoData.
        bridge.on_state_changed(4);

        assert_eq!(recorder.notices.lock().unwrap().len(), 1);
        assert_eq!(*recorder.reports.lock().unwrap(), vec!["UNAVAILABLE"]);
    }

    #[test]
    fn test_no_listener_silent_state_reports_nothing() {
        let (mut bridge, recorder) = traffic_bridge();

        bridge.on_state_changed(1); // Enabled

        assert!(recorder.notices.lock().unwrap().is_empty());
        assert!(recorder.reports.lock().unwrap().is_empty());
    }

    #[test]
    fn test_attached_listener_gets_event_and_no_default() {
        let (mut bridge, recorder) = traffic_bridge();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let listener_seen = Arc::clone(&seen);
        bridge.attach(move |state: TrafficState| {
            listener_seen.lock().unwrap().push(state);
        });

        bridge.on_state_changed(4);

        assert_eq!(*seen.lock().unwrap(), vec![TrafficState::NoData]);
        assert!(recorder.notices.lock().unwrap().is_empty());
        assert!(recorder.reports.lock().unwrap().is_empty());
    }

    #[test]
    fn test_attach_replaces_previous_listener() {
        let (mut bridge, _recorder) = traffic_bridge();
        let first = Arc::new(Mutex::new(0));
        let second = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&first);
        bridge.attach(move |_: TrafficState| *counter.lock().unwrap() += 1);
        let counter = Arc::clone(&second);
        bridge.attach(move |_: TrafficState| *counter.lock().unwrap() += 1);

        bridge.on_state_changed(1);

        assert_eq!(*first.lock().unwrap(), 0);
        assert_eq!(*second.lock().unwrap(), 1);
    }

    #[test]
    fn test_detach_stops_delivery_to_old_listener() {
        let (mut bridge, recorder) = traffic_bridge();
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        bridge.attach(move |_: TrafficState| *counter.lock().unwrap() += 1);
        assert!(bridge.is_attached());

        bridge.detach();
        assert!(!bridge.is_attached());
        bridge.on_state_changed(4);

        assert_eq!(*count.lock().unwrap(), 0);
        // Fallback behavior resumes after detach.
        assert_eq!(*recorder.reports.lock().unwrap(), vec!["UNAVAILABLE"]);
    }

    #[test]
    fn test_unknown_index_is_dropped() {
        let (mut bridge, recorder) = traffic_bridge();
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        bridge.attach(move |_: TrafficState| *counter.lock().unwrap() += 1);

        bridge.on_state_changed(99);
        bridge.on_state_changed(-3);

        assert_eq!(*count.lock().unwrap(), 0);
        assert!(recorder.notices.lock().unwrap().is_empty());
        assert!(recorder.reports.lock().unwrap().is_empty());
    }

    #[test]
    fn test_other_machines_share_the_pattern() {
        let recorder = Arc::new(Recorder::default());
        let mut isolines: Bridge<IsolinesState> =
            Bridge::new(recorder.clone(), recorder.clone());
        let mut transit: Bridge<TransitState> = Bridge::new(recorder.clone(), recorder.clone());

        isolines.on_state_changed(3); // NoData
        transit.on_state_changed(2); // NoData

        assert_eq!(
            *recorder.reports.lock().unwrap(),
            vec!["UNAVAILABLE", "UNAVAILABLE"]
        );
        assert_eq!(recorder.notices.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_notifier_marshals_to_foreground_thread() {
        let dispatcher = Dispatcher::new();
        let recorder = Arc::new(Recorder::default());
        let bridge = Arc::new(Mutex::new(Bridge::<TrafficState>::new(
            recorder.clone(),
            recorder.clone(),
        )));

        // Learn the foreground thread's identity.
        let (id_tx, id_rx) = mpsc::channel();
        dispatcher.run(Task::new(move || {
            id_tx.send(thread::current().id()).unwrap();
        }));
        let foreground_id = id_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let (tx, rx) = mpsc::channel();
        bridge
            .lock()
            .unwrap()
            .attach(move |state: TrafficState| {
                tx.send((thread::current().id(), state)).unwrap();
            });

        let notifier = StateNotifier::new(Arc::clone(&bridge), dispatcher.handle());
        let from_native = thread::spawn(move || notifier.notify(4));
        from_native.join().unwrap();

        let (delivered_on, state) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(delivered_on, foreground_id);
        assert_eq!(state, TrafficState::NoData);
    }
}
