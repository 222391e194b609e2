//! Logical jobs and their scheduling identity.
//!
//! A logical job is a named, statically enumerated deferred-work
//! definition, independent of which backend ends up executing it. Its
//! numeric identifier is derived, never stored:
//!
//! ```text
//!   id = ((ordinal + 1) << shift) + basis
//! ```
//!
//! with `basis`/`shift` fixed per identifier namespace. The parentheses
//! are deliberate — the shift applies to `ordinal + 1` as a whole, and an
//! accidental re-association silently collides identifiers.
//!
//! **Invariants:**
//! - Ordinal assignment is append-only. Reordering existing variants
//!   changes computed identifiers and must never happen for jobs with
//!   persisted schedules; new jobs go at the end.
//! - For a fixed `(ordinal, namespace)` the identifier is a pure
//!   function: no mutable state, no persistence, recomputed identically
//!   every process start.
//! - Identifiers are injective within a namespace ([`validate_namespace`]
//!   re-checks this across all declared jobs).

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::backend::SchedulingBackend;
use crate::error::{ShellError, ShellResult};

/// An identifier namespace: one `(basis, shift)` pair per family of
/// platform identifiers, keeping families from colliding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobNamespace {
    /// Namespace offset added after the shift.
    pub basis: i32,
    /// Low bits reserved for the namespace.
    pub shift: u32,
}

impl JobNamespace {
    /// Namespace for platform scheduler job identifiers.
    pub const SCHEDULER: JobNamespace = JobNamespace {
        basis: 1070,
        shift: 12,
    };

    /// Namespace for intent-service request identifiers.
    pub const INTENT_SERVICE: JobNamespace = JobNamespace {
        basis: 2070,
        shift: 12,
    };
}

/// The closed set of logical jobs. Append-only — see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    /// Re-arms connectivity-change monitoring; needs the modern platform
    /// scheduler, with the work dispatcher as fallback.
    ConnectivityMonitor,
    /// Periodic notification digest assembly.
    NotificationDigest,
    /// Deferred map-data synchronization pass.
    MapDataSync,
    /// Geofence enter/exit transition handling.
    GeofenceTransition,
}

impl JobType {
    /// All declared jobs, in ordinal order.
    pub const ALL: &'static [JobType] = &[
        JobType::ConnectivityMonitor,
        JobType::NotificationDigest,
        JobType::MapDataSync,
        JobType::GeofenceTransition,
    ];

    /// Stable declaration index of this job.
    pub fn ordinal(self) -> i32 {
        self as i32
    }

    /// Stable job name, used in logs and error reports.
    pub fn name(self) -> &'static str {
        match self {
            JobType::ConnectivityMonitor => "connectivity_monitor",
            JobType::NotificationDigest => "notification_digest",
            JobType::MapDataSync => "map_data_sync",
            JobType::GeofenceTransition => "geofence_transition",
        }
    }

    /// Backends this job may run on, in declared priority order.
    ///
    /// The common case is a single fixed backend with no version
    /// branching; only jobs needing version-gated behavior list more
    /// than one.
    pub fn supported_backends(self) -> &'static [SchedulingBackend] {
        match self {
            JobType::ConnectivityMonitor => &[
                SchedulingBackend::NativeScheduler,
                SchedulingBackend::WorkDispatcher,
            ],
            JobType::NotificationDigest => &[SchedulingBackend::WorkDispatcher],
            JobType::MapDataSync => &[SchedulingBackend::IntentQueue],
            JobType::GeofenceTransition => &[SchedulingBackend::IntentQueue],
        }
    }

    /// Whether this job declares support for `backend`.
    pub fn supports(self, backend: SchedulingBackend) -> bool {
        self.supported_backends().contains(&backend)
    }

    /// Deterministic identifier for this job within `namespace`.
    ///
    /// Pure in `(ordinal, basis, shift)`; injective across all jobs
    /// sharing a namespace because every job has a unique ordinal.
    pub fn identifier(self, namespace: JobNamespace) -> i32 {
        ((self.ordinal() + 1) << namespace.shift) + namespace.basis
    }

    /// Handler reference for the platform-native scheduler backend.
    ///
    /// Fails with [`ShellError::UnsupportedBackend`] when this job does
    /// not support that backend — never a null or default handler, which
    /// would silently wire the wrong service.
    pub fn scheduler_service(self) -> ShellResult<&'static str> {
        match self {
            JobType::ConnectivityMonitor => Ok("ConnectivitySchedulerService"),
            _ => Err(self.unsupported(SchedulingBackend::NativeScheduler)),
        }
    }

    /// Handler reference for the third-party work dispatcher backend.
    pub fn dispatcher_service(self) -> ShellResult<&'static str> {
        match self {
            JobType::ConnectivityMonitor => Ok("ConnectivityDispatcherService"),
            JobType::NotificationDigest => Ok("NotificationDispatcherService"),
            _ => Err(self.unsupported(SchedulingBackend::WorkDispatcher)),
        }
    }

    /// Handler reference for the always-available intent queue backend.
    pub fn intent_service(self) -> ShellResult<&'static str> {
        match self {
            JobType::MapDataSync => Ok("MapDataSyncIntentService"),
            JobType::GeofenceTransition => Ok("GeofenceTransitionIntentService"),
            _ => Err(self.unsupported(SchedulingBackend::IntentQueue)),
        }
    }

    /// Handler reference for `backend`, routed through the per-backend
    /// accessor.
    pub fn handler_for(self, backend: SchedulingBackend) -> ShellResult<&'static str> {
        match backend {
            SchedulingBackend::NativeScheduler => self.scheduler_service(),
            SchedulingBackend::WorkDispatcher => self.dispatcher_service(),
            SchedulingBackend::IntentQueue => self.intent_service(),
        }
    }

    fn unsupported(self, backend: SchedulingBackend) -> ShellError {
        ShellError::UnsupportedBackend {
            job: self.name(),
            backend,
        }
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Check that identifiers are injective across all declared jobs in
/// `namespace`. Intended for startup assertions and tests.
pub fn validate_namespace(namespace: JobNamespace) -> bool {
    let mut seen = FxHashSet::default();
    JobType::ALL
        .iter()
        .all(|job| seen.insert(job.identifier(namespace)))
}
