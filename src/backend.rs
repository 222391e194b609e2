//! Scheduling backend selection.
//!
//! One logical job, several OS-provided scheduling mechanisms whose
//! availability depends on the platform capability level:
//!
//! ```text
//!   select_backend(job, capability) ──→ identifier ──→ handler ──→ sink
//!        (fresh per registration)       (pure fn)     (accessor)  (opaque)
//! ```
//!
//! ## Policy
//!
//! - Walk the job's declared priority order; pick the first backend whose
//!   minimum capability level is met.
//! - Selection happens once at (re)registration time, never per fire, and
//!   is never cached beyond the registration call — capability is
//!   evaluated fresh each time.
//! - When a job claims backends but none is usable at the given level,
//!   selection fails with [`ShellError::UnsupportedBackend`]. Silent
//!   degradation would leave work unscheduled, so the mismatch is
//!   surfaced immediately.

use serde::{Deserialize, Serialize};

use crate::capability::PlatformCapability;
use crate::error::{ShellError, ShellResult};
use crate::job::{JobNamespace, JobType};

/// One of the platform scheduling mechanisms a job may run on.
///
/// Declaration order is overall preference order; per-job preference is
/// [`JobType::supported_backends`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SchedulingBackend {
    /// The platform-native job scheduler (modern API levels only).
    NativeScheduler,
    /// Third-party dispatcher library, the pre-native fallback.
    WorkDispatcher,
    /// Always-available intent queue.
    IntentQueue,
}

impl SchedulingBackend {
    /// Minimum platform capability level this backend requires.
    pub fn min_capability(self) -> PlatformCapability {
        match self {
            SchedulingBackend::NativeScheduler => PlatformCapability::NATIVE_SCHEDULER_MIN,
            SchedulingBackend::WorkDispatcher => PlatformCapability::WORK_DISPATCHER_MIN,
            SchedulingBackend::IntentQueue => PlatformCapability::BASELINE,
        }
    }
}

/// Pick the backend `job` will be registered on at `capability`.
///
/// Walks the job's declared priority order and returns the first backend
/// whose minimum level is met. Fails with
/// [`ShellError::UnsupportedBackend`] (naming the job's most-preferred
/// backend) when nothing the job supports is usable — a wiring error,
/// never a silent fallback.
pub fn select_backend(
    job: JobType,
    capability: PlatformCapability,
) -> ShellResult<SchedulingBackend> {
    for &backend in job.supported_backends() {
        if capability.meets(backend.min_capability()) {
            tracing::debug!(job = %job, ?backend, level = capability.0, "selected backend");
            return Ok(backend);
        }
    }
    let claimed = job
        .supported_backends()
        .first()
        .copied()
        .unwrap_or(SchedulingBackend::IntentQueue);
    Err(ShellError::UnsupportedBackend {
        job: job.name(),
        backend: claimed,
    })
}

/// The scheduling-to-platform boundary: an opaque sink that accepts a
/// computed identifier and a handler reference for one backend.
///
/// Implementations own the platform-specific registration call; this
/// core only guarantees what it hands over.
pub trait BackendSink {
    /// Register `handler` under `id` with `backend`'s platform mechanism.
    fn register(&mut self, id: i32, backend: SchedulingBackend, handler: &'static str);
}

/// Register `job`: select a backend at the current capability level,
/// derive the job's identifier in `namespace`, resolve the matching
/// handler, and hand the triple to `sink`.
///
/// Re-running this for an already-registered job is the supported way to
/// pick up a platform upgrade — nothing from a previous selection is
/// reused.
pub fn register_job(
    job: JobType,
    capability: PlatformCapability,
    namespace: JobNamespace,
    sink: &mut dyn BackendSink,
) -> ShellResult<()> {
    let backend = select_backend(job, capability)?;
    let handler = job.handler_for(backend)?;
    sink.register(job.identifier(namespace), backend, handler);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        registered: Vec<(i32, SchedulingBackend, &'static str)>,
    }

    impl BackendSink for RecordingSink {
        fn register(&mut self, id: i32, backend: SchedulingBackend, handler: &'static str) {
            self.registered.push((id, backend, handler));
        }
    }

    #[test]
    fn test_fixed_backend_jobs_ignore_capability() {
        for capability in [
            PlatformCapability::BASELINE,
            PlatformCapability::NATIVE_SCHEDULER_MIN,
            PlatformCapability(33),
        ] {
            assert_eq!(
                select_backend(JobType::MapDataSync, capability).unwrap(),
                SchedulingBackend::IntentQueue
            );
        }
    }

    #[test]
    fn test_version_gated_job_prefers_native_scheduler() {
        let backend =
            select_backend(JobType::ConnectivityMonitor, PlatformCapability(21)).unwrap();
        assert_eq!(backend, SchedulingBackend::NativeScheduler);

        let backend =
            select_backend(JobType::ConnectivityMonitor, PlatformCapability(20)).unwrap();
        assert_eq!(backend, SchedulingBackend::WorkDispatcher);
    }

    #[test]
    fn test_no_usable_backend_fails_loudly() {
        // Below the work-dispatcher minimum nothing the connectivity job
        // supports is usable.
        let err = select_backend(JobType::ConnectivityMonitor, PlatformCapability(10))
            .unwrap_err();
        assert!(err.is_wiring_error());
    }

    #[test]
    fn test_register_job_hands_over_triple() {
        let mut sink = RecordingSink::default();
        register_job(
            JobType::ConnectivityMonitor,
            PlatformCapability(30),
            JobNamespace::SCHEDULER,
            &mut sink,
        )
        .unwrap();

        assert_eq!(
            sink.registered,
            vec![(
                5166,
                SchedulingBackend::NativeScheduler,
                "ConnectivitySchedulerService"
            )]
        );
    }

    #[test]
    fn test_register_job_reevaluates_capability() {
        let mut sink = RecordingSink::default();
        register_job(
            JobType::ConnectivityMonitor,
            PlatformCapability(20),
            JobNamespace::SCHEDULER,
            &mut sink,
        )
        .unwrap();
        register_job(
            JobType::ConnectivityMonitor,
            PlatformCapability(21),
            JobNamespace::SCHEDULER,
            &mut sink,
        )
        .unwrap();

        assert_eq!(sink.registered[0].1, SchedulingBackend::WorkDispatcher);
        assert_eq!(sink.registered[1].1, SchedulingBackend::NativeScheduler);
        // Same job, same namespace: the identifier never changes.
        assert_eq!(sink.registered[0].0, sink.registered[1].0);
    }
}
