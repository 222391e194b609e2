//! Platform capability level.
//!
//! Backend selection branches on exactly one axis of the running
//! platform: its API capability level. The level is captured fresh by
//! the caller at each registration — it is never cached by the selector,
//! so an OS upgrade between registrations is picked up automatically.

use serde::{Deserialize, Serialize};

/// The running platform's API capability level.
///
/// An opaque monotonic level: higher means more scheduling facilities
/// are available. Constructors are provided for the two levels the
/// selector actually branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformCapability(pub u32);

impl PlatformCapability {
    /// Baseline level: only the always-available intent queue exists.
    pub const BASELINE: PlatformCapability = PlatformCapability(0);

    /// Minimum level at which the third-party work dispatcher operates.
    pub const WORK_DISPATCHER_MIN: PlatformCapability = PlatformCapability(14);

    /// Minimum level at which the platform-native scheduler exists.
    pub const NATIVE_SCHEDULER_MIN: PlatformCapability = PlatformCapability(21);

    /// Whether this level meets `min`.
    pub fn meets(self, min: PlatformCapability) -> bool {
        self >= min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meets_is_inclusive() {
        assert!(PlatformCapability(21).meets(PlatformCapability::NATIVE_SCHEDULER_MIN));
        assert!(PlatformCapability(30).meets(PlatformCapability::NATIVE_SCHEDULER_MIN));
        assert!(!PlatformCapability(20).meets(PlatformCapability::NATIVE_SCHEDULER_MIN));
        assert!(PlatformCapability::BASELINE.meets(PlatformCapability::BASELINE));
    }
}
