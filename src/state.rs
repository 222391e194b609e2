//! Closed native state enumerations.
//!
//! The native map engine reports each monitored feature's state as a bare
//! index over a closed, declaration-ordered enumeration. The index↔name
//! mapping is a wire contract with the native layer:
//!
//! **Invariants:**
//! - Enumerations are closed and totally ordered by declaration index.
//! - Entries are never reordered or removed without a migration; new
//!   states go at the end.
//! - An out-of-range index resolves to [`ShellError::UnknownState`],
//!   never to a guessed state.
//!
//! Each state carries exactly one default action (what the bridge does
//! when no listener is attached) and optionally one diagnostic tag for
//! the telemetry boundary. Both are plain per-variant tables, not
//! per-member virtual dispatch.

use serde::{Deserialize, Serialize};

use crate::error::{ShellError, ShellResult};

/// What a bridge does with a state event when no listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultAction {
    /// Drop the event silently.
    Silent,
    /// Show a transient user-facing notice with this message.
    Notice(&'static str),
}

/// A closed, native-indexed state enumeration for one monitored feature.
pub trait NativeState: Copy + std::fmt::Debug + Send + 'static {
    /// Tag naming the state machine, used in logs and error reports.
    const MACHINE: &'static str;

    /// Resolve a native state index to a state.
    ///
    /// Fails with [`ShellError::UnknownState`] for indices outside the
    /// declared enumeration.
    fn from_index(index: i32) -> ShellResult<Self>;

    /// Stable state name.
    fn name(self) -> &'static str;

    /// The action a bridge performs for this state when no listener is
    /// attached.
    fn default_action(self) -> DefaultAction;

    /// Diagnostic tag reported to telemetry when this state arrives with
    /// no listener attached, if any.
    fn diagnostic(self) -> Option<&'static str>;
}

fn unknown(machine: &'static str, index: i32) -> ShellError {
    ShellError::UnknownState { machine, index }
}

/// Traffic layer states, in native declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrafficState {
    Disabled,
    Enabled,
    WaitingData,
    Outdated,
    NoData,
    NetworkError,
    ExpiredData,
    ExpiredApp,
}

impl NativeState for TrafficState {
    const MACHINE: &'static str = "traffic";

    fn from_index(index: i32) -> ShellResult<Self> {
        match index {
            0 => Ok(TrafficState::Disabled),
            1 => Ok(TrafficState::Enabled),
            2 => Ok(TrafficState::WaitingData),
            3 => Ok(TrafficState::Outdated),
            4 => Ok(TrafficState::NoData),
            5 => Ok(TrafficState::NetworkError),
            6 => Ok(TrafficState::ExpiredData),
            7 => Ok(TrafficState::ExpiredApp),
            _ => Err(unknown(Self::MACHINE, index)),
        }
    }

    fn name(self) -> &'static str {
        match self {
            TrafficState::Disabled => "Disabled",
            TrafficState::Enabled => "Enabled",
            TrafficState::WaitingData => "WaitingData",
            TrafficState::Outdated => "Outdated",
            TrafficState::NoData => "NoData",
            TrafficState::NetworkError => "NetworkError",
            TrafficState::ExpiredData => "ExpiredData",
            TrafficState::ExpiredApp => "ExpiredApp",
        }
    }

    fn default_action(self) -> DefaultAction {
        match self {
            TrafficState::NoData => DefaultAction::Notice("Traffic data is not available here"),
            TrafficState::NetworkError => {
                DefaultAction::Notice("No connection — traffic is unavailable")
            }
            TrafficState::ExpiredData => {
                DefaultAction::Notice("Traffic data is outdated — update maps")
            }
            TrafficState::ExpiredApp => {
                DefaultAction::Notice("Update the app to see traffic")
            }
            _ => DefaultAction::Silent,
        }
    }

    fn diagnostic(self) -> Option<&'static str> {
        match self {
            TrafficState::NoData => Some("UNAVAILABLE"),
            TrafficState::NetworkError => Some("NETWORK_ERROR"),
            TrafficState::ExpiredData => Some("EXPIRED_DATA"),
            TrafficState::ExpiredApp => Some("EXPIRED_APP"),
            _ => None,
        }
    }
}

/// Isolines layer states, in native declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IsolinesState {
    Disabled,
    Enabled,
    ExpiredData,
    NoData,
}

impl NativeState for IsolinesState {
    const MACHINE: &'static str = "isolines";

    fn from_index(index: i32) -> ShellResult<Self> {
        match index {
            0 => Ok(IsolinesState::Disabled),
            1 => Ok(IsolinesState::Enabled),
            2 => Ok(IsolinesState::ExpiredData),
            3 => Ok(IsolinesState::NoData),
            _ => Err(unknown(Self::MACHINE, index)),
        }
    }

    fn name(self) -> &'static str {
        match self {
            IsolinesState::Disabled => "Disabled",
            IsolinesState::Enabled => "Enabled",
            IsolinesState::ExpiredData => "ExpiredData",
            IsolinesState::NoData => "NoData",
        }
    }

    fn default_action(self) -> DefaultAction {
        match self {
            IsolinesState::ExpiredData => {
                DefaultAction::Notice("Isolines data is outdated — update maps")
            }
            IsolinesState::NoData => DefaultAction::Notice("No isolines data for this area"),
            _ => DefaultAction::Silent,
        }
    }

    fn diagnostic(self) -> Option<&'static str> {
        match self {
            IsolinesState::NoData => Some("UNAVAILABLE"),
            IsolinesState::ExpiredData => Some("EXPIRED_DATA"),
            _ => None,
        }
    }
}

/// Transit scheme layer states, in native declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitState {
    Disabled,
    Enabled,
    NoData,
}

impl NativeState for TransitState {
    const MACHINE: &'static str = "transit";

    fn from_index(index: i32) -> ShellResult<Self> {
        match index {
            0 => Ok(TransitState::Disabled),
            1 => Ok(TransitState::Enabled),
            2 => Ok(TransitState::NoData),
            _ => Err(unknown(Self::MACHINE, index)),
        }
    }

    fn name(self) -> &'static str {
        match self {
            TransitState::Disabled => "Disabled",
            TransitState::Enabled => "Enabled",
            TransitState::NoData => "NoData",
        }
    }

    fn default_action(self) -> DefaultAction {
        match self {
            TransitState::NoData => DefaultAction::Notice("No transit scheme for this city"),
            _ => DefaultAction::Silent,
        }
    }

    fn diagnostic(self) -> Option<&'static str> {
        match self {
            TransitState::NoData => Some("UNAVAILABLE"),
            _ => None,
        }
    }
}
