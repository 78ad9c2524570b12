use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational state of the generator unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Stopped,
    Starting,
    Running,
    Stopping,
    EmergencyStop,
    Alert,
    GridUnstable,
    CommsLoss,
}

impl Status {
    pub const ALL: [Status; 8] = [
        Status::Stopped,
        Status::Starting,
        Status::Running,
        Status::Stopping,
        Status::EmergencyStop,
        Status::Alert,
        Status::GridUnstable,
        Status::CommsLoss,
    ];

    /// States in which the plant is ticked.
    pub fn is_active(self) -> bool {
        matches!(self, Status::Running | Status::Alert | Status::CommsLoss)
    }

    /// States from which a fault scenario may be injected.
    pub fn accepts_fault_injection(self) -> bool {
        matches!(self, Status::Running | Status::Alert)
    }

    pub fn can_start(self) -> bool {
        self == Status::Stopped
    }

    pub fn can_stop(self) -> bool {
        self.is_active()
    }

    pub fn can_emergency_stop(self) -> bool {
        !matches!(self, Status::Stopped | Status::EmergencyStop)
    }

    /// Stable numeric code for gauges.
    pub fn code(self) -> u8 {
        match self {
            Status::Stopped => 0,
            Status::Starting => 1,
            Status::Running => 2,
            Status::Stopping => 3,
            Status::EmergencyStop => 4,
            Status::Alert => 5,
            Status::GridUnstable => 6,
            Status::CommsLoss => 7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Stopped => "STOPPED",
            Status::Starting => "STARTING",
            Status::Running => "RUNNING",
            Status::Stopping => "STOPPING",
            Status::EmergencyStop => "EMERGENCY_STOP",
            Status::Alert => "ALERT",
            Status::GridUnstable => "GRID_UNSTABLE",
            Status::CommsLoss => "COMMS_LOSS",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
