use serde::{Deserialize, Serialize};

/// Plant measurements derived each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// MW.
    pub power: f64,
    /// kV.
    pub voltage: f64,
    /// Hz.
    pub frequency: f64,
    /// Celsius.
    pub temperature: f64,
    /// mm/s.
    pub vibration: f64,
    /// RPM.
    pub speed: f64,
    /// N*m.
    pub torque: f64,
    /// A.
    pub current: f64,
    /// Percent.
    pub efficiency: f64,
    /// A.
    pub excitation_current: f64,
    /// Rate of change of frequency, Hz/s.
    pub rocf: f64,
    pub power_factor: f64,
}

impl Metrics {
    /// Cold, stationary unit at the given ambient temperature.
    pub fn baseline(ambient_temp_c: f64) -> Self {
        Self {
            power: 0.0,
            voltage: 0.0,
            frequency: 0.0,
            temperature: ambient_temp_c,
            vibration: 0.0,
            speed: 0.0,
            torque: 0.0,
            current: 0.0,
            efficiency: 0.0,
            excitation_current: 0.0,
            rocf: 0.0,
            power_factor: 0.0,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::baseline(25.0)
    }
}

/// Fault scenario flags read by the plant model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultFlags {
    pub is_grid_fault_active: bool,
    pub is_trash_rack_clogged: bool,
    pub is_comms_loss_active: bool,
}

impl FaultFlags {
    pub fn any(&self) -> bool {
        self.is_grid_fault_active || self.is_trash_rack_clogged || self.is_comms_loss_active
    }
}
