use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Operator setpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Meters.
    pub water_head: f64,
    /// Percent open, 0-100.
    pub intake_gate_position: f64,
    /// Percent open, 0-100.
    pub guide_vane_position: f64,
    /// kV.
    pub target_voltage: f64,
    /// Hz.
    pub target_frequency: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            water_head: 350.0,
            intake_gate_position: 0.0,
            guide_vane_position: 0.0,
            target_voltage: 13.8,
            target_frequency: 60.0,
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> f64 {
        match key {
            SettingKey::WaterHead => self.water_head,
            SettingKey::IntakeGatePosition => self.intake_gate_position,
            SettingKey::GuideVanePosition => self.guide_vane_position,
            SettingKey::TargetVoltage => self.target_voltage,
            SettingKey::TargetFrequency => self.target_frequency,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: f64) {
        let slot = match key {
            SettingKey::WaterHead => &mut self.water_head,
            SettingKey::IntakeGatePosition => &mut self.intake_gate_position,
            SettingKey::GuideVanePosition => &mut self.guide_vane_position,
            SettingKey::TargetVoltage => &mut self.target_voltage,
            SettingKey::TargetFrequency => &mut self.target_frequency,
        };
        *slot = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKey {
    WaterHead,
    IntakeGatePosition,
    GuideVanePosition,
    TargetVoltage,
    TargetFrequency,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::WaterHead,
        SettingKey::IntakeGatePosition,
        SettingKey::GuideVanePosition,
        SettingKey::TargetVoltage,
        SettingKey::TargetFrequency,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SettingKey::WaterHead => "waterHead",
            SettingKey::IntakeGatePosition => "intakeGatePosition",
            SettingKey::GuideVanePosition => "guideVanePosition",
            SettingKey::TargetVoltage => "targetVoltage",
            SettingKey::TargetFrequency => "targetFrequency",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SettingKey::WaterHead => "m",
            SettingKey::IntakeGatePosition | SettingKey::GuideVanePosition => "%",
            SettingKey::TargetVoltage => "kV",
            SettingKey::TargetFrequency => "Hz",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingError {
    #[error("unknown setting '{0}'")]
    UnknownKey(String),
    #[error("{key} must be a finite number, got {value}")]
    NonFinite { key: SettingKey, value: f64 },
    #[error("{key} = {value} is outside {min}..={max}")]
    OutOfRange {
        key: SettingKey,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl FromStr for SettingKey {
    type Err = SettingError;

    /// Accepts the camelCase names used in snapshots as well as snake_case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "waterhead" | "head" => Ok(SettingKey::WaterHead),
            "intakegateposition" | "intakegate" | "gate" => Ok(SettingKey::IntakeGatePosition),
            "guidevaneposition" | "guidevanes" | "guidevane" | "vanes" => {
                Ok(SettingKey::GuideVanePosition)
            }
            "targetvoltage" | "voltage" => Ok(SettingKey::TargetVoltage),
            "targetfrequency" | "frequency" => Ok(SettingKey::TargetFrequency),
            _ => Err(SettingError::UnknownKey(s.to_string())),
        }
    }
}
