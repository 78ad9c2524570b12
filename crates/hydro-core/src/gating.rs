use crate::settings::{SettingError, SettingKey};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy)]
pub struct Unchecked;

#[derive(Debug, Clone, Copy)]
pub struct Checked;

/// Operator request to change one setpoint.
#[derive(Debug, Clone, Copy)]
pub struct SettingRequest<State = Unchecked> {
    key: SettingKey,
    value: f64,
    _state: PhantomData<State>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Slider ranges offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingRanges {
    pub water_head: Range,
    pub intake_gate_position: Range,
    pub guide_vane_position: Range,
    pub target_voltage: Range,
    pub target_frequency: Range,
}

impl Default for SettingRanges {
    fn default() -> Self {
        Self {
            water_head: Range::new(50.0, 500.0),
            intake_gate_position: Range::new(0.0, 100.0),
            guide_vane_position: Range::new(0.0, 100.0),
            target_voltage: Range::new(6.3, 18.0),
            target_frequency: Range::new(50.0, 60.0),
        }
    }
}

impl SettingRanges {
    pub fn range(&self, key: SettingKey) -> Range {
        match key {
            SettingKey::WaterHead => self.water_head,
            SettingKey::IntakeGatePosition => self.intake_gate_position,
            SettingKey::GuideVanePosition => self.guide_vane_position,
            SettingKey::TargetVoltage => self.target_voltage,
            SettingKey::TargetFrequency => self.target_frequency,
        }
    }
}

impl SettingRequest<Unchecked> {
    pub fn new(key: SettingKey, value: f64) -> Self {
        Self {
            key,
            value,
            _state: PhantomData,
        }
    }

    pub fn check(self, ranges: &SettingRanges) -> Result<SettingRequest<Checked>, SettingError> {
        if !self.value.is_finite() {
            return Err(SettingError::NonFinite {
                key: self.key,
                value: self.value,
            });
        }

        let range = ranges.range(self.key);
        if !range.contains(self.value) {
            return Err(SettingError::OutOfRange {
                key: self.key,
                value: self.value,
                min: range.min,
                max: range.max,
            });
        }

        Ok(SettingRequest {
            key: self.key,
            value: self.value,
            _state: PhantomData,
        })
    }
}

impl SettingRequest<Checked> {
    pub fn key(&self) -> SettingKey {
        self.key
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}
