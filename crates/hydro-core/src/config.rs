use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse simulation config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("critical rocf threshold must be negative, got {0}")]
    RocfThreshold(f64),
}

/// Machine constants used by the physical model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorParams {
    pub poles: u32,
    pub max_power_mw: f64,
    pub water_density: f64,
    pub gravity: f64,
    pub efficiency: f64,
    pub power_factor: f64,
    pub excitation_base_a: f64,
    pub excitation_gain_a_per_kv: f64,
    pub excitation_min_a: f64,
    pub excitation_max_a: f64,
    pub grid_fault_frequency_drop_hz: f64,
    pub clog_factor: f64,
    pub ambient_temp_c: f64,
    /// Temperature rise per tick at full power.
    pub heating_per_tick_c: f64,
    pub cooling_per_tick_c: f64,
    pub vibration_baseline_mm_s: f64,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            poles: 24,
            max_power_mw: 800.0,
            water_density: 1000.0,
            gravity: 9.81,
            efficiency: 0.988,
            power_factor: 0.9,
            excitation_base_a: 250.0,
            excitation_gain_a_per_kv: 500.0,
            excitation_min_a: 50.0,
            excitation_max_a: 500.0,
            grid_fault_frequency_drop_hz: 0.2,
            clog_factor: 0.6,
            ambient_temp_c: 25.0,
            heating_per_tick_c: 0.1,
            cooling_per_tick_c: 0.05,
            vibration_baseline_mm_s: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationalLimits {
    pub max_temperature_c: f64,
    pub max_vibration_mm_s: f64,
    /// Temperature may overshoot the alarm limit by this much before it saturates.
    pub temperature_headroom_c: f64,
    pub critical_rocf_hz_s: f64,
}

impl OperationalLimits {
    pub fn temperature_ceiling(&self) -> f64 {
        self.max_temperature_c + self.temperature_headroom_c
    }
}

impl Default for OperationalLimits {
    fn default() -> Self {
        Self {
            max_temperature_c: 120.0,
            max_vibration_mm_s: 2.0,
            temperature_headroom_c: 10.0,
            critical_rocf_hz_s: -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegulatorConfig {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub integral_limit: f64,
    /// Largest voltage correction applied in a single tick, in kV.
    pub max_correction_kv: f64,
}

impl Default for RegulatorConfig {
    fn default() -> Self {
        Self {
            kp: 0.1,
            ki: 0.05,
            kd: 0.01,
            integral_limit: 1.0,
            max_correction_kv: 0.1,
        }
    }
}

/// Widths of the uniform noise bands, centred on zero.
///
/// The speed, voltage and frequency bands are fractions of their target value,
/// so a `speed_fraction` of 0.005 yields jitter within +/-0.25 %.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseBands {
    pub speed_fraction: f64,
    pub voltage_fraction: f64,
    pub frequency_fraction: f64,
    pub vibration_mm_s: f64,
}

impl Default for NoiseBands {
    fn default() -> Self {
        Self {
            speed_fraction: 0.005,
            voltage_fraction: 0.02,
            frequency_fraction: 0.002,
            vibration_mm_s: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_interval_ms: u64,
    pub sequence_step_ms: u64,
    pub grid_fault_duration_ms: u64,
    pub log_capacity: usize,
    pub seed: Option<u64>,
    pub generator: GeneratorParams,
    pub limits: OperationalLimits,
    pub regulator: RegulatorConfig,
    pub noise: NoiseBands,
    pub nominal: Settings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            sequence_step_ms: 1500,
            grid_fault_duration_ms: 10_000,
            log_capacity: 200,
            seed: None,
            generator: GeneratorParams::default(),
            limits: OperationalLimits::default(),
            regulator: RegulatorConfig::default(),
            noise: NoiseBands::default(),
            nominal: Settings::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn sequence_step(&self) -> Duration {
        Duration::from_millis(self.sequence_step_ms)
    }

    pub fn grid_fault_duration(&self) -> Duration {
        Duration::from_millis(self.grid_fault_duration_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive_ints = [
            ("tick_interval_ms", self.tick_interval_ms),
            ("sequence_step_ms", self.sequence_step_ms),
            ("grid_fault_duration_ms", self.grid_fault_duration_ms),
            ("log_capacity", self.log_capacity as u64),
            ("generator.poles", u64::from(self.generator.poles)),
        ];
        for (field, value) in positive_ints {
            if value == 0 {
                return Err(ConfigError::NotPositive { field });
            }
        }

        let positive_floats = [
            ("generator.max_power_mw", self.generator.max_power_mw),
            ("generator.efficiency", self.generator.efficiency),
            ("generator.power_factor", self.generator.power_factor),
            ("limits.max_temperature_c", self.limits.max_temperature_c),
            ("limits.max_vibration_mm_s", self.limits.max_vibration_mm_s),
            ("regulator.max_correction_kv", self.regulator.max_correction_kv),
        ];
        for (field, value) in positive_floats {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field });
            }
        }

        let g = &self.generator;
        if g.excitation_min_a > g.excitation_max_a {
            return Err(ConfigError::InvertedRange {
                field: "generator.excitation",
                min: g.excitation_min_a,
                max: g.excitation_max_a,
            });
        }
        if g.ambient_temp_c > self.limits.temperature_ceiling() {
            return Err(ConfigError::InvertedRange {
                field: "temperature",
                min: g.ambient_temp_c,
                max: self.limits.temperature_ceiling(),
            });
        }
        if !(self.limits.critical_rocf_hz_s < 0.0) {
            return Err(ConfigError::RocfThreshold(self.limits.critical_rocf_hz_s));
        }
        Ok(())
    }
}
