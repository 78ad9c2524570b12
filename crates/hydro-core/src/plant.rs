use crate::config::{GeneratorParams, NoiseBands, OperationalLimits, SimulationConfig};
use crate::metrics::{FaultFlags, Metrics};
use crate::noise::NoiseSource;
use crate::regulator::VoltageRegulator;
use crate::settings::Settings;
use std::f64::consts::PI;

/// Operational limit exceeded on a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitBreach {
    pub temperature_c: f64,
    pub vibration_mm_s: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub metrics: Metrics,
    /// Frequency the unit was driven toward, after any grid-fault drop.
    pub effective_frequency: f64,
    pub target_speed: f64,
    pub breach: Option<LimitBreach>,
    pub rocf_trip: bool,
}

/// Heuristic hydro turbine and generator model.
#[derive(Debug, Clone)]
pub struct TurbineModel {
    params: GeneratorParams,
    limits: OperationalLimits,
    noise: NoiseBands,
    dt_s: f64,
}

impl TurbineModel {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            params: config.generator,
            limits: config.limits,
            noise: config.noise,
            dt_s: config.tick_interval().as_secs_f64(),
        }
    }

    pub fn params(&self) -> &GeneratorParams {
        &self.params
    }

    pub fn limits(&self) -> &OperationalLimits {
        &self.limits
    }

    pub fn synchronous_speed(&self, frequency_hz: f64) -> f64 {
        120.0 * frequency_hz / f64::from(self.params.poles)
    }

    /// Volumetric flow through the penstock, m3/s.
    pub fn flow_rate(&self, settings: &Settings, faults: &FaultFlags) -> f64 {
        let clog = if faults.is_trash_rack_clogged {
            self.params.clog_factor
        } else {
            1.0
        };
        (settings.intake_gate_position / 100.0)
            * (settings.guide_vane_position / 100.0)
            * (settings.water_head / 10.0)
            * clog
    }

    pub fn hydraulic_power(&self, flow: f64, head_m: f64) -> f64 {
        let p = &self.params;
        let potential = p.water_density * p.gravity * flow * head_m * p.efficiency / 1e6;
        if potential.is_nan() {
            0.0
        } else {
            potential.clamp(0.0, p.max_power_mw)
        }
    }

    /// Advance one tick. `prev` is the committed snapshot of the previous tick
    /// and is never observed half-updated.
    pub fn step<N: NoiseSource + ?Sized>(
        &self,
        prev: &Metrics,
        settings: &Settings,
        faults: &FaultFlags,
        regulator: &mut VoltageRegulator,
        noise: &mut N,
    ) -> TickOutcome {
        let p = &self.params;

        let mut effective_frequency = settings.target_frequency;
        if faults.is_grid_fault_active {
            effective_frequency -= p.grid_fault_frequency_drop_hz;
        }

        // Speed
        let target_speed = self.synchronous_speed(effective_frequency).max(0.0);
        let speed = (target_speed + noise.band(target_speed * self.noise.speed_fraction)).max(0.0);

        // Hydraulics
        let flow = self.flow_rate(settings, faults);
        let power = self.hydraulic_power(flow, settings.water_head);

        // Voltage and excitation
        let measured = if prev.voltage == 0.0 {
            settings.target_voltage
        } else {
            prev.voltage
        };
        let natural = measured + noise.band(settings.target_voltage * self.noise.voltage_fraction);
        let correction = regulator.regulate(natural, settings.target_voltage);
        let voltage = (natural + correction).max(0.0);
        let excitation_current = (p.excitation_base_a
            + regulator.last_output() * p.excitation_gain_a_per_kv)
            .clamp(p.excitation_min_a, p.excitation_max_a);

        // Frequency
        let last_frequency = if prev.frequency == 0.0 {
            settings.target_frequency
        } else {
            prev.frequency
        };
        let frequency = (effective_frequency
            + noise.band(effective_frequency * self.noise.frequency_fraction))
        .max(0.0);
        let rocf = (frequency - last_frequency) / self.dt_s;

        // Mechanical and electrical loading
        let angular_velocity = 2.0 * PI * speed / 60.0;
        let torque = if angular_velocity > 0.0 {
            power * 1e6 / angular_velocity
        } else {
            0.0
        };
        let current = if voltage > 0.0 {
            power * 1e6 / (3f64.sqrt() * voltage * 1000.0 * p.power_factor * p.efficiency)
        } else {
            0.0
        };

        // Thermal
        let load_fraction = power / p.max_power_mw;
        let temperature = (prev.temperature + load_fraction * p.heating_per_tick_c
            - p.cooling_per_tick_c)
            .clamp(p.ambient_temp_c, self.limits.temperature_ceiling());

        // Vibration grows with speed deviation from synchronous.
        let speed_ratio = if target_speed > 0.0 {
            speed / target_speed
        } else {
            0.0
        };
        let vibration = (p.vibration_baseline_mm_s * speed_ratio
            + noise.band(self.noise.vibration_mm_s))
        .max(0.0);

        let metrics = Metrics {
            power,
            voltage,
            frequency,
            temperature,
            vibration,
            speed,
            torque,
            current,
            efficiency: load_fraction * p.efficiency * 100.0,
            excitation_current,
            rocf,
            power_factor: p.power_factor,
        };

        log::trace!(
            "tick: power={:.2}MW voltage={:.2}kV frequency={:.3}Hz rocf={:.3}Hz/s temp={:.1}C",
            power,
            voltage,
            frequency,
            rocf,
            temperature
        );

        TickOutcome {
            breach: self.check_limits(&metrics),
            rocf_trip: rocf < self.limits.critical_rocf_hz_s,
            metrics,
            effective_frequency,
            target_speed,
        }
    }

    pub fn check_limits(&self, metrics: &Metrics) -> Option<LimitBreach> {
        let over = metrics.temperature > self.limits.max_temperature_c
            || metrics.vibration > self.limits.max_vibration_mm_s;
        over.then_some(LimitBreach {
            temperature_c: metrics.temperature,
            vibration_mm_s: metrics.vibration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{QuietNoise, ScriptedNoise, SeededNoise};

    fn running_settings() -> Settings {
        Settings {
            water_head: 350.0,
            intake_gate_position: 100.0,
            guide_vane_position: 25.0,
            ..Settings::default()
        }
    }

    fn model() -> (TurbineModel, VoltageRegulator) {
        let cfg = SimulationConfig::default();
        (
            TurbineModel::new(&cfg),
            VoltageRegulator::new(&cfg.regulator, 1.0),
        )
    }

    #[test]
    fn synchronous_speed_for_24_poles() {
        let (model, _) = model();
        assert!((model.synchronous_speed(60.0) - 300.0).abs() < 1e-9);
        assert!((model.synchronous_speed(50.0) - 250.0).abs() < 1e-9);
    }

    #[test]
    fn quiet_tick_from_baseline() {
        let (model, mut avr) = model();
        let settings = running_settings();
        let out = model.step(
            &Metrics::baseline(25.0),
            &settings,
            &FaultFlags::default(),
            &mut avr,
            &mut QuietNoise,
        );
        let m = out.metrics;
        // flow 8.75 m3/s at 350 m
        let expected_power = 1000.0 * 9.81 * 8.75 * 350.0 * 0.988 / 1e6;
        assert!((m.power - expected_power).abs() < 1e-9);
        assert_eq!(m.speed, 300.0);
        assert_eq!(m.frequency, 60.0);
        assert_eq!(m.rocf, 0.0);
        assert_eq!(m.voltage, 13.8);
        assert_eq!(m.excitation_current, 250.0);
        assert_eq!(m.vibration, 1.5);
        assert_eq!(m.temperature, 25.0);
        assert_eq!(m.power_factor, 0.9);
        assert!(m.torque > 0.0 && m.current > 0.0);
        assert!(out.breach.is_none());
        assert!(!out.rocf_trip);
    }

    #[test]
    fn clogging_reduces_power() {
        let (model, mut avr) = model();
        let settings = running_settings();
        let clean = model.step(
            &Metrics::baseline(25.0),
            &settings,
            &FaultFlags::default(),
            &mut avr,
            &mut QuietNoise,
        );
        let clogged = model.step(
            &Metrics::baseline(25.0),
            &settings,
            &FaultFlags {
                is_trash_rack_clogged: true,
                ..FaultFlags::default()
            },
            &mut avr,
            &mut QuietNoise,
        );
        assert!((clogged.metrics.power - clean.metrics.power * 0.6).abs() < 1e-9);
    }

    #[test]
    fn grid_fault_drops_effective_frequency() {
        let (model, mut avr) = model();
        let settings = running_settings();
        let prev = Metrics {
            frequency: 60.0,
            ..Metrics::baseline(25.0)
        };
        let out = model.step(
            &prev,
            &settings,
            &FaultFlags {
                is_grid_fault_active: true,
                ..FaultFlags::default()
            },
            &mut avr,
            &mut QuietNoise,
        );
        assert!((out.effective_frequency - 59.8).abs() < 1e-9);
        assert!((out.metrics.rocf + 0.2).abs() < 1e-9);
        assert!(!out.rocf_trip);
        assert_eq!(settings.target_frequency, 60.0);
    }

    #[test]
    fn sharp_frequency_drop_trips_rocf() {
        let (model, mut avr) = model();
        let settings = Settings {
            target_frequency: 58.0,
            ..running_settings()
        };
        let prev = Metrics {
            frequency: 60.0,
            ..Metrics::baseline(25.0)
        };
        let out = model.step(
            &prev,
            &settings,
            &FaultFlags::default(),
            &mut avr,
            &mut QuietNoise,
        );
        assert!(out.rocf_trip);
    }

    #[test]
    fn overflowing_head_saturates_at_rating() {
        let (model, mut avr) = model();
        let settings = Settings {
            water_head: 1e200,
            intake_gate_position: 100.0,
            guide_vane_position: 100.0,
            ..Settings::default()
        };
        assert_eq!(model.hydraulic_power(f64::INFINITY, 1.0), 800.0);
        assert_eq!(model.hydraulic_power(f64::NAN, 350.0), 0.0);

        let out = model.step(
            &Metrics::baseline(25.0),
            &settings,
            &FaultFlags::default(),
            &mut avr,
            &mut QuietNoise,
        );
        assert_eq!(out.metrics.power, 800.0);
        assert!(out.metrics.current > 0.0);
        assert!(out.metrics.torque > 0.0);
    }

    #[test]
    fn power_clamped_to_rating() {
        let (model, mut avr) = model();
        let settings = Settings {
            water_head: 2000.0,
            intake_gate_position: 100.0,
            guide_vane_position: 100.0,
            ..Settings::default()
        };
        let out = model.step(
            &Metrics::baseline(25.0),
            &settings,
            &FaultFlags::default(),
            &mut avr,
            &mut QuietNoise,
        );
        assert_eq!(out.metrics.power, 800.0);
        assert!((out.metrics.efficiency - 98.8).abs() < 1e-9);
    }

    #[test]
    fn temperature_saturates_at_ceiling_and_ambient() {
        let (model, mut avr) = model();
        let hot = Metrics {
            temperature: 129.99,
            ..Metrics::baseline(25.0)
        };
        let settings = Settings {
            water_head: 2000.0,
            intake_gate_position: 100.0,
            guide_vane_position: 100.0,
            ..Settings::default()
        };
        let out = model.step(
            &hot,
            &settings,
            &FaultFlags::default(),
            &mut avr,
            &mut QuietNoise,
        );
        assert_eq!(out.metrics.temperature, 130.0);
        assert!(out.breach.is_some());

        let cold = model.step(
            &Metrics::baseline(25.0),
            &Settings::default(),
            &FaultFlags::default(),
            &mut avr,
            &mut QuietNoise,
        );
        assert_eq!(cold.metrics.temperature, 25.0);
    }

    #[test]
    fn closed_gates_produce_no_power_or_current() {
        let (model, mut avr) = model();
        let out = model.step(
            &Metrics::baseline(25.0),
            &Settings::default(),
            &FaultFlags::default(),
            &mut avr,
            &mut QuietNoise,
        );
        assert_eq!(out.metrics.power, 0.0);
        assert_eq!(out.metrics.current, 0.0);
        assert_eq!(out.metrics.torque, 0.0);
    }

    #[test]
    fn jitter_stays_in_band() {
        let (model, mut avr) = model();
        let settings = running_settings();
        let mut noise = ScriptedNoise::new(vec![0.0, 0.999_999]);
        let mut prev = Metrics::baseline(25.0);
        for _ in 0..20 {
            let out = model.step(&prev, &settings, &FaultFlags::default(), &mut avr, &mut noise);
            assert!((out.metrics.speed - 300.0).abs() <= 300.0 * 0.0025 + 1e-9);
            assert!((out.metrics.frequency - 60.0).abs() <= 60.0 * 0.001 + 1e-9);
            assert!((0.0..=1.7).contains(&out.metrics.vibration));
            prev = out.metrics;
        }
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let (model, _) = model();
        let settings = running_settings();
        let run = |seed| {
            let cfg = SimulationConfig::default();
            let mut avr = VoltageRegulator::new(&cfg.regulator, 1.0);
            let mut noise = SeededNoise::new(seed);
            let mut m = Metrics::baseline(25.0);
            for _ in 0..10 {
                m = model
                    .step(&m, &settings, &FaultFlags::default(), &mut avr, &mut noise)
                    .metrics;
            }
            m
        };
        assert_eq!(run(3), run(3));
    }
}
