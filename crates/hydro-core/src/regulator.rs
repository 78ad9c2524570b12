//! Automatic voltage regulator.
//!
//! PID loop that nudges terminal voltage toward its setpoint once per tick.
//! The raw controller output also drives the excitation current.

use crate::config::RegulatorConfig;

#[derive(Debug, Clone)]
pub struct VoltageRegulator {
    kp: f64,
    ki: f64,
    kd: f64,
    integral_limit: f64,
    max_correction: f64,
    dt_s: f64,
    integral: f64,
    previous_error: f64,
    control_output: f64,
}

impl VoltageRegulator {
    pub fn new(config: &RegulatorConfig, dt_s: f64) -> Self {
        Self {
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
            integral_limit: config.integral_limit.abs(),
            max_correction: config.max_correction_kv.abs(),
            dt_s,
            integral: 0.0,
            previous_error: 0.0,
            control_output: 0.0,
        }
    }

    /// Returns the voltage correction in kV, clamped to the configured maximum.
    pub fn regulate(&mut self, measured_kv: f64, setpoint_kv: f64) -> f64 {
        let error = setpoint_kv - measured_kv;

        // Integral with anti-windup
        self.integral = (self.integral + error * self.dt_s)
            .clamp(-self.integral_limit, self.integral_limit);

        let derivative = if self.dt_s > 0.0 {
            (error - self.previous_error) / self.dt_s
        } else {
            0.0
        };

        self.control_output = self.kp * error + self.ki * self.integral + self.kd * derivative;
        self.previous_error = error;

        self.control_output
            .clamp(-self.max_correction, self.max_correction)
    }

    /// Unclamped output of the last `regulate` call.
    pub fn last_output(&self) -> f64 {
        self.control_output
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
        self.control_output = 0.0;
    }
}
