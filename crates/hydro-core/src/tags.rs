use crate::metrics::Metrics;

#[derive(Debug, Clone, Copy)]
pub struct Tag {
    pub key: &'static str,
    pub metric: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub read: fn(&Metrics) -> f64,
}

pub const POWER_MW: Tag = Tag {
    key: "power",
    metric: "hydro_power_megawatts",
    label: "Power",
    unit: "MW",
    read: |m| m.power,
};

pub const VOLTAGE_KV: Tag = Tag {
    key: "voltage",
    metric: "hydro_voltage_kilovolts",
    label: "Voltage",
    unit: "kV",
    read: |m| m.voltage,
};

pub const FREQUENCY_HZ: Tag = Tag {
    key: "frequency",
    metric: "hydro_frequency_hertz",
    label: "Frequency",
    unit: "Hz",
    read: |m| m.frequency,
};

pub const TEMPERATURE_C: Tag = Tag {
    key: "temperature",
    metric: "hydro_temperature_celsius",
    label: "Temperature",
    unit: "°C",
    read: |m| m.temperature,
};

pub const VIBRATION_MM_S: Tag = Tag {
    key: "vibration",
    metric: "hydro_vibration_mm_per_second",
    label: "Vibration",
    unit: "mm/s",
    read: |m| m.vibration,
};

pub const SPEED_RPM: Tag = Tag {
    key: "speed",
    metric: "hydro_speed_rpm",
    label: "Speed",
    unit: "RPM",
    read: |m| m.speed,
};

pub const TORQUE_NM: Tag = Tag {
    key: "torque",
    metric: "hydro_torque_newton_meters",
    label: "Torque",
    unit: "N·m",
    read: |m| m.torque,
};

pub const CURRENT_A: Tag = Tag {
    key: "current",
    metric: "hydro_stator_current_amperes",
    label: "Current",
    unit: "A",
    read: |m| m.current,
};

pub const EFFICIENCY_PCT: Tag = Tag {
    key: "efficiency",
    metric: "hydro_efficiency_percent",
    label: "Efficiency",
    unit: "%",
    read: |m| m.efficiency,
};

pub const EXCITATION_A: Tag = Tag {
    key: "excitationCurrent",
    metric: "hydro_excitation_current_amperes",
    label: "Excitation",
    unit: "A",
    read: |m| m.excitation_current,
};

pub const ROCF_HZ_S: Tag = Tag {
    key: "rocf",
    metric: "hydro_rocof_hertz_per_second",
    label: "RoCoF",
    unit: "Hz/s",
    read: |m| m.rocf,
};

pub const POWER_FACTOR: Tag = Tag {
    key: "powerFactor",
    metric: "hydro_power_factor",
    label: "Power factor",
    unit: "",
    read: |m| m.power_factor,
};

pub const METRIC_TAGS: [Tag; 12] = [
    POWER_MW,
    VOLTAGE_KV,
    FREQUENCY_HZ,
    TEMPERATURE_C,
    VIBRATION_MM_S,
    SPEED_RPM,
    TORQUE_NM,
    CURRENT_A,
    EFFICIENCY_PCT,
    EXCITATION_A,
    ROCF_HZ_S,
    POWER_FACTOR,
];

pub const STATUS_CODE: &str = "hydro_status_code";
