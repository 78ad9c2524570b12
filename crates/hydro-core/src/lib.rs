pub mod command;
pub mod config;
pub mod event_log;
pub mod faults;
pub mod gating;
pub mod metrics;
pub mod noise;
pub mod plant;
pub mod regulator;
pub mod sequencer;
pub mod session;
pub mod settings;
pub mod status;
pub mod tags;
pub mod timebase;

pub use command::Command;
pub use config::{
    ConfigError, GeneratorParams, NoiseBands, OperationalLimits, RegulatorConfig,
    SimulationConfig,
};
pub use event_log::{EventLog, LogEntry};
pub use faults::FaultInjector;
pub use gating::{Checked, Range, SettingRanges, SettingRequest, Unchecked};
pub use metrics::{FaultFlags, Metrics};
pub use noise::{NoiseSource, QuietNoise, ScriptedNoise, SeededNoise};
pub use plant::{LimitBreach, TickOutcome, TurbineModel};
pub use regulator::VoltageRegulator;
pub use sequencer::{SequenceKind, Sequencer};
pub use session::{ArmedTimers, Session, SessionSnapshot, SessionStats};
pub use settings::{SettingError, SettingKey, Settings};
pub use status::Status;
pub use timebase::TimeBase;
