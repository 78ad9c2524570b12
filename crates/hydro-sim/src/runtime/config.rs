use anyhow::Context;
use hydro_core::SimulationConfig;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub show_help: bool,
    pub config_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub run_seconds: Option<u64>,
    pub autostart: bool,
    pub console_enabled: bool,
    pub json_logs: bool,
    pub log_dir: Option<PathBuf>,
    pub metrics_addr: Option<String>,
    pub time_scale: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            show_help: false,
            config_path: None,
            seed: None,
            run_seconds: None,
            autostart: false,
            console_enabled: true,
            json_logs: false,
            log_dir: None,
            metrics_addr: None,
            time_scale: 1.0,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_args(&args)
    }

    pub fn from_args(args: &[String]) -> Self {
        let mut cfg = RuntimeConfig::default();
        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--config" => {
                    if i + 1 < args.len() {
                        cfg.config_path = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    }
                }
                "--seed" => {
                    if i + 1 < args.len() {
                        cfg.seed = args[i + 1].parse::<u64>().ok();
                        i += 1;
                    }
                }
                "--run-seconds" => {
                    if i + 1 < args.len() {
                        cfg.run_seconds = args[i + 1].parse::<u64>().ok();
                        i += 1;
                    }
                }
                "--autostart" => {
                    cfg.autostart = true;
                }
                "--no-console" => {
                    cfg.console_enabled = false;
                }
                "--json-logs" => {
                    cfg.json_logs = true;
                }
                "--log-dir" => {
                    if i + 1 < args.len() {
                        cfg.log_dir = Some(PathBuf::from(&args[i + 1]));
                        i += 1;
                    }
                }
                "--metrics-addr" => {
                    if i + 1 < args.len() {
                        cfg.metrics_addr = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                "--time-scale" => {
                    if i + 1 < args.len() {
                        cfg.time_scale = args[i + 1]
                            .parse::<f64>()
                            .ok()
                            .filter(|s| s.is_finite() && *s > 0.0)
                            .unwrap_or(1.0);
                        i += 1;
                    }
                }
                "--help" | "-h" => {
                    cfg.show_help = true;
                    break;
                }
                _ => {}
            }
            i += 1;
        }
        cfg
    }

    /// Reads the simulation config file if one was given, then applies
    /// command-line overrides.
    pub fn load_simulation(&self) -> anyhow::Result<SimulationConfig> {
        let mut simulation = match &self.config_path {
            Some(path) => {
                let text = std::fs::read_to_string(path).with_context(|| {
                    format!("failed to read simulation config {}", path.display())
                })?;
                SimulationConfig::from_json(&text)
                    .with_context(|| format!("invalid simulation config {}", path.display()))?
            }
            None => SimulationConfig::default(),
        };
        if self.seed.is_some() {
            simulation.seed = self.seed;
        }
        Ok(simulation)
    }

    pub fn print_help() {
        println!(
            r#"hydro-sim - Hydroelectric generator unit simulator

USAGE:
    hydro-sim [OPTIONS]

OPTIONS:
    --config <PATH>         Load simulation parameters from a JSON file
    --seed <N>              Seed the measurement noise for a reproducible run
    --run-seconds <SECS>    Run for a fixed wall-clock duration then exit
    --autostart             Issue a start command as soon as the simulator is up
    --no-console            Do not read operator commands from stdin
    --json-logs             Output logs in JSON format (for log aggregation)
    --log-dir <DIR>         Also write JSON logs to a daily rolling file in DIR
    --metrics-addr <ADDR>   Enable Prometheus metrics server on address (e.g., 0.0.0.0:9090)
    --time-scale <X>        Simulation speed relative to the wall clock [default: 1.0]
    -h, --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log filter (e.g., RUST_LOG=debug,hydro_core=trace)

EXAMPLES:
    # Interactive session with metrics
    hydro-sim --metrics-addr 0.0.0.0:9090

    # Unattended ten second run at five times real speed
    hydro-sim --autostart --no-console --run-seconds 10 --time-scale 5 --seed 7
"#
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("hydro-sim")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn defaults_without_flags() {
        let cfg = RuntimeConfig::from_args(&args(&[]));
        assert!(cfg.console_enabled);
        assert!(!cfg.autostart);
        assert_eq!(cfg.time_scale, 1.0);
        assert!(cfg.metrics_addr.is_none());
    }

    #[test]
    fn parses_flags() {
        let cfg = RuntimeConfig::from_args(&args(&[
            "--seed",
            "42",
            "--autostart",
            "--no-console",
            "--run-seconds",
            "5",
            "--time-scale",
            "10",
            "--metrics-addr",
            "127.0.0.1:9100",
        ]));
        assert_eq!(cfg.seed, Some(42));
        assert!(cfg.autostart);
        assert!(!cfg.console_enabled);
        assert_eq!(cfg.run_seconds, Some(5));
        assert_eq!(cfg.time_scale, 10.0);
        assert_eq!(cfg.metrics_addr.as_deref(), Some("127.0.0.1:9100"));
    }

    #[test]
    fn rejects_non_positive_time_scale() {
        let cfg = RuntimeConfig::from_args(&args(&["--time-scale", "-2"]));
        assert_eq!(cfg.time_scale, 1.0);
    }

    #[test]
    fn help_stops_parsing() {
        let cfg = RuntimeConfig::from_args(&args(&["-h", "--autostart"]));
        assert!(cfg.show_help);
        assert!(!cfg.autostart);
    }

    #[test]
    fn seed_flag_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"seed": 1, "tick_interval_ms": 500}}"#).unwrap();
        let cfg = RuntimeConfig {
            config_path: Some(file.path().to_path_buf()),
            seed: Some(9),
            ..RuntimeConfig::default()
        };
        let simulation = cfg.load_simulation().unwrap();
        assert_eq!(simulation.seed, Some(9));
        assert_eq!(simulation.tick_interval_ms, 500);
    }

    #[test]
    fn missing_file_reports_path() {
        let cfg = RuntimeConfig {
            config_path: Some(PathBuf::from("/nonexistent/hydro.json")),
            ..RuntimeConfig::default()
        };
        let err = cfg.load_simulation().unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/hydro.json"));
    }

    #[test]
    fn invalid_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"tick_interval_ms": 0}}"#).unwrap();
        let cfg = RuntimeConfig {
            config_path: Some(file.path().to_path_buf()),
            ..RuntimeConfig::default()
        };
        assert!(cfg.load_simulation().is_err());
    }
}
