use crate::runtime::config::RuntimeConfig;
use crate::runtime::console::{self, ConsoleInput};
use crate::runtime::logging::init_tracing;
use crate::runtime::telemetry;
use anyhow::Context;
use futures::future::OptionFuture;
use hydro_core::tags::METRIC_TAGS;
use hydro_core::{Command, NoiseSource, Session, SettingRanges, TimeBase};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

const CONSOLE_QUEUE: usize = 32;

pub fn run_from_args() -> anyhow::Result<()> {
    let config = RuntimeConfig::from_env();
    if config.show_help {
        RuntimeConfig::print_help();
        return Ok(());
    }
    run(config)
}

pub fn run(config: RuntimeConfig) -> anyhow::Result<()> {
    // Initialize tracing
    let _log_guard = init_tracing(config.json_logs, config.log_dir.as_deref());

    // Initialize metrics
    telemetry::init();
    let _metrics_handle = telemetry::start_metrics_server(&config.metrics_addr);

    let simulation = config.load_simulation()?;
    info!(
        tick_interval_ms = simulation.tick_interval_ms,
        sequence_step_ms = simulation.sequence_step_ms,
        seed = ?simulation.seed,
        time_scale = config.time_scale,
        "Starting hydro generator simulator"
    );
    let session = Session::new(simulation).context("failed to create simulation session")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let result = runtime.block_on(drive(session, config));
    // The stdin reader may still be parked in a blocking read.
    runtime.shutdown_background();
    result
}

/// Owns the session for the lifetime of the process.
struct Driver<N: NoiseSource> {
    session: Session<N>,
    timebase: TimeBase,
    logs_seen: u64,
}

impl<N: NoiseSource> Driver<N> {
    fn new(session: Session<N>, timebase: TimeBase) -> Self {
        let mut driver = Self {
            session,
            timebase,
            logs_seen: 0,
        };
        driver.publish();
        driver
    }

    /// Brings the simulation clock up to the wall clock.
    fn catch_up(&mut self) {
        self.session.advance_to(self.timebase.now());
        self.publish();
    }

    fn next_wake(&self) -> Option<Instant> {
        self.session
            .next_deadline()
            .map(|at| Instant::from_std(self.timebase.instant_at(at)))
    }

    fn apply(&mut self, command: Command) {
        let name = command.name();
        if self.session.apply(command) {
            debug!(command = name, status = %self.session.status(), "command applied");
        } else {
            info!(command = name, status = %self.session.status(), "command ignored");
        }
        self.publish();
    }

    fn handle(&mut self, input: ConsoleInput) {
        match input {
            ConsoleInput::Command(command) => self.apply(command),
            ConsoleInput::Status => self.print_status(),
            ConsoleInput::Metrics => self.print_metrics(),
            ConsoleInput::Snapshot => match serde_json::to_string_pretty(&self.session.snapshot()) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!(error = %e, "failed to serialize snapshot"),
            },
            ConsoleInput::Logs(count) => {
                let mut lines: Vec<_> = self.session.logs().iter().take(count).collect();
                lines.reverse();
                for entry in lines {
                    println!("{entry}");
                }
            }
            ConsoleInput::Help => println!("{}", console::HELP),
            // Handled by the select loop.
            ConsoleInput::Quit => {}
        }
    }

    fn print_status(&self) {
        let faults = self.session.faults();
        println!(
            "{} at t={:.1}s | grid fault: {} | trash rack clogged: {} | comms loss: {}",
            self.session.status(),
            self.session.now().as_secs_f64(),
            faults.is_grid_fault_active,
            faults.is_trash_rack_clogged,
            faults.is_comms_loss_active
        );
        if let Some(kind) = self.session.active_sequence() {
            println!("sequence in progress: {kind:?}");
        }
    }

    fn print_metrics(&self) {
        let metrics = self.session.metrics();
        for tag in METRIC_TAGS {
            println!("{:<12} {:>12.2} {}", tag.label, (tag.read)(metrics), tag.unit);
        }
    }

    /// Echoes fresh operator log lines and refreshes telemetry.
    fn publish(&mut self) {
        let log = self.session.logs();
        for entry in log.since(self.logs_seen) {
            info!(target: "hydro_sim::operator", "{}", entry);
        }
        self.logs_seen = log.total_written();
        telemetry::record(&self.session);
    }

    fn shutdown(&mut self) {
        self.session.dispose();
        self.publish();
        let stats = self.session.stats();
        info!(
            sim_time_s = self.session.now().as_secs_f64(),
            ticks_executed = stats.ticks_executed,
            alerts_raised = stats.alerts_raised,
            emergency_stops = stats.emergency_stops,
            grid_trips = stats.grid_trips,
            commands_ignored = stats.commands_ignored,
            "Run complete"
        );
    }
}

async fn drive<N: NoiseSource>(session: Session<N>, config: RuntimeConfig) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel::<ConsoleInput>(CONSOLE_QUEUE);
    if config.console_enabled {
        tokio::spawn(read_console(tx.clone(), SettingRanges::default()));
        info!("Reading operator commands from stdin (type 'help')");
    }

    let mut driver = Driver::new(session, TimeBase::with_scale(config.time_scale));
    if config.autostart {
        driver.apply(Command::Start);
    }

    let run_until = config.run_seconds.map(|seconds| {
        info!(seconds, "Running for limited duration");
        Instant::now() + Duration::from_secs(seconds)
    });

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        driver.catch_up();

        let wake: OptionFuture<_> = driver.next_wake().map(sleep_until).into();
        let expire: OptionFuture<_> = run_until.map(sleep_until).into();

        tokio::select! {
            Some(()) = wake => {}
            Some(()) = expire => {
                info!("Run duration elapsed");
                break;
            }
            input = rx.recv() => match input {
                Some(ConsoleInput::Quit) | None => break,
                Some(input) => {
                    // Commands land at the current wall-clock instant.
                    driver.catch_up();
                    driver.handle(input);
                }
            },
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!(error = %e, "failed to listen for ctrl-c");
                }
                info!("Interrupted");
                break;
            }
        }
    }

    drop(tx);
    driver.catch_up();
    driver.shutdown();
    Ok(())
}

async fn read_console(tx: mpsc::Sender<ConsoleInput>, ranges: SettingRanges) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("stdin closed");
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to read stdin");
                return;
            }
        };
        match console::parse_line(&line, &ranges) {
            Ok(Some(input)) => {
                if tx.send(input).await.is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => warn!(input = %line, error = %e, "rejected console input"),
        }
    }
}
