//! Prometheus metrics for the simulated generator unit.
//!
//! Gauges mirror what the operator sees (frozen under comms loss); counters
//! follow the session's cumulative statistics.

use hydro_core::tags::{self, Tag, METRIC_TAGS};
use hydro_core::{NoiseSource, Session};
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use std::sync::LazyLock;
use std::thread;
use tiny_http::{Response, Server};
use tracing::info;

/// Global metrics registry
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Unit Measurements
// ============================================================================

/// One gauge per entry of the core tag table.
pub static MEASUREMENTS: LazyLock<Vec<(Tag, Gauge)>> = LazyLock::new(|| {
    METRIC_TAGS
        .iter()
        .map(|tag| {
            let help = if tag.unit.is_empty() {
                tag.label.to_string()
            } else {
                format!("{} ({})", tag.label, tag.unit)
            };
            let gauge = Gauge::new(tag.metric, help).unwrap();
            REGISTRY.register(Box::new(gauge.clone())).unwrap();
            (*tag, gauge)
        })
        .collect()
});

/// Status code (0=stopped,1=starting,2=running,3=stopping,4=emergency stop,
/// 5=alert,6=grid unstable,7=comms loss)
pub static STATUS_CODE: LazyLock<IntGauge> = LazyLock::new(|| {
    let gauge = IntGauge::new(tags::STATUS_CODE, "Generator status code").unwrap();
    REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Fault Scenarios
// ============================================================================

pub static GRID_FAULT_ACTIVE: LazyLock<IntGauge> = LazyLock::new(|| {
    let gauge = IntGauge::new(
        "hydro_grid_fault_active",
        "Grid fault scenario active (1=active, 0=clear)",
    )
    .unwrap();
    REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

pub static TRASH_RACK_CLOGGED: LazyLock<IntGauge> = LazyLock::new(|| {
    let gauge = IntGauge::new(
        "hydro_trash_rack_clogged",
        "Trash rack clogging scenario active (1=clogged, 0=clean)",
    )
    .unwrap();
    REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

pub static COMMS_LOSS_ACTIVE: LazyLock<IntGauge> = LazyLock::new(|| {
    let gauge = IntGauge::new(
        "hydro_comms_loss_active",
        "SCADA communication loss scenario active (1=lost, 0=ok)",
    )
    .unwrap();
    REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Session Counters
// ============================================================================

pub static TICKS_EXECUTED: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter =
        IntCounter::new("hydro_ticks_executed_total", "Plant ticks executed").unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

pub static ALERTS_RAISED: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "hydro_alerts_raised_total",
        "Operational limit alerts raised",
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

pub static EMERGENCY_STOPS: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "hydro_emergency_stops_total",
        "Emergency stop procedures started",
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

pub static GRID_TRIPS: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "hydro_grid_trips_total",
        "Automatic trips on rate of change of frequency",
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

pub static COMMANDS_IGNORED: LazyLock<IntCounter> = LazyLock::new(|| {
    let counter = IntCounter::new(
        "hydro_commands_ignored_total",
        "Operator commands ignored in the current status",
    )
    .unwrap();
    REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Session driver liveness (1 = driving, 0 = disposed or not started)
pub static SESSION_UP: LazyLock<IntGauge> = LazyLock::new(|| {
    let gauge = IntGauge::new("hydro_session_up", "Simulation session is being driven").unwrap();
    REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Initialize all metrics (forces lazy initialization)
pub fn init() {
    let _ = MEASUREMENTS.len();
    let _ = STATUS_CODE.get();
    let _ = GRID_FAULT_ACTIVE.get();
    let _ = TRASH_RACK_CLOGGED.get();
    let _ = COMMS_LOSS_ACTIVE.get();
    let _ = TICKS_EXECUTED.get();
    let _ = ALERTS_RAISED.get();
    let _ = EMERGENCY_STOPS.get();
    let _ = GRID_TRIPS.get();
    let _ = COMMANDS_IGNORED.get();
    let _ = SESSION_UP.get();
}

/// Copies the session's observable state into the registry.
pub fn record<N: NoiseSource>(session: &Session<N>) {
    let metrics = session.metrics();
    for (tag, gauge) in MEASUREMENTS.iter() {
        gauge.set((tag.read)(metrics));
    }
    STATUS_CODE.set(i64::from(session.status().code()));

    let faults = session.faults();
    GRID_FAULT_ACTIVE.set(i64::from(faults.is_grid_fault_active));
    TRASH_RACK_CLOGGED.set(i64::from(faults.is_trash_rack_clogged));
    COMMS_LOSS_ACTIVE.set(i64::from(faults.is_comms_loss_active));

    let stats = session.stats();
    catch_up(&TICKS_EXECUTED, stats.ticks_executed);
    catch_up(&ALERTS_RAISED, stats.alerts_raised);
    catch_up(&EMERGENCY_STOPS, stats.emergency_stops);
    catch_up(&GRID_TRIPS, stats.grid_trips);
    catch_up(&COMMANDS_IGNORED, stats.commands_ignored);

    SESSION_UP.set(i64::from(!session.is_disposed()));
}

fn catch_up(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

pub fn start_metrics_server(addr: &Option<String>) -> Option<thread::JoinHandle<()>> {
    addr.as_ref().map(|addr| {
        info!(addr = %addr, "Starting metrics server");
        serve_metrics(addr.clone())
    })
}

/// Start the metrics HTTP server on the given address.
pub fn serve_metrics(bind_addr: String) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let server = match Server::http(&bind_addr) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("Failed to start metrics server on {}: {}", bind_addr, e);
                return;
            }
        };

        tracing::info!("Metrics server listening on http://{}/metrics", bind_addr);

        for request in server.incoming_requests() {
            match request.url() {
                "/metrics" => {
                    let encoder = TextEncoder::new();
                    let metric_families = REGISTRY.gather();
                    let mut buffer = Vec::new();

                    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
                        tracing::warn!("Failed to encode metrics: {}", e);
                        let _ = request.respond(
                            Response::from_string("Internal Server Error").with_status_code(500),
                        );
                        continue;
                    }

                    let response = Response::from_data(buffer).with_header(
                        tiny_http::Header::from_bytes(
                            &b"Content-Type"[..],
                            &b"text/plain; version=0.0.4"[..],
                        )
                        .unwrap(),
                    );
                    let _ = request.respond(response);
                }
                "/health" => {
                    let _ = request.respond(Response::from_string("OK"));
                }
                "/ready" => {
                    if SESSION_UP.get() == 1 {
                        let _ = request.respond(Response::from_string("Ready"));
                    } else {
                        let _ = request
                            .respond(Response::from_string("Not Ready").with_status_code(503));
                    }
                }
                _ => {
                    let _ =
                        request.respond(Response::from_string("Not Found").with_status_code(404));
                }
            }
        }
    })
}
