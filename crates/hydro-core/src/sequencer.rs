//! Scripted operator procedures.
//!
//! A procedure is a list of log lines replayed at a fixed cadence that ends
//! in a status change. Only one procedure runs at a time; starting another
//! replaces it, which is how an emergency stop pre-empts a start or stop.

use crate::status::Status;
use std::time::Duration;

pub const START_SEQUENCE: &[&str] = &[
    "Verify all systems are ready",
    "Check lubrication system pressure...",
    "Check cooling system flow...",
    "Verify excitation system status...",
    "Start generator motor...",
    "Synchronizing to grid...",
    "Load to 25% capacity...",
    "Stabilizing operation...",
    "Generator is now online and RUNNING.",
];

pub const STOP_SEQUENCE: &[&str] = &[
    "Reducing load to minimum...",
    "Opening circuit breaker...",
    "Disconnecting from grid...",
    "Reducing excitation to minimum...",
    "Stopping generator motor...",
    "Closing excitation system...",
    "Stopping auxiliary systems...",
    "Post-stop checks complete.",
    "Generator is now STOPPED.",
];

pub const EMERGENCY_STOP_SEQUENCE: &[&str] = &[
    "!!! EMERGENCY STOP ACTIVATED !!!",
    "Opening circuit breaker immediately...",
    "Disconnecting from grid...",
    "Reducing excitation to zero...",
    "Applying generator brakes...",
    "Activating emergency cooling...",
    "Generator is now STOPPED.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Start,
    Stop,
    Emergency,
}

impl SequenceKind {
    pub fn script(self) -> &'static [&'static str] {
        match self {
            SequenceKind::Start => START_SEQUENCE,
            SequenceKind::Stop => STOP_SEQUENCE,
            SequenceKind::Emergency => EMERGENCY_STOP_SEQUENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SequenceEvent {
    Line(&'static str),
    Finished {
        kind: SequenceKind,
        final_status: Status,
    },
}

#[derive(Debug, Clone)]
struct RunningSequence {
    kind: SequenceKind,
    steps: &'static [&'static str],
    cursor: usize,
    final_status: Status,
    next_at: Duration,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    step_delay: Duration,
    running: Option<RunningSequence>,
}

impl Sequencer {
    pub fn new(step_delay: Duration) -> Self {
        Self {
            step_delay,
            running: None,
        }
    }

    /// Replaces any in-flight procedure with `steps`, labelled `kind`. The
    /// first line is due immediately at `now`; `final_status` is reported one
    /// step after the last line.
    pub fn run(
        &mut self,
        kind: SequenceKind,
        steps: &'static [&'static str],
        final_status: Status,
        now: Duration,
    ) {
        if let Some(previous) = self.running.take() {
            log::debug!(
                "{:?} sequence pre-empted at step {} by {:?}",
                previous.kind,
                previous.cursor,
                kind
            );
        }
        self.running = Some(RunningSequence {
            kind,
            steps,
            cursor: 0,
            final_status,
            next_at: now,
        });
    }

    pub fn cancel(&mut self) {
        self.running = None;
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn active_kind(&self) -> Option<SequenceKind> {
        self.running.as_ref().map(|r| r.kind)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.running.as_ref().map(|r| r.next_at)
    }

    /// Advances the procedure by one step if it is due at `now`.
    pub fn fire(&mut self, now: Duration) -> Option<SequenceEvent> {
        let running = self.running.as_mut()?;
        if running.next_at > now {
            return None;
        }
        let steps = running.steps;
        if let Some(&line) = steps.get(running.cursor) {
            running.cursor += 1;
            running.next_at += self.step_delay;
            return Some(SequenceEvent::Line(line));
        }
        let done = self.running.take()?;
        Some(SequenceEvent::Finished {
            kind: done.kind,
            final_status: done.final_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(1500);

    fn drain(seq: &mut Sequencer, until: Duration) -> Vec<SequenceEvent> {
        let mut events = Vec::new();
        while let Some(at) = seq.next_deadline() {
            if at > until {
                break;
            }
            if let Some(event) = seq.fire(at) {
                events.push(event);
            }
        }
        events
    }

    #[test]
    fn first_line_is_immediate_and_final_status_follows_last_line() {
        let mut seq = Sequencer::new(STEP);
        seq.run(
            SequenceKind::Emergency,
            EMERGENCY_STOP_SEQUENCE,
            Status::Stopped,
            Duration::ZERO,
        );
        assert_eq!(
            seq.fire(Duration::ZERO),
            Some(SequenceEvent::Line("!!! EMERGENCY STOP ACTIVATED !!!"))
        );
        assert_eq!(seq.fire(Duration::from_millis(1499)), None);

        let events = drain(&mut seq, STEP * 7);
        assert_eq!(events.len(), 7);
        assert_eq!(
            events.last(),
            Some(&SequenceEvent::Finished {
                kind: SequenceKind::Emergency,
                final_status: Status::Stopped,
            })
        );
        assert!(!seq.is_running());
    }

    #[test]
    fn new_run_pre_empts_pending_sequence() {
        let mut seq = Sequencer::new(STEP);
        seq.run(
            SequenceKind::Start,
            START_SEQUENCE,
            Status::Running,
            Duration::ZERO,
        );
        seq.fire(Duration::ZERO);
        seq.fire(STEP);

        seq.run(
            SequenceKind::Emergency,
            EMERGENCY_STOP_SEQUENCE,
            Status::Stopped,
            STEP + Duration::from_millis(200),
        );
        assert_eq!(seq.active_kind(), Some(SequenceKind::Emergency));

        let events = drain(&mut seq, Duration::from_secs(60));
        let lines: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SequenceEvent::Line(l) => Some(*l),
                _ => None,
            })
            .collect();
        assert_eq!(lines, EMERGENCY_STOP_SEQUENCE);
    }

    #[test]
    fn cancel_drops_deadline() {
        let mut seq = Sequencer::new(STEP);
        seq.run(
            SequenceKind::Stop,
            STOP_SEQUENCE,
            Status::Stopped,
            Duration::ZERO,
        );
        seq.cancel();
        assert_eq!(seq.next_deadline(), None);
        assert_eq!(seq.fire(Duration::from_secs(100)), None);
    }

    #[test]
    fn runs_caller_supplied_steps() {
        const DRILL: &[&str] = &["Sound horn", "Open spillway"];
        let mut seq = Sequencer::new(STEP);
        seq.run(SequenceKind::Stop, DRILL, Status::Stopped, Duration::ZERO);
        assert_eq!(seq.active_kind(), Some(SequenceKind::Stop));

        let events = drain(&mut seq, Duration::from_secs(60));
        assert_eq!(
            events,
            vec![
                SequenceEvent::Line("Sound horn"),
                SequenceEvent::Line("Open spillway"),
                SequenceEvent::Finished {
                    kind: SequenceKind::Stop,
                    final_status: Status::Stopped,
                },
            ]
        );
        assert!(!seq.is_running());
    }

    #[test]
    fn empty_steps_finish_on_first_fire() {
        let mut seq = Sequencer::new(STEP);
        seq.run(SequenceKind::Start, &[], Status::Running, STEP);
        assert_eq!(seq.fire(Duration::ZERO), None);
        assert_eq!(
            seq.fire(STEP),
            Some(SequenceEvent::Finished {
                kind: SequenceKind::Start,
                final_status: Status::Running,
            })
        );
    }
}
