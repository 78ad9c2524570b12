use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Simulation time at which the line was written, in milliseconds.
    pub at_ms: u64,
    pub message: String,
}

impl LogEntry {
    pub fn at(&self) -> Duration {
        Duration::from_millis(self.at_ms)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.at_ms / 1000;
        write!(
            f,
            "[{:02}:{:02}:{:02}] {}",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60,
            self.message
        )
    }
}

/// Operator log, newest entry first, bounded in length.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    total_written: u64,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            total_written: 0,
        }
    }

    pub fn push(&mut self, at: Duration, message: impl Into<String>) {
        self.entries.push_front(LogEntry {
            at_ms: at.as_millis() as u64,
            message: message.into(),
        });
        self.entries.truncate(self.capacity);
        self.total_written += 1;
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lines ever written, including those since dropped.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Entries written after `seen` lines had been written, oldest first.
    pub fn since(&self, seen: u64) -> Vec<&LogEntry> {
        let fresh = self.total_written.saturating_sub(seen) as usize;
        let mut out: Vec<&LogEntry> = self.entries.iter().take(fresh).collect();
        out.reverse();
        out
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first_and_capped() {
        let mut log = EventLog::new(3);
        for i in 0..5 {
            log.push(Duration::from_secs(i), format!("line {i}"));
        }
        let messages: Vec<_> = log.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["line 4", "line 3", "line 2"]);
        assert_eq!(log.total_written(), 5);
    }

    #[test]
    fn since_returns_fresh_lines_oldest_first() {
        let mut log = EventLog::new(10);
        log.push(Duration::ZERO, "a");
        let seen = log.total_written();
        log.push(Duration::ZERO, "b");
        log.push(Duration::ZERO, "c");
        let fresh: Vec<_> = log.since(seen).iter().map(|e| e.message.clone()).collect();
        assert_eq!(fresh, vec!["b", "c"]);
    }

    #[test]
    fn renders_clock_prefix() {
        let entry = LogEntry {
            at_ms: 3_723_500,
            message: "[SYSTEM] hello".into(),
        };
        assert_eq!(entry.to_string(), "[01:02:03] [SYSTEM] hello");
    }
}
