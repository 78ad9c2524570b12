use crate::metrics::FaultFlags;
use std::time::Duration;

/// Fault scenario flags plus the grid-fault decay timer.
///
/// The injector only tracks flags and its own deadline; callers decide
/// whether a scenario is allowed in the current status.
#[derive(Debug, Clone)]
pub struct FaultInjector {
    flags: FaultFlags,
    grid_fault_duration: Duration,
    grid_decay_at: Option<Duration>,
}

impl FaultInjector {
    pub fn new(grid_fault_duration: Duration) -> Self {
        Self {
            flags: FaultFlags::default(),
            grid_fault_duration,
            grid_decay_at: None,
        }
    }

    pub fn flags(&self) -> FaultFlags {
        self.flags
    }

    /// Raises the grid fault and re-arms its decay timer from `now`.
    pub fn trigger_grid_fault(&mut self, now: Duration) {
        self.flags.is_grid_fault_active = true;
        self.grid_decay_at = Some(now + self.grid_fault_duration);
    }

    /// Flips the clogging flag and returns the new state.
    pub fn toggle_trash_rack(&mut self) -> bool {
        self.flags.is_trash_rack_clogged = !self.flags.is_trash_rack_clogged;
        self.flags.is_trash_rack_clogged
    }

    pub fn set_comms_loss(&mut self, active: bool) {
        self.flags.is_comms_loss_active = active;
    }

    pub fn grid_decay_deadline(&self) -> Option<Duration> {
        self.grid_decay_at
    }

    pub fn cancel_decay(&mut self) {
        self.grid_decay_at = None;
    }

    /// Fires the decay timer if due. Returns true when the grid fault cleared.
    pub fn poll_decay(&mut self, now: Duration) -> bool {
        match self.grid_decay_at {
            Some(deadline) if deadline <= now => {
                self.grid_decay_at = None;
                self.flags.is_grid_fault_active = false;
                true
            }
            _ => false,
        }
    }

    /// Clears every flag and cancels the decay timer.
    pub fn clear(&mut self) {
        self.flags = FaultFlags::default();
        self.grid_decay_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn injector() -> FaultInjector {
        FaultInjector::new(Duration::from_secs(10))
    }

    #[test]
    fn grid_fault_decays_after_duration() {
        let mut faults = injector();
        faults.trigger_grid_fault(Duration::from_secs(5));
        assert!(faults.flags().is_grid_fault_active);
        assert!(!faults.poll_decay(Duration::from_millis(14_999)));
        assert!(faults.poll_decay(Duration::from_secs(15)));
        assert!(!faults.flags().is_grid_fault_active);
        assert_eq!(faults.grid_decay_deadline(), None);
    }

    #[test]
    fn retrigger_reschedules_single_timer() {
        let mut faults = injector();
        faults.trigger_grid_fault(Duration::from_secs(0));
        faults.trigger_grid_fault(Duration::from_secs(4));
        assert_eq!(faults.grid_decay_deadline(), Some(Duration::from_secs(14)));
        assert!(!faults.poll_decay(Duration::from_secs(10)));
        assert!(faults.flags().is_grid_fault_active);
    }

    #[test]
    fn clear_resets_flags_and_timer() {
        let mut faults = injector();
        faults.trigger_grid_fault(Duration::ZERO);
        faults.toggle_trash_rack();
        faults.set_comms_loss(true);
        assert!(faults.flags().any());
        faults.clear();
        assert!(!faults.flags().any());
        assert_eq!(faults.grid_decay_deadline(), None);
    }

    #[test]
    fn toggle_reports_new_state() {
        let mut faults = injector();
        assert!(faults.toggle_trash_rack());
        assert!(!faults.toggle_trash_rack());
    }
}
