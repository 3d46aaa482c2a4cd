//! Dwell
//!
//! G4-style pause: drain the planner, then sit still for a wall-clock time
//! while the realtime hook keeps running. Only a reset cuts a dwell short.

use crate::state::MachineState;
use crate::traits::{DelayTimer, Machine};

use super::Gateway;

/// Delay slice between realtime polls while dwelling.
pub const DWELL_TIME_STEP_MS: u32 = 50;

impl<M: Machine> Gateway<M> {
    /// Hold position for `seconds`.
    pub fn dwell(&mut self, seconds: f32) {
        if self.sys.state == MachineState::CheckMode {
            return;
        }
        self.planner_synchronize();
        if self.sys.aborted() {
            return;
        }
        let mut remaining_ms = (seconds * 1000.0) as u32;
        while remaining_ms > 0 {
            self.poll_realtime();
            if self.sys.aborted() {
                return;
            }
            let slice = remaining_ms.min(DWELL_TIME_STEP_MS);
            self.delay.delay_ms(slice);
            remaining_ms -= slice;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::state::MachineState;
    use crate::testutil::test_gateway;
    use crate::traits::{PlanLine, Planner};

    #[test]
    fn test_dwell_waits_exact_total() {
        let mut gw = test_gateway();
        gw.dwell(1.23);
        assert_eq!(gw.delay().total_ms, 1230);
    }

    #[test]
    fn test_dwell_drains_planner_first() {
        let mut gw = test_gateway();
        gw.line(&[4.0, 0.0, 0.0], &PlanLine::feed(600.0));
        assert!(!gw.planner().is_empty());
        gw.dwell(0.1);
        assert!(gw.planner().is_empty());
        assert_eq!(gw.sys().position, [4.0, 0.0, 0.0]);
    }

    #[test]
    fn test_dwell_noop_in_check_mode() {
        let mut gw = test_gateway();
        gw.sys_mut().state = MachineState::CheckMode;
        gw.dwell(2.0);
        assert_eq!(gw.delay().total_ms, 0);
    }

    #[test]
    fn test_dwell_cut_short_by_reset() {
        let mut gw = test_gateway();
        gw.sys().shared.request_reset();
        gw.dwell(2.0);
        assert_eq!(gw.delay().total_ms, 0);
        assert!(gw.sys().aborted());
    }
}
