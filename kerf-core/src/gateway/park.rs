//! Parking motion
//!
//! Moves to or from the safe parked position while the main queue is
//! suspended by a feed hold. The move rides the planner's always-free head
//! slot and a temporarily redirected step segment buffer, so the held
//! program survives untouched.

use crate::axis::Position;
use crate::state::StepControl;
use crate::traits::{FeedbackMessage, Machine, PlanLine, PlanStatus, Planner, Reporter, StepExecutor};

use super::Gateway;

impl<M: Machine> Gateway<M> {
    /// Execute one out-of-band parking move and clock it to completion.
    pub fn parking_motion(&mut self, parking_target: &Position, line: &PlanLine) {
        if !self.settings.parking.enabled {
            return;
        }
        if self.sys.aborted() {
            return;
        }

        if self.planner.submit(parking_target, line) == PlanStatus::Accepted {
            self.sys.step_control.insert(StepControl::EXECUTE_SYS_MOTION);
            // A pending end-of-hold must not cancel the parking move.
            self.sys.step_control.remove(StepControl::END_MOTION);
            self.steppers.parking_setup_buffer();
            self.steppers.prep_buffer(&mut self.planner, &mut self.sys);
            self.steppers.wake_up();
            loop {
                self.poll_realtime();
                if self.sys.aborted() {
                    return;
                }
                if !self
                    .sys
                    .step_control
                    .contains(StepControl::EXECUTE_SYS_MOTION)
                {
                    break;
                }
            }
            self.steppers.parking_restore_buffer();
        } else {
            // The planner had no room for the move; skip it rather than
            // stall the hold, but say so.
            self.sys
                .step_control
                .remove(StepControl::EXECUTE_SYS_MOTION);
            self.poll_realtime();
            self.reporter.feedback(FeedbackMessage::ParkingMoveSkipped);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::axis::Position;
    use crate::state::{MachineState, StepControl};
    use crate::testutil::test_gateway;
    use crate::traits::{Condition, FeedbackMessage, PlanLine, Planner};

    const PARK: Position = [0.0, 0.0, 40.0];

    fn park_line() -> PlanLine {
        let mut line = PlanLine::rapid();
        line.condition |= Condition::SYSTEM_MOTION | Condition::NO_FEED_OVERRIDE;
        line
    }

    #[test]
    fn test_parking_runs_to_completion() {
        let mut gw = test_gateway();
        gw.settings_mut().parking.enabled = true;
        gw.sys_mut().state = MachineState::Hold;
        gw.parking_motion(&PARK, &park_line());
        assert_eq!(gw.sys().position, PARK);
        assert!(!gw.sys().step_control.contains(StepControl::EXECUTE_SYS_MOTION));
        assert_eq!(gw.steppers().parking_setups, 1);
        assert_eq!(gw.steppers().parking_restores, 1);
        assert!(!gw.steppers().parking_buffer);
        // The held state survives the excursion.
        assert_eq!(gw.sys().state, MachineState::Hold);
    }

    #[test]
    fn test_parking_disabled_is_noop() {
        let mut gw = test_gateway();
        gw.parking_motion(&PARK, &park_line());
        assert_eq!(gw.steppers().parking_setups, 0);
        assert_ne!(gw.sys().position, PARK);
    }

    #[test]
    fn test_parking_rejected_is_skipped_with_feedback() {
        let mut gw = test_gateway();
        gw.settings_mut().parking.enabled = true;
        // Zero-length park: the planner rejects it.
        gw.parking_motion(&[0.0, 0.0, 0.0], &park_line());
        assert_eq!(
            &gw.reporter().feedback[..],
            &[FeedbackMessage::ParkingMoveSkipped]
        );
        assert_eq!(gw.steppers().parking_setups, 0);
    }

    #[test]
    fn test_parking_blocked_during_abort() {
        let mut gw = test_gateway();
        gw.settings_mut().parking.enabled = true;
        gw.sys().shared.set_abort();
        gw.parking_motion(&PARK, &park_line());
        assert!(gw.planner().is_empty());
        assert!(gw.reporter().feedback.is_empty());
    }
}
