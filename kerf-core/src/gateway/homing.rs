//! Homing cycle
//!
//! Runs the configured limit-switch search sequence and re-establishes
//! machine zero. Preconditions: planner empty, machine idle. Hard-limit
//! interrupts are masked for the duration since the searches hit the
//! switches on purpose.

use crate::axis::AxisMask;
use crate::state::{Alarm, MachineState};
use crate::traits::{Limits, Machine, Planner};

use super::Gateway;

impl<M: Machine> Gateway<M> {
    /// Run the homing cycle.
    ///
    /// A non-empty `cycle_mask` homes exactly those axes, when single-axis
    /// commands are configured; otherwise the configured cycle sequence
    /// runs. Only a reset interrupts homing.
    pub fn homing_cycle(&mut self, cycle_mask: AxisMask) {
        // With switches wired to both ends of travel, a switch that already
        // reads asserted is ambiguous: refuse to start and alarm.
        if self.settings.homing.two_switches_on_axes && !self.limits.get_state().is_empty() {
            self.reset();
            self.sys.shared.set_exec_alarm(Alarm::HardLimit);
            return;
        }

        // The searches trip the switches by design.
        self.limits.disable();
        self.sys.state = MachineState::Homing;

        if self.settings.homing.single_axis_commands && !cycle_mask.is_empty() {
            self.limits.go_home(cycle_mask, &mut self.sys);
        } else {
            let cycles = self.settings.homing.cycles.clone();
            for mask in cycles {
                self.limits.go_home(mask, &mut self.sys);
            }
        }

        self.poll_realtime();
        if self.sys.aborted() {
            // Did not complete; the alarm was latched where the failure
            // happened.
            return;
        }

        // Homed: sync the planned position and rearm the hard limits.
        self.sys.state = MachineState::Idle;
        self.planner.sync_position(&self.sys.position);
        self.limits.init();
    }
}
