//! Probe cycle
//!
//! Blocking probing move: queue the travel segment, arm the probe monitor
//! in the step executor, and wait for either the pin edge or the end of
//! travel. Whatever happens, the stepper and planner buffers are wiped
//! afterwards: a triggered probe stops mid-segment and the queued remainder
//! must never fire on the next cycle start.

use bitflags::bitflags;

use crate::axis::Position;
use crate::state::{Alarm, MachineState, ProbeMonitor, RtFlags};
use crate::traits::{Machine, PlanLine, Planner, ProbePin, Reporter, StepExecutor};

use super::Gateway;

bitflags! {
    /// Parser flags qualifying a probe command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ProbeCommandFlags: u8 {
        /// G38.4/G38.5: travel away from the workpiece, trigger on release.
        const AWAY = 1 << 0;
        /// G38.3/G38.5: no alarm when the pin never triggers.
        const NO_ERROR = 1 << 1;
    }
}

/// Synchronous result of a probe cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeResult {
    /// Dry run, no motion performed.
    CheckMode,
    /// Reset observed before or during the probe motion.
    Abort,
    /// The pin was already asserted before motion began.
    FailInit,
    /// Travel completed without a trigger.
    FailEnd,
    /// The pin triggered within travel; the snapshot is valid.
    Found,
}

impl<M: Machine> Gateway<M> {
    /// Run a probing move toward `target`.
    pub fn probe_cycle(
        &mut self,
        target: &Position,
        line: &PlanLine,
        flags: ProbeCommandFlags,
    ) -> ProbeResult {
        if self.sys.state == MachineState::CheckMode {
            return ProbeResult::CheckMode;
        }

        // Probing starts from rest: finish everything queued first.
        self.planner_synchronize();
        if self.sys.aborted() {
            return ProbeResult::Abort;
        }

        let is_probe_away = flags.contains(ProbeCommandFlags::AWAY);
        let is_no_error = flags.contains(ProbeCommandFlags::NO_ERROR);

        self.sys.probe_succeeded = false;
        self.probe.configure_invert_mask(is_probe_away);

        // A pin already reading triggered would stop the move at zero
        // distance; that is an alarm, not a measurement.
        if self.probe.get_state() {
            self.sys.shared.set_exec_alarm(Alarm::ProbeFailInitial);
            self.poll_realtime();
            self.probe.configure_invert_mask(false);
            return ProbeResult::FailInit;
        }

        self.line(target, line);

        // Arm the monitor so the executor can end the motion on the edge,
        // then start and wait for the machine to come back to rest.
        self.sys.shared.set_probe_monitor(ProbeMonitor::Active);
        self.sys.shared.set_exec_state_flag(RtFlags::CYCLE_START);
        loop {
            self.poll_realtime();
            if self.sys.aborted() {
                return ProbeResult::Abort;
            }
            if self.sys.state == MachineState::Idle {
                break;
            }
        }

        if self.sys.shared.probe_monitor() == ProbeMonitor::Active {
            // No trigger within travel.
            if is_no_error {
                self.sys.probe_position = self.sys.position;
            } else {
                self.sys.shared.set_exec_alarm(Alarm::ProbeFailContact);
            }
        } else {
            // The executor disarmed the monitor on the edge and captured the
            // snapshot.
            self.sys.probe_succeeded = true;
        }

        self.sys.shared.set_probe_monitor(ProbeMonitor::Off);
        self.probe.configure_invert_mask(false);
        self.poll_realtime();

        // Discard the unexecuted remainder of the probe motion.
        self.steppers.reset();
        self.planner.reset();
        self.planner.sync_position(&self.sys.position);

        if self.settings.report_probe_coordinates {
            self.reporter
                .probe_report(&self.sys.probe_position, self.sys.probe_succeeded);
        }

        if self.sys.probe_succeeded {
            ProbeResult::Found
        } else {
            ProbeResult::FailEnd
        }
    }
}
