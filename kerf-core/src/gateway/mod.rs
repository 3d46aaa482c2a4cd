//! Motion-command gateway
//!
//! The single choke point between the G-code parser and the step executor.
//! Every motion (line, arc, dwell, homing, probing, parking) passes through
//! here; the gateway enforces soft limits, back-pressure against the bounded
//! planner ring, and cooperative observation of asynchronous events.
//!
//! Blocking is only allowed in loops that service [`Gateway::poll_realtime`]
//! every iteration and re-check the abort flag afterwards.

mod arc;
mod dwell;
mod homing;
mod line;
mod park;
mod probe;

pub use arc::{
    arc_angular_travel, arc_segment_count, ArcPlane, ARC_ANGULAR_TRAVEL_EPSILON, N_ARC_CORRECTION,
};
pub use dwell::DWELL_TIME_STEP_MS;
pub use probe::{ProbeCommandFlags, ProbeResult};

use crate::config::Settings;
use crate::state::{Alarm, MachineState, OverrideControl, RtFlags, StepControl, System};
use crate::traits::{Coolant, Machine, Planner, Reporter, Spindle, StepExecutor};

/// The motion-command gateway. One instance per controller.
pub struct Gateway<M: Machine> {
    settings: Settings,
    sys: System,
    planner: M::Planner,
    steppers: M::Steppers,
    spindle: M::Spindle,
    coolant: M::Coolant,
    probe: M::Probe,
    limits: M::Limits,
    reporter: M::Reporter,
    delay: M::Delay,
    /// Hardware half of reset already ran for the current reset request.
    reset_done: bool,
}

impl<M: Machine> core::fmt::Debug for Gateway<M>
where
    M::Planner: core::fmt::Debug,
    M::Steppers: core::fmt::Debug,
    M::Spindle: core::fmt::Debug,
    M::Coolant: core::fmt::Debug,
    M::Probe: core::fmt::Debug,
    M::Limits: core::fmt::Debug,
    M::Reporter: core::fmt::Debug,
    M::Delay: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Gateway")
            .field("settings", &self.settings)
            .field("sys", &self.sys)
            .field("planner", &self.planner)
            .field("steppers", &self.steppers)
            .field("spindle", &self.spindle)
            .field("coolant", &self.coolant)
            .field("probe", &self.probe)
            .field("limits", &self.limits)
            .field("reporter", &self.reporter)
            .field("delay", &self.delay)
            .field("reset_done", &self.reset_done)
            .finish()
    }
}

impl<M: Machine> Gateway<M> {
    /// Wire up a gateway from its collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: Settings,
        planner: M::Planner,
        steppers: M::Steppers,
        spindle: M::Spindle,
        coolant: M::Coolant,
        probe: M::Probe,
        limits: M::Limits,
        reporter: M::Reporter,
        delay: M::Delay,
    ) -> Self {
        Self {
            settings,
            sys: System::new(),
            planner,
            steppers,
            spindle,
            coolant,
            probe,
            limits,
            reporter,
            delay,
            reset_done: false,
        }
    }

    /// Machine state record.
    pub fn sys(&self) -> &System {
        &self.sys
    }

    /// Mutable machine state record, for the outer protocol layer.
    pub fn sys_mut(&mut self) -> &mut System {
        &mut self.sys
    }

    /// Active settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable settings, for the `$x=` handler.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Planner collaborator.
    pub fn planner(&self) -> &M::Planner {
        &self.planner
    }

    /// Mutable planner collaborator.
    pub fn planner_mut(&mut self) -> &mut M::Planner {
        &mut self.planner
    }

    /// Step executor collaborator.
    pub fn steppers(&self) -> &M::Steppers {
        &self.steppers
    }

    /// Mutable step executor collaborator.
    pub fn steppers_mut(&mut self) -> &mut M::Steppers {
        &mut self.steppers
    }

    /// Spindle collaborator.
    pub fn spindle(&self) -> &M::Spindle {
        &self.spindle
    }

    /// Coolant collaborator.
    pub fn coolant(&self) -> &M::Coolant {
        &self.coolant
    }

    /// Limits collaborator.
    pub fn limits(&self) -> &M::Limits {
        &self.limits
    }

    /// Mutable limits collaborator.
    pub fn limits_mut(&mut self) -> &mut M::Limits {
        &mut self.limits
    }

    /// Probe pin collaborator.
    pub fn probe_pin(&self) -> &M::Probe {
        &self.probe
    }

    /// Mutable probe pin collaborator.
    pub fn probe_pin_mut(&mut self) -> &mut M::Probe {
        &mut self.probe
    }

    /// Reporter collaborator.
    pub fn reporter(&self) -> &M::Reporter {
        &self.reporter
    }

    /// Delay source collaborator.
    pub fn delay(&self) -> &M::Delay {
        &self.delay
    }

    /// Drain pending asynchronous events and keep the executor fed.
    ///
    /// This is the cooperative poll point: every busy-wait in the gateway
    /// calls it each iteration, then re-reads the abort flag and bails if it
    /// is set. A pending reset short-circuits everything else.
    pub fn poll_realtime(&mut self) {
        let flags = self.sys.shared.exec_state();

        if let Some(alarm) = self.sys.shared.exec_alarm() {
            self.sys.state = MachineState::Alarm;
            self.reporter.alarm(alarm);
            self.sys.shared.clear_exec_alarm();
        }

        if flags.contains(RtFlags::RESET) {
            self.reset();
            self.sys.shared.set_abort();
            return;
        }

        if flags.contains(RtFlags::STATUS_REPORT) {
            self.sys.shared.clear_exec_state_flag(RtFlags::STATUS_REPORT);
            self.reporter.status_report(&self.sys);
        }

        if flags.contains(RtFlags::SLEEP) {
            self.sys.shared.clear_exec_state_flag(RtFlags::SLEEP);
            self.sys.state = MachineState::Sleep;
        }

        if flags.contains(RtFlags::SAFETY_DOOR) {
            self.sys.shared.clear_exec_state_flag(RtFlags::SAFETY_DOOR);
            if self.sys.state.is_motion() || self.sys.state == MachineState::Hold {
                self.sys.step_control.insert(StepControl::EXECUTE_HOLD);
            }
            if !matches!(
                self.sys.state,
                MachineState::Alarm | MachineState::Sleep | MachineState::CheckMode
            ) {
                self.sys.state = MachineState::SafetyDoor;
            }
        }

        if flags.contains(RtFlags::FEED_HOLD) {
            self.sys.shared.clear_exec_state_flag(RtFlags::FEED_HOLD);
            if matches!(self.sys.state, MachineState::Cycle | MachineState::Jog) {
                self.sys.step_control.insert(StepControl::EXECUTE_HOLD);
                self.sys.state = MachineState::Hold;
            }
        }

        if flags.contains(RtFlags::MOTION_CANCEL) {
            self.sys.shared.clear_exec_state_flag(RtFlags::MOTION_CANCEL);
            if self.sys.state == MachineState::Cycle {
                self.sys.state = MachineState::Idle;
            }
        }

        if flags.contains(RtFlags::CYCLE_START) {
            self.sys.shared.clear_exec_state_flag(RtFlags::CYCLE_START);
            match self.sys.state {
                MachineState::Hold => {
                    self.sys.step_control.remove(StepControl::EXECUTE_HOLD);
                    self.sys.state = MachineState::Cycle;
                    self.steppers.wake_up();
                }
                MachineState::Idle if !self.planner.is_empty() => {
                    self.sys.state = MachineState::Cycle;
                    self.steppers.wake_up();
                }
                _ => {}
            }
        }

        if flags.contains(RtFlags::CYCLE_STOP) {
            self.sys.shared.clear_exec_state_flag(RtFlags::CYCLE_STOP);
            if self.sys.step_control.contains(StepControl::EXECUTE_SYS_MOTION) {
                self.sys
                    .step_control
                    .remove(StepControl::EXECUTE_SYS_MOTION | StepControl::END_MOTION);
            } else {
                self.sys.step_control = StepControl::empty();
                if self.sys.state == MachineState::Cycle {
                    self.sys.state = MachineState::Idle;
                }
                self.steppers.go_idle();
            }
        }

        // Keep the segment buffer fed from every cooperative wait.
        if self.sys.state.is_motion()
            || self.sys.step_control.contains(StepControl::EXECUTE_SYS_MOTION)
        {
            self.steppers.prep_buffer(&mut self.planner, &mut self.sys);
        }
    }

    /// Request a cycle start if the planner holds work, so a full buffer
    /// begins draining while the parser is still producing.
    pub fn auto_cycle_start(&mut self) {
        if !self.planner.is_empty() {
            self.sys.shared.set_exec_state_flag(RtFlags::CYCLE_START);
        }
    }

    /// Block until every queued segment has executed and the planner is
    /// empty, servicing realtime events throughout. Returns early on abort.
    pub fn planner_synchronize(&mut self) {
        self.auto_cycle_start();
        loop {
            self.poll_realtime();
            if self.sys.aborted() {
                return;
            }
            if self.planner.is_empty() && self.sys.state != MachineState::Cycle {
                return;
            }
        }
    }

    /// Abort everything (C10).
    ///
    /// Safe to call redundantly: the flag request is idempotent and the
    /// hardware half runs once per reset request. Interrupt handlers do not
    /// call this directly; they use `SharedState::request_reset` and the
    /// next foreground pass lands here.
    pub fn reset(&mut self) {
        self.sys.shared.request_reset();
        if self.reset_done {
            return;
        }
        self.reset_done = true;

        self.spindle.stop();
        self.coolant.stop();

        // Kill the steppers only when motion is in flight; a reset at rest
        // keeps them energized and position intact.
        if self.sys.state.is_motion()
            || self
                .sys
                .step_control
                .intersects(StepControl::EXECUTE_HOLD | StepControl::EXECUTE_SYS_MOTION)
        {
            if self.sys.state == MachineState::Homing {
                if self.sys.shared.exec_alarm().is_none() {
                    self.sys.shared.set_exec_alarm(Alarm::HomingFailReset);
                }
            } else {
                self.sys.shared.set_exec_alarm(Alarm::AbortCycle);
            }
            self.steppers.go_idle();
        }
    }

    /// Change the parking override mode after draining queued work.
    pub fn override_control_update(&mut self, mode: OverrideControl) {
        if !self.settings.parking.override_control {
            return;
        }
        self.planner_synchronize();
        if self.sys.aborted() {
            return;
        }
        self.sys.override_ctrl = mode;
    }

    /// Reboot-equivalent reinitialisation after an abort: wipe queues and
    /// pending events, reload the planned position, return to idle.
    pub fn reinitialize(&mut self) {
        self.steppers.reset();
        self.planner.reset();
        self.planner.sync_position(&self.sys.position);
        self.sys.shared.reinitialize();
        self.sys.step_control = StepControl::empty();
        self.sys.state = MachineState::Idle;
        self.reset_done = false;
    }
}
