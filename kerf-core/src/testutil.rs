//! Mock collaborators for gateway tests
//!
//! Small recording fakes, one per seam. The step executor fake retires one
//! planner block per `prep_buffer` call so blocking loops make progress the
//! way the interrupt-driven executor would.

use core::cell::Cell;

use heapless::{Deque, Vec};

use crate::axis::{AxisMask, Position};
use crate::config::Settings;
use crate::gateway::Gateway;
use crate::state::{Alarm, ProbeMonitor, RtFlags, System};
use crate::traits::{
    Condition, Coolant, DelayTimer, FeedbackMessage, Limits, Machine, PlanBlock, PlanLine,
    PlanStatus, Planner, ProbePin, Reporter, Spindle, SpindleMode, StepExecutor,
};

const QUEUE: usize = 256;

/// Recording planner with scriptable fullness.
#[derive(Default)]
pub struct MockPlanner {
    /// Every accepted submission, in order.
    pub submitted: Vec<PlanBlock, QUEUE>,
    queue: Deque<PlanBlock, QUEUE>,
    park_slot: Option<PlanBlock>,
    /// Planned position.
    pub position: Position,
    /// Report "full" for this many `is_full` calls.
    pub full_polls: Cell<u32>,
    /// Number of `is_full` calls observed.
    pub full_checks: Cell<u32>,
    /// Number of `reset` calls observed.
    pub resets: u32,
    /// Last `sync_position` argument.
    pub synced: Option<Position>,
}

impl Planner for MockPlanner {
    fn submit(&mut self, target: &Position, line: &PlanLine) -> PlanStatus {
        if line.condition.contains(Condition::SYSTEM_MOTION) {
            if self.park_slot.is_some() || *target == self.position {
                return PlanStatus::EmptyBlock;
            }
            self.park_slot = Some(PlanBlock {
                target: *target,
                line: *line,
            });
            return PlanStatus::Accepted;
        }
        if *target == self.position {
            return PlanStatus::EmptyBlock;
        }
        let block = PlanBlock {
            target: *target,
            line: *line,
        };
        let _ = self.submitted.push(block);
        let _ = self.queue.push_back(block);
        self.position = *target;
        PlanStatus::Accepted
    }

    fn is_full(&self) -> bool {
        self.full_checks.set(self.full_checks.get() + 1);
        if self.full_polls.get() > 0 {
            self.full_polls.set(self.full_polls.get() - 1);
            return true;
        }
        false
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty() && self.park_slot.is_none()
    }

    fn current_block(&self) -> Option<PlanBlock> {
        self.park_slot.or_else(|| self.queue.front().copied())
    }

    fn discard_current_block(&mut self) {
        if self.park_slot.take().is_none() {
            self.queue.pop_front();
        }
    }

    fn reset(&mut self) {
        self.queue.clear();
        self.park_slot = None;
        self.resets += 1;
    }

    fn sync_position(&mut self, position: &Position) {
        self.position = *position;
        self.synced = Some(*position);
    }
}

/// Step executor fake: one block per prep call, instant completion.
#[derive(Default)]
pub struct MockStepper {
    /// Executor is generating pulses.
    pub awake: bool,
    /// When set and the probe monitor is active, the next executed block
    /// triggers the probe at this position instead of completing.
    pub probe_trigger: Option<Position>,
    /// Number of blocks retired.
    pub blocks_executed: u32,
    /// Number of `go_idle` calls.
    pub idle_calls: u32,
    /// Number of `reset` calls.
    pub reset_calls: u32,
    /// Parking buffer currently swapped in.
    pub parking_buffer: bool,
    /// `parking_setup_buffer` / `parking_restore_buffer` call counts.
    pub parking_setups: u32,
    /// See `parking_setups`.
    pub parking_restores: u32,
}

impl StepExecutor<MockPlanner> for MockStepper {
    fn wake_up(&mut self) {
        self.awake = true;
    }

    fn go_idle(&mut self) {
        self.awake = false;
        self.idle_calls += 1;
    }

    fn reset(&mut self) {
        self.awake = false;
        self.reset_calls += 1;
    }

    fn prep_buffer(&mut self, planner: &mut MockPlanner, sys: &mut System) {
        if !self.awake {
            return;
        }
        let Some(block) = planner.current_block() else {
            sys.shared.set_exec_state_flag(RtFlags::CYCLE_STOP);
            self.awake = false;
            return;
        };
        if sys.shared.probe_monitor() == ProbeMonitor::Active {
            if let Some(at) = self.probe_trigger.take() {
                // Pin edge mid-segment: stop here, leave the remainder
                // queued, and let the realtime poll end the motion.
                sys.position = at;
                sys.probe_position = at;
                sys.shared.set_probe_monitor(ProbeMonitor::Off);
                sys.shared.set_exec_state_flag(RtFlags::MOTION_CANCEL);
                self.awake = false;
                return;
            }
        }
        sys.position = block.target;
        planner.discard_current_block();
        self.blocks_executed += 1;
        if planner.is_empty() {
            sys.shared.set_exec_state_flag(RtFlags::CYCLE_STOP);
            self.awake = false;
        }
    }

    fn parking_setup_buffer(&mut self) {
        self.parking_buffer = true;
        self.parking_setups += 1;
    }

    fn parking_restore_buffer(&mut self) {
        self.parking_buffer = false;
        self.parking_restores += 1;
    }
}

/// Recording spindle.
#[derive(Default)]
pub struct MockSpindle {
    /// Every `set_state` call.
    pub writes: Vec<(SpindleMode, f32), 16>,
    /// Number of `stop` calls.
    pub stops: u32,
}

impl Spindle for MockSpindle {
    fn set_state(&mut self, mode: SpindleMode, rpm: f32) {
        let _ = self.writes.push((mode, rpm));
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

/// Recording coolant.
#[derive(Default)]
pub struct MockCoolant {
    /// Number of `stop` calls.
    pub stops: u32,
}

impl Coolant for MockCoolant {
    fn stop(&mut self) {
        self.stops += 1;
    }
}

/// Probe pin fake.
#[derive(Default)]
pub struct MockProbe {
    /// Physical pin level.
    pub asserted: bool,
    /// Current invert sense.
    pub inverted: bool,
    /// History of `configure_invert_mask` arguments.
    pub invert_history: Vec<bool, 8>,
}

impl ProbePin for MockProbe {
    fn configure_invert_mask(&mut self, is_probe_away: bool) {
        self.inverted = is_probe_away;
        let _ = self.invert_history.push(is_probe_away);
    }

    fn get_state(&self) -> bool {
        self.asserted ^ self.inverted
    }
}

/// Limits fake with a symmetric travel cube and scriptable homing.
pub struct MockLimits {
    /// Soft travel bound applied to every axis, +/-.
    pub max_travel: f32,
    /// Switches currently asserted.
    pub asserted: AxisMask,
    /// Homed coordinate written per axis by `go_home`.
    pub homed: Position,
    /// Inject a homing failure.
    pub fail_with: Option<Alarm>,
    /// Hard-limit interrupts armed.
    pub hard_enabled: bool,
    /// Masks passed to `go_home`, in order.
    pub home_calls: Vec<AxisMask, 8>,
}

impl Default for MockLimits {
    fn default() -> Self {
        Self {
            max_travel: f32::MAX,
            asserted: AxisMask::empty(),
            homed: [0.0; crate::axis::N_AXIS],
            fail_with: None,
            hard_enabled: true,
            home_calls: Vec::new(),
        }
    }
}

impl Limits for MockLimits {
    fn init(&mut self) {
        self.hard_enabled = true;
    }

    fn disable(&mut self) {
        self.hard_enabled = false;
    }

    fn get_state(&self) -> AxisMask {
        self.asserted
    }

    fn soft_check(&mut self, target: &Position, sys: &mut System) {
        if target
            .iter()
            .any(|&t| t > self.max_travel || t < -self.max_travel)
        {
            sys.shared.set_exec_alarm(Alarm::SoftLimit);
            sys.shared.request_reset();
        }
    }

    fn go_home(&mut self, mask: AxisMask, sys: &mut System) {
        if sys.aborted() || sys.shared.exec_state().contains(RtFlags::RESET) {
            return;
        }
        let _ = self.home_calls.push(mask);
        if let Some(alarm) = self.fail_with {
            sys.shared.set_exec_alarm(alarm);
            sys.shared.request_reset();
            return;
        }
        for axis in mask.axes() {
            sys.position[axis] = self.homed[axis];
        }
    }
}

/// Recording reporter.
#[derive(Default)]
pub struct MockReporter {
    /// Alarms surfaced, in order.
    pub alarms: Vec<Alarm, 8>,
    /// Feedback messages surfaced, in order.
    pub feedback: Vec<FeedbackMessage, 8>,
    /// Status report count.
    pub status_reports: u32,
    /// Probe reports surfaced, in order.
    pub probe_reports: Vec<(Position, bool), 8>,
}

impl Reporter for MockReporter {
    fn alarm(&mut self, alarm: Alarm) {
        let _ = self.alarms.push(alarm);
    }

    fn status_report(&mut self, _sys: &System) {
        self.status_reports += 1;
    }

    fn feedback(&mut self, message: FeedbackMessage) {
        let _ = self.feedback.push(message);
    }

    fn probe_report(&mut self, position: &Position, succeeded: bool) {
        let _ = self.probe_reports.push((*position, succeeded));
    }
}

/// Delay fake accumulating requested time.
#[derive(Default)]
pub struct MockDelay {
    /// Total milliseconds requested.
    pub total_ms: u64,
}

impl DelayTimer for MockDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.total_ms += u64::from(ms);
    }
}

/// Type-level wiring for the mock set.
pub enum TestMachine {}

impl Machine for TestMachine {
    type Planner = MockPlanner;
    type Steppers = MockStepper;
    type Spindle = MockSpindle;
    type Coolant = MockCoolant;
    type Probe = MockProbe;
    type Limits = MockLimits;
    type Reporter = MockReporter;
    type Delay = MockDelay;
}

/// Gateway over the mock collaborators.
pub type TestGateway = Gateway<TestMachine>;

/// Idle gateway with default settings and all-mock collaborators.
pub fn test_gateway() -> TestGateway {
    Gateway::new(
        Settings::default(),
        MockPlanner::default(),
        MockStepper::default(),
        MockSpindle::default(),
        MockCoolant::default(),
        MockProbe::default(),
        MockLimits::default(),
        MockReporter::default(),
        MockDelay::default(),
    )
}
