//! Simulated collaborators and gateway wiring
//!
//! The step executor retires one planner block per prep call and completes
//! it instantly; probing stops mid-block at a configured trigger point the
//! way the real executor stops on the pin edge interrupt.

use kerf_core::{
    Alarm, AxisMask, Coolant, DelayTimer, FeedbackMessage, Gateway, Limits, Machine, Planner,
    Position, ProbeMonitor, ProbePin, Reporter, RtFlags, Settings, Spindle, SpindleMode,
    StepExecutor, System, N_AXIS,
};

use crate::planner::SimPlanner;

/// Simulated machine build error.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    /// The planner ring needs at least one slot.
    #[error("planner ring capacity must be at least 1")]
    RingCapacity,
    /// travel_min must stay below travel_max on every axis.
    #[error("travel bounds inverted on axis {0}")]
    TravelBounds(usize),
}

/// Simulated machine configuration.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Planner ring capacity.
    pub ring_capacity: usize,
    /// Lower soft travel bound per axis, mm.
    pub travel_min: Position,
    /// Upper soft travel bound per axis, mm.
    pub travel_max: Position,
    /// Machine coordinates established by homing.
    pub homed: Position,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ring_capacity: crate::planner::DEFAULT_CAPACITY,
            travel_min: [-400.0; N_AXIS],
            travel_max: [400.0; N_AXIS],
            homed: [0.0; N_AXIS],
        }
    }
}

/// Parameter of `point` along the segment `start -> end`, measured on the
/// dominant axis. `None` for a degenerate segment.
fn param_along(start: &Position, end: &Position, point: &Position) -> Option<f32> {
    let (axis, delta) = (0..N_AXIS)
        .map(|i| (i, end[i] - start[i]))
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))?;
    if delta == 0.0 {
        return None;
    }
    Some((point[axis] - start[axis]) / delta)
}

/// Instant-execution step generator.
#[derive(Debug, Default)]
pub struct SimStepper {
    awake: bool,
    parking_buffer: bool,
    /// Machine position at which the probe pin fires, if anywhere.
    pub trigger_at: Option<Position>,
    /// Inject an interrupt-side reset request after this many blocks.
    pub reset_after_blocks: Option<u32>,
    /// Blocks retired.
    pub blocks_executed: u32,
    /// Target of the most recently completed block.
    pub last_executed: Option<Position>,
    /// Total travel in millimetres.
    pub travel_mm: f64,
}

impl SimStepper {
    /// Executor currently generating pulses.
    pub fn is_awake(&self) -> bool {
        self.awake
    }

    /// Parking buffer currently swapped in.
    pub fn parking_buffer_active(&self) -> bool {
        self.parking_buffer
    }
}

impl StepExecutor<SimPlanner> for SimStepper {
    fn wake_up(&mut self) {
        self.awake = true;
    }

    fn go_idle(&mut self) {
        self.awake = false;
    }

    fn reset(&mut self) {
        self.awake = false;
    }

    fn prep_buffer(&mut self, planner: &mut SimPlanner, sys: &mut System) {
        if !self.awake {
            return;
        }
        if self.parking_buffer {
            // Redirected buffer: clock the single system motion and leave
            // the suspended main queue alone.
            if let Some(block) = planner.take_system_block() {
                let start = sys.position;
                sys.position = block.target;
                self.blocks_executed += 1;
                self.last_executed = Some(block.target);
                self.travel_mm += (0..N_AXIS)
                    .map(|i| f64::from(block.target[i] - start[i]).powi(2))
                    .sum::<f64>()
                    .sqrt();
            }
            sys.shared.set_exec_state_flag(RtFlags::CYCLE_STOP);
            self.awake = false;
            return;
        }
        let Some(block) = planner.current_block() else {
            sys.shared.set_exec_state_flag(RtFlags::CYCLE_STOP);
            self.awake = false;
            return;
        };

        let start = sys.position;
        if sys.shared.probe_monitor() == ProbeMonitor::Active {
            if let Some(trigger) = self.trigger_at {
                if let Some(t) = param_along(&start, &block.target, &trigger) {
                    if (0.0..=1.0).contains(&t) {
                        // Pin edge: stop here mid-segment. The remainder of
                        // the block stays queued for the gateway to discard.
                        log::debug!("probe edge at {trigger:?} (t = {t:.3})");
                        sys.position = trigger;
                        sys.probe_position = trigger;
                        sys.shared.set_probe_monitor(ProbeMonitor::Off);
                        sys.shared.set_exec_state_flag(RtFlags::MOTION_CANCEL);
                        self.trigger_at = None;
                        self.awake = false;
                        return;
                    }
                }
            }
        }

        sys.position = block.target;
        planner.discard_current_block();
        self.blocks_executed += 1;
        self.last_executed = Some(block.target);
        self.travel_mm += (0..N_AXIS)
            .map(|i| f64::from(block.target[i] - start[i]).powi(2))
            .sum::<f64>()
            .sqrt();

        if let Some(after) = self.reset_after_blocks {
            if self.blocks_executed >= after {
                // Stand-in for the realtime interrupt receiving 0x18.
                sys.shared.request_reset();
                self.reset_after_blocks = None;
            }
        }

        if planner.is_empty() {
            sys.shared.set_exec_state_flag(RtFlags::CYCLE_STOP);
            self.awake = false;
        }
    }

    fn parking_setup_buffer(&mut self) {
        self.parking_buffer = true;
    }

    fn parking_restore_buffer(&mut self) {
        self.parking_buffer = false;
    }
}

/// Recording spindle.
#[derive(Debug, Default)]
pub struct SimSpindle {
    /// Current mode.
    pub mode: SpindleMode,
    /// Current speed.
    pub rpm: f32,
    /// Every `set_state` call, in order.
    pub writes: Vec<(SpindleMode, f32)>,
    /// `stop` call count.
    pub stops: u32,
}

impl Spindle for SimSpindle {
    fn set_state(&mut self, mode: SpindleMode, rpm: f32) {
        self.mode = mode;
        self.rpm = rpm;
        self.writes.push((mode, rpm));
    }

    fn stop(&mut self) {
        self.mode = SpindleMode::Disable;
        self.rpm = 0.0;
        self.stops += 1;
    }
}

/// Recording coolant.
#[derive(Debug, Default)]
pub struct SimCoolant {
    /// Coolant currently running.
    pub running: bool,
    /// `stop` call count.
    pub stops: u32,
}

impl Coolant for SimCoolant {
    fn stop(&mut self) {
        self.running = false;
        self.stops += 1;
    }
}

/// Probe pin fake.
#[derive(Debug, Default)]
pub struct SimProbe {
    /// Physical pin level.
    pub asserted: bool,
    inverted: bool,
}

impl ProbePin for SimProbe {
    fn configure_invert_mask(&mut self, is_probe_away: bool) {
        self.inverted = is_probe_away;
    }

    fn get_state(&self) -> bool {
        self.asserted ^ self.inverted
    }
}

/// Switch and travel-bounds fake.
#[derive(Debug)]
pub struct SimLimits {
    travel_min: Position,
    travel_max: Position,
    homed: Position,
    /// Switches currently asserted.
    pub asserted: AxisMask,
    /// Hard-limit interrupts armed.
    pub hard_enabled: bool,
    /// Inject a homing failure.
    pub fail_with: Option<Alarm>,
    /// Masks homed, in order.
    pub home_calls: Vec<AxisMask>,
}

impl SimLimits {
    fn new(config: &SimConfig) -> Self {
        Self {
            travel_min: config.travel_min,
            travel_max: config.travel_max,
            homed: config.homed,
            asserted: AxisMask::empty(),
            hard_enabled: true,
            fail_with: None,
            home_calls: Vec::new(),
        }
    }
}

impl Limits for SimLimits {
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
        for axis in 0..N_AXIS {
            if target[axis] < self.travel_min[axis] || target[axis] > self.travel_max[axis] {
                log::warn!(
                    "soft limit: axis {axis} target {} outside [{}, {}]",
                    target[axis],
                    self.travel_min[axis],
                    self.travel_max[axis]
                );
                sys.shared.set_exec_alarm(Alarm::SoftLimit);
                sys.shared.request_reset();
                return;
            }
        }
    }

    fn go_home(&mut self, mask: AxisMask, sys: &mut System) {
        if sys.aborted() || sys.shared.exec_state().contains(RtFlags::RESET) {
            return;
        }
        self.home_calls.push(mask);
        if let Some(alarm) = self.fail_with {
            log::warn!("homing failed: {alarm:?}");
            sys.shared.set_exec_alarm(alarm);
            sys.shared.request_reset();
            return;
        }
        for axis in mask.axes() {
            sys.position[axis] = self.homed[axis];
        }
        log::debug!("homed {mask:?} -> {:?}", sys.position);
    }
}

/// Recording reporter backed by the `log` facade.
#[derive(Debug, Default)]
pub struct SimReporter {
    /// Alarms surfaced, in order.
    pub alarms: Vec<Alarm>,
    /// Feedback messages surfaced, in order.
    pub feedback: Vec<FeedbackMessage>,
    /// Status report count.
    pub status_reports: u32,
    /// Probe reports surfaced, in order.
    pub probe_reports: Vec<(Position, bool)>,
}

impl Reporter for SimReporter {
    fn alarm(&mut self, alarm: Alarm) {
        log::warn!("ALARM: {alarm:?}");
        self.alarms.push(alarm);
    }

    fn status_report(&mut self, sys: &System) {
        log::info!("<{:?}|MPos:{:?}>", sys.state, sys.position);
        self.status_reports += 1;
    }

    fn feedback(&mut self, message: FeedbackMessage) {
        log::info!("[MSG: {message:?}]");
        self.feedback.push(message);
    }

    fn probe_report(&mut self, position: &Position, succeeded: bool) {
        log::info!("[PRB:{position:?}:{}]", u8::from(succeeded));
        self.probe_reports.push((*position, succeeded));
    }
}

/// Delay fake: accounts time instead of sleeping.
#[derive(Debug, Default)]
pub struct SimDelay {
    /// Total milliseconds requested.
    pub slept_ms: u64,
}

impl DelayTimer for SimDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.slept_ms += u64::from(ms);
    }
}

/// Type-level wiring of the simulated collaborator set.
pub enum SimMachine {}

impl Machine for SimMachine {
    type Planner = SimPlanner;
    type Steppers = SimStepper;
    type Spindle = SimSpindle;
    type Coolant = SimCoolant;
    type Probe = SimProbe;
    type Limits = SimLimits;
    type Reporter = SimReporter;
    type Delay = SimDelay;
}

/// Gateway over the simulated machine.
pub type SimGateway = Gateway<SimMachine>;

/// Build a simulated gateway.
pub fn build(settings: Settings, config: SimConfig) -> Result<SimGateway, BuildError> {
    if config.ring_capacity < 1 {
        return Err(BuildError::RingCapacity);
    }
    for axis in 0..N_AXIS {
        if config.travel_min[axis] >= config.travel_max[axis] {
            return Err(BuildError::TravelBounds(axis));
        }
    }
    Ok(Gateway::new(
        settings,
        SimPlanner::with_capacity(config.ring_capacity),
        SimStepper::default(),
        SimSpindle::default(),
        SimCoolant::default(),
        SimProbe::default(),
        SimLimits::new(&config),
        SimReporter::default(),
        SimDelay::default(),
    ))
}
