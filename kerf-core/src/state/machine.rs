//! Machine state record
//!
//! One `System` instance exists per controller. The gateway owns it and
//! passes it explicitly to collaborators that need it; interrupt-visible
//! fields are isolated in [`SharedState`].

use bitflags::bitflags;

use super::shared::SharedState;
use crate::axis::Position;

/// Top-level machine mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MachineState {
    /// Nothing queued or executing.
    #[default]
    Idle,
    /// A latched alarm is awaiting acknowledgement.
    Alarm,
    /// Dry run: parsing and soft-limit checks happen, no motion is queued.
    CheckMode,
    /// Homing cycle in progress.
    Homing,
    /// Queued motion is executing.
    Cycle,
    /// Motion suspended by feed hold.
    Hold,
    /// Jogging motion is executing.
    Jog,
    /// Safety door open; motion parked.
    SafetyDoor,
    /// Sleep requested; steppers and peripherals are shut down.
    Sleep,
}

impl MachineState {
    /// States in which steppers are actively producing motion.
    pub fn is_motion(self) -> bool {
        matches!(
            self,
            MachineState::Cycle | MachineState::Homing | MachineState::Jog
        )
    }
}

bitflags! {
    /// Control bits steering the step-segment executor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StepControl: u8 {
        /// Finish the in-flight deceleration and stop.
        const END_MOTION = 1 << 0;
        /// A hold is decelerating or holding the cycle.
        const EXECUTE_HOLD = 1 << 1;
        /// An out-of-band system motion (parking, homing moves) is running.
        const EXECUTE_SYS_MOTION = 1 << 2;
        /// The executor must pick up a new spindle speed.
        const UPDATE_SPINDLE_RPM = 1 << 3;
    }
}

impl Default for StepControl {
    fn default() -> Self {
        StepControl::empty()
    }
}

/// Parking override mode, toggled by parser override commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverrideControl {
    /// Parking motion runs normally during feed hold.
    #[default]
    ParkingEnabled,
    /// Parking motion is suppressed.
    ParkingDisabled,
}

/// Process-wide machine state, single instance.
#[derive(Debug, Default)]
pub struct System {
    /// Current machine mode.
    pub state: MachineState,
    /// Step executor control bits.
    pub step_control: StepControl,
    /// Outcome of the most recent probe cycle.
    pub probe_succeeded: bool,
    /// Parking override mode.
    pub override_ctrl: OverrideControl,
    /// Executed machine position, maintained by the step executor.
    pub position: Position,
    /// Machine position captured when the probe pin triggered.
    pub probe_position: Position,
    /// Interrupt-visible flags.
    pub shared: SharedState,
}

impl System {
    /// Create an idle system at machine zero.
    pub const fn new() -> Self {
        Self {
            state: MachineState::Idle,
            step_control: StepControl::empty(),
            probe_succeeded: false,
            override_ctrl: OverrideControl::ParkingEnabled,
            position: [0.0; crate::axis::N_AXIS],
            probe_position: [0.0; crate::axis::N_AXIS],
            shared: SharedState::new(),
        }
    }

    /// Sticky abort flag, set by reset.
    pub fn aborted(&self) -> bool {
        self.shared.abort()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_states() {
        assert!(MachineState::Cycle.is_motion());
        assert!(MachineState::Homing.is_motion());
        assert!(MachineState::Jog.is_motion());
        assert!(!MachineState::Idle.is_motion());
        assert!(!MachineState::Hold.is_motion());
        assert!(!MachineState::CheckMode.is_motion());
    }

    #[test]
    fn test_new_system_is_idle() {
        let sys = System::new();
        assert_eq!(sys.state, MachineState::Idle);
        assert!(!sys.aborted());
        assert_eq!(sys.step_control, StepControl::empty());
    }
}
