//! Limit switch interface
//!
//! Covers both the hard-limit pins and the soft travel bounds; the bounds
//! data and the homing seek/back-off/re-seek moves live behind this trait.

use crate::axis::{AxisMask, Position};
use crate::state::System;

/// Limit switch and travel bounds collaborator.
pub trait Limits {
    /// Arm the hard-limit pin-change interrupts.
    fn init(&mut self);

    /// Mask the hard-limit interrupts (homing would self-trigger on
    /// contact).
    fn disable(&mut self);

    /// Switches currently reading asserted.
    fn get_state(&self) -> AxisMask;

    /// Validate a target against the travel bounds. On violation the
    /// implementation latches the soft-limit alarm and requests a reset; the
    /// caller observes the abort on its next realtime poll and never submits
    /// the motion.
    fn soft_check(&mut self, target: &Position, sys: &mut System);

    /// Run one homing cycle for the masked axes: seek to the switches, back
    /// off, re-seek slowly, and leave the homed coordinates in
    /// `sys.position`. On failure the implementation latches a homing alarm
    /// and requests a reset. Must return promptly once a reset is pending.
    fn go_home(&mut self, mask: AxisMask, sys: &mut System);
}
