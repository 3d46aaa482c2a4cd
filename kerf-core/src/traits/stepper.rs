//! Step-segment executor interface
//!
//! The executor pulls blocks from the planner, generates step pulses, and
//! maintains the executed machine position in `System`. On a real target its
//! heart is a timer interrupt; `prep_buffer` is the foreground half that
//! keeps the segment buffer fed, and is driven from every cooperative wait
//! in the gateway.

use super::planner::Planner;
use crate::state::System;

/// Step-pulse executor.
pub trait StepExecutor<P: Planner> {
    /// Start (or resume) pulse generation.
    fn wake_up(&mut self);

    /// Stop pulse generation. Depending on the idle-delay policy this may
    /// also de-energize the motors, losing position.
    fn go_idle(&mut self);

    /// Wipe the step segment buffer and any in-flight partial segment.
    fn reset(&mut self);

    /// Convert queued planner blocks into step segments. The executor
    /// signals end-of-motion by setting the CYCLE_STOP runtime flag, and
    /// services the probe monitor while it is armed.
    fn prep_buffer(&mut self, planner: &mut P, sys: &mut System);

    /// Redirect the segment buffer for an out-of-band system motion,
    /// preserving the suspended main buffer.
    fn parking_setup_buffer(&mut self);

    /// Restore the main segment buffer after a system motion.
    fn parking_restore_buffer(&mut self);
}
