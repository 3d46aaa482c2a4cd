//! Planner buffer interface
//!
//! The planner proper (acceleration profiling, junction speeds, ring
//! bookkeeping) lives behind this trait. The gateway is its only submitter;
//! the step executor is its only consumer.

use bitflags::bitflags;

use crate::axis::Position;

bitflags! {
    /// Per-line condition bits carried from parser to planner.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Condition: u8 {
        /// Rapid (G0) motion; feed rate is ignored.
        const RAPID_MOTION = 1 << 0;
        /// Out-of-band single motion that bypasses the main queue.
        const SYSTEM_MOTION = 1 << 1;
        /// Feed override must not scale this motion.
        const NO_FEED_OVERRIDE = 1 << 2;
        /// Feed rate is an inverse-time multiplier (1/minutes).
        const INVERSE_TIME = 1 << 3;
        /// Spindle on, clockwise (M3).
        const SPINDLE_CW = 1 << 4;
        /// Spindle on, counter-clockwise (M4).
        const SPINDLE_CCW = 1 << 5;
        /// Flood coolant on.
        const COOLANT_FLOOD = 1 << 6;
        /// Mist coolant on.
        const COOLANT_MIST = 1 << 7;
    }
}

impl Default for Condition {
    fn default() -> Self {
        Condition::empty()
    }
}

/// Motion descriptor carried from parser to planner for each segment.
///
/// Descriptors are plain values; the arc decomposer mutates a local copy to
/// convert inverse-time feeds into per-segment absolute feeds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanLine {
    /// Feed rate in mm/min, or an inverse-time multiplier when
    /// [`Condition::INVERSE_TIME`] is set.
    pub feed_rate: f32,
    /// Programmed spindle speed in RPM.
    pub spindle_rpm: f32,
    /// Condition bits. At most one of SPINDLE_CW / SPINDLE_CCW may be set.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub condition: Condition,
}

impl PlanLine {
    /// Descriptor for a feed move at `feed_rate` mm/min.
    pub fn feed(feed_rate: f32) -> Self {
        Self {
            feed_rate,
            ..Self::default()
        }
    }

    /// Descriptor for a rapid move.
    pub fn rapid() -> Self {
        Self {
            condition: Condition::RAPID_MOTION,
            ..Self::default()
        }
    }
}

/// Outcome of a planner submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlanStatus {
    /// The segment was queued.
    Accepted,
    /// The segment had zero length in every axis and was discarded.
    EmptyBlock,
}

/// One queued linear segment as the executor sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanBlock {
    /// Absolute target of the segment.
    pub target: Position,
    /// Descriptor the segment was submitted with.
    pub line: PlanLine,
}

/// Bounded planner ring buffer.
///
/// Submissions are strictly ordered and consumed FIFO. A submission with
/// [`Condition::SYSTEM_MOTION`] set must land in the always-free head slot
/// without disturbing the suspended main queue.
pub trait Planner {
    /// Queue one linear segment. Returns [`PlanStatus::EmptyBlock`] when the
    /// target equals the planned position on every axis.
    fn submit(&mut self, target: &Position, line: &PlanLine) -> PlanStatus;

    /// True when no ring slot is free.
    fn is_full(&self) -> bool;

    /// True when nothing is queued.
    fn is_empty(&self) -> bool;

    /// Segment at the head of the queue, if any. Executor side.
    fn current_block(&self) -> Option<PlanBlock>;

    /// Drop the segment at the head of the queue. Executor side.
    fn discard_current_block(&mut self);

    /// Wipe every queued segment, including a parked system motion.
    fn reset(&mut self);

    /// Reload the planned position from the machine position.
    fn sync_position(&mut self, position: &Position);
}
