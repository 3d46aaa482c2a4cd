//! Fixed-capacity planner ring
//!
//! Stand-in for the real planner: no acceleration profiling, just FIFO
//! bookkeeping with the same interface contract, including the always-free
//! head slot for system motions.

use std::collections::VecDeque;

use kerf_core::{Condition, PlanBlock, PlanLine, PlanStatus, Planner, Position};

/// Default ring capacity, matching the classic firmware's block buffer.
pub const DEFAULT_CAPACITY: usize = 16;

/// FIFO planner ring with a side slot for system motions.
#[derive(Debug)]
pub struct SimPlanner {
    queue: VecDeque<PlanBlock>,
    system_slot: Option<PlanBlock>,
    capacity: usize,
    position: Position,
}

impl Default for SimPlanner {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SimPlanner {
    /// Ring with room for `capacity` queued segments.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            system_slot: None,
            capacity,
            position: [0.0; kerf_core::N_AXIS],
        }
    }

    /// Planned position: where the queue ends.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Number of queued segments, excluding a parked system motion.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing at all is queued.
    pub fn is_drained(&self) -> bool {
        self.queue.is_empty() && self.system_slot.is_none()
    }

    /// Parked system motion, if any.
    pub fn system_block(&self) -> Option<PlanBlock> {
        self.system_slot
    }

    /// Remove and return the parked system motion.
    pub fn take_system_block(&mut self) -> Option<PlanBlock> {
        self.system_slot.take()
    }
}

impl Planner for SimPlanner {
    fn submit(&mut self, target: &Position, line: &PlanLine) -> PlanStatus {
        let block = PlanBlock {
            target: *target,
            line: *line,
        };
        if line.condition.contains(Condition::SYSTEM_MOTION) {
            // The head slot holds exactly one system motion and leaves the
            // suspended main queue untouched.
            if self.system_slot.is_some() || *target == self.position {
                return PlanStatus::EmptyBlock;
            }
            self.system_slot = Some(block);
            return PlanStatus::Accepted;
        }
        if *target == self.position {
            return PlanStatus::EmptyBlock;
        }
        debug_assert!(self.queue.len() < self.capacity, "submit past back-pressure");
        self.queue.push_back(block);
        self.position = *target;
        PlanStatus::Accepted
    }

    fn is_full(&self) -> bool {
        self.queue.len() >= self.capacity
    }

    fn is_empty(&self) -> bool {
        self.is_drained()
    }

    fn current_block(&self) -> Option<PlanBlock> {
        self.system_slot.or_else(|| self.queue.front().copied())
    }

    fn discard_current_block(&mut self) {
        if self.system_slot.take().is_none() {
            self.queue.pop_front();
        }
    }

    fn reset(&mut self) {
        self.queue.clear();
        self.system_slot = None;
    }

    fn sync_position(&mut self, position: &Position) {
        self.position = *position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut planner = SimPlanner::with_capacity(4);
        planner.submit(&[1.0, 0.0, 0.0], &PlanLine::feed(100.0));
        planner.submit(&[2.0, 0.0, 0.0], &PlanLine::feed(100.0));
        assert_eq!(planner.current_block().unwrap().target, [1.0, 0.0, 0.0]);
        planner.discard_current_block();
        assert_eq!(planner.current_block().unwrap().target, [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_zero_length_discarded() {
        let mut planner = SimPlanner::default();
        planner.submit(&[1.0, 0.0, 0.0], &PlanLine::feed(100.0));
        let status = planner.submit(&[1.0, 0.0, 0.0], &PlanLine::feed(100.0));
        assert_eq!(status, PlanStatus::EmptyBlock);
        assert_eq!(planner.len(), 1);
    }

    #[test]
    fn test_fullness_tracks_capacity() {
        let mut planner = SimPlanner::with_capacity(2);
        planner.submit(&[1.0, 0.0, 0.0], &PlanLine::feed(100.0));
        assert!(!planner.is_full());
        planner.submit(&[2.0, 0.0, 0.0], &PlanLine::feed(100.0));
        assert!(planner.is_full());
    }

    #[test]
    fn test_system_slot_bypasses_queue() {
        let mut planner = SimPlanner::with_capacity(2);
        planner.submit(&[1.0, 0.0, 0.0], &PlanLine::feed(100.0));
        let mut line = PlanLine::rapid();
        line.condition |= Condition::SYSTEM_MOTION;
        let status = planner.submit(&[0.0, 0.0, 40.0], &line);
        assert_eq!(status, PlanStatus::Accepted);
        // The system motion runs first and does not consume ring space.
        assert_eq!(planner.current_block().unwrap().target, [0.0, 0.0, 40.0]);
        assert_eq!(planner.len(), 1);
        planner.discard_current_block();
        assert_eq!(planner.current_block().unwrap().target, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_reset_wipes_everything() {
        let mut planner = SimPlanner::default();
        planner.submit(&[1.0, 0.0, 0.0], &PlanLine::feed(100.0));
        let mut line = PlanLine::rapid();
        line.condition |= Condition::SYSTEM_MOTION;
        planner.submit(&[0.0, 0.0, 40.0], &line);
        planner.reset();
        assert!(planner.is_drained());
    }

    #[test]
    fn test_sync_position_reloads_plan_origin() {
        let mut planner = SimPlanner::default();
        planner.submit(&[5.0, 0.0, 0.0], &PlanLine::feed(100.0));
        planner.sync_position(&[3.0, 0.0, 0.0]);
        assert_eq!(planner.position(), [3.0, 0.0, 0.0]);
        // A move back to the synced position is zero-length now.
        let status = planner.submit(&[3.0, 0.0, 0.0], &PlanLine::feed(100.0));
        assert_eq!(status, PlanStatus::EmptyBlock);
    }
}
