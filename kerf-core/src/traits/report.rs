//! Status and feedback reporting interface

use crate::axis::Position;
use crate::state::{Alarm, System};

/// Non-error feedback the gateway can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum FeedbackMessage {
    /// The planner rejected a parking move and it was skipped.
    ParkingMoveSkipped,
}

/// Outbound reporting channel (serial console, status line, ...).
pub trait Reporter {
    /// An alarm was latched; the machine is entering the alarm state.
    fn alarm(&mut self, alarm: Alarm);

    /// A queued status report request is being serviced.
    fn status_report(&mut self, sys: &System);

    /// Operational feedback worth surfacing but not alarm-worthy.
    fn feedback(&mut self, message: FeedbackMessage);

    /// Probe cycle finished; emit the captured coordinates.
    fn probe_report(&mut self, position: &Position, succeeded: bool);
}
