//! Collaborator interfaces
//!
//! These traits are the seams between the gateway and the rest of the
//! controller: planner, step executor, peripherals, switches, reporting.
//! A [`Machine`] implementation ties one concrete type to each seam.

pub mod clock;
pub mod coolant;
pub mod limits;
pub mod planner;
pub mod probe;
pub mod report;
pub mod spindle;
pub mod stepper;

pub use clock::DelayTimer;
pub use coolant::Coolant;
pub use limits::Limits;
pub use planner::{Condition, PlanBlock, PlanLine, PlanStatus, Planner};
pub use probe::ProbePin;
pub use report::{FeedbackMessage, Reporter};
pub use spindle::{Spindle, SpindleMode};
pub use stepper::StepExecutor;

/// Type-level wiring of one concrete collaborator per seam.
///
/// Implemented on an empty marker type; the gateway is generic over it so a
/// build selects its whole collaborator set with a single type parameter.
pub trait Machine {
    /// Planner ring buffer.
    type Planner: Planner;
    /// Step-pulse executor.
    type Steppers: StepExecutor<Self::Planner>;
    /// Spindle driver.
    type Spindle: Spindle;
    /// Coolant driver.
    type Coolant: Coolant;
    /// Probe input pin.
    type Probe: ProbePin;
    /// Limit switches and travel bounds.
    type Limits: Limits;
    /// Outbound reporting channel.
    type Reporter: Reporter;
    /// Millisecond delay source.
    type Delay: DelayTimer;
}
