//! Machine state
//!
//! The single process-wide state record and the interrupt-visible flag
//! words it isolates.

pub mod machine;
pub mod shared;

pub use machine::{MachineState, OverrideControl, StepControl, System};
pub use shared::{Alarm, ProbeMonitor, RtFlags, SharedState};
