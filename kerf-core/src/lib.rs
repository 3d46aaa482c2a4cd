//! Board-agnostic motion-command gateway for a G-code driven controller
//!
//! This crate is the layer between a G-code parser and a low-level
//! step-pulse executor. It contains all gateway logic that does not depend
//! on specific hardware implementations:
//!
//! - Collaborator traits (planner, step executor, spindle, coolant, probe,
//!   limits, reporting, delay)
//! - The process-wide machine state record and its interrupt-visible flags
//! - Line submission with soft limits and planner back-pressure
//! - Tolerance-driven arc decomposition
//! - Dwell, homing, probing, parking and reset protocols
//!
//! Everything is exercisable on a host: hardware enters only through the
//! trait seams, and behavior selection is runtime [`config::Settings`]
//! rather than build-time conditionals.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

pub mod axis;
pub mod config;
pub mod gateway;
pub mod math;
pub mod state;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use axis::{AxisMask, Position, AXIS_X, AXIS_Y, AXIS_Z, N_AXIS};
pub use config::{HomingConfig, ParkingConfig, Settings};
pub use gateway::{
    arc_angular_travel, arc_segment_count, ArcPlane, Gateway, ProbeCommandFlags, ProbeResult,
    ARC_ANGULAR_TRAVEL_EPSILON, DWELL_TIME_STEP_MS, N_ARC_CORRECTION,
};
pub use state::{
    Alarm, MachineState, OverrideControl, ProbeMonitor, RtFlags, SharedState, StepControl, System,
};
pub use traits::{
    Condition, Coolant, DelayTimer, FeedbackMessage, Limits, Machine, PlanBlock, PlanLine,
    PlanStatus, Planner, ProbePin, Reporter, Spindle, SpindleMode, StepExecutor,
};
