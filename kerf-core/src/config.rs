//! Gateway configuration
//!
//! All behavior selection is runtime data rather than compile-time
//! conditionals, so every code path stays exercisable in host tests. A
//! build for a fixed machine simply constructs one `Settings` value at
//! init.

use heapless::Vec;

use crate::axis::AxisMask;

/// Maximum number of chained homing cycles.
pub const MAX_HOMING_CYCLES: usize = 3;

/// Homing behavior.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HomingConfig {
    /// Allow `$H<axis>` style single-axis cycles: a non-empty mask passed to
    /// the homing cycle runs exactly that mask instead of the configured
    /// sequence.
    pub single_axis_commands: bool,
    /// Limit switches are wired to both ends of travel on a shared pin.
    /// Homing must refuse to start while any switch reads asserted, since it
    /// cannot tell which end is triggered.
    pub two_switches_on_axes: bool,
    /// Cycle sequence, first entry runs first (e.g. Z alone, then X|Y).
    pub cycles: Vec<AxisMask, MAX_HOMING_CYCLES>,
}

impl Default for HomingConfig {
    fn default() -> Self {
        let mut cycles = Vec::new();
        // Pull Z clear of the work before moving in the plane.
        let _ = cycles.push(AxisMask::Z);
        let _ = cycles.push(AxisMask::X | AxisMask::Y);
        Self {
            single_axis_commands: false,
            two_switches_on_axes: false,
            cycles,
        }
    }
}

/// Parking behavior.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParkingConfig {
    /// Enable the safe-park motion during feed hold.
    pub enabled: bool,
    /// Allow the parser to toggle parking with override commands.
    pub override_control: bool,
}

/// Runtime settings consumed by the gateway.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    /// Check every queued line against the machine travel bounds.
    pub soft_limits: bool,
    /// Laser mode: zero-length lines with an M3 spindle condition become
    /// synchronous power updates instead of being discarded.
    pub laser_mode: bool,
    /// Maximum chord-to-arc deviation for arc segmentation, in millimetres.
    pub arc_tolerance: f32,
    /// Emit the probe position through the reporter after each probe cycle.
    pub report_probe_coordinates: bool,
    /// Homing behavior.
    pub homing: HomingConfig,
    /// Parking behavior.
    pub parking: ParkingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            soft_limits: false,
            laser_mode: false,
            arc_tolerance: 0.002,
            report_probe_coordinates: false,
            homing: HomingConfig::default(),
            parking: ParkingConfig::default(),
        }
    }
}
