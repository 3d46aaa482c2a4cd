//! Spindle driver interface

/// Spindle rotation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpindleMode {
    /// Spindle off.
    #[default]
    Disable,
    /// Clockwise (M3).
    Cw,
    /// Counter-clockwise (M4).
    Ccw,
}

/// Spindle hardware driver.
pub trait Spindle {
    /// Apply a mode and speed immediately. Callers that need the update to
    /// land in program order must drain the planner first.
    fn set_state(&mut self, mode: SpindleMode, rpm: f32);

    /// Stop the spindle. Must be cheap and safe from the reset path.
    fn stop(&mut self);
}
