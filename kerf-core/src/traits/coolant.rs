//! Coolant driver interface

/// Coolant hardware driver.
pub trait Coolant {
    /// Shut off all coolant outputs. Must be cheap and safe from the reset
    /// path.
    fn stop(&mut self);
}
