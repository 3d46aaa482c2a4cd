//! Wall-clock delay interface

/// Blocking millisecond delay used by dwells.
pub trait DelayTimer {
    /// Block for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}
