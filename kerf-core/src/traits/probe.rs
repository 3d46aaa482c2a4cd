//! Probe pin interface

/// Probe input pin.
pub trait ProbePin {
    /// Select the pin sense for the cycle: probe-away moves invert it so
    /// "triggered" means the pin released. Always restored to `false` before
    /// the probe cycle returns.
    fn configure_invert_mask(&mut self, is_probe_away: bool);

    /// Current triggered state, after the configured inversion.
    fn get_state(&self) -> bool;
}
