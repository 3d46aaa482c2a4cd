//! Axis vocabulary shared by every motion component
//!
//! Targets and positions are absolute machine coordinates in millimetres,
//! stored as single-precision floats. Single precision is deliberate: the
//! arc tolerance constants are derived for f32 on the target FPUs.

use bitflags::bitflags;

/// Number of controlled axes.
pub const N_AXIS: usize = 3;

/// X axis index into a [`Position`].
pub const AXIS_X: usize = 0;
/// Y axis index into a [`Position`].
pub const AXIS_Y: usize = 1;
/// Z axis index into a [`Position`].
pub const AXIS_Z: usize = 2;

/// Absolute machine position in millimetres.
pub type Position = [f32; N_AXIS];

bitflags! {
    /// Set of axes, used for homing cycle selection and limit switch state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AxisMask: u8 {
        const X = 1 << AXIS_X;
        const Y = 1 << AXIS_Y;
        const Z = 1 << AXIS_Z;
    }
}

impl Default for AxisMask {
    fn default() -> Self {
        AxisMask::empty()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AxisMask {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "AxisMask({=u8:b})", self.bits());
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AxisMask {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AxisMask {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Ok(AxisMask::from_bits_truncate(bits))
    }
}

impl AxisMask {
    /// Mask selecting every axis.
    pub const ALL: AxisMask = AxisMask::all();

    /// Iterate the axis indices contained in this mask.
    pub fn axes(self) -> impl Iterator<Item = usize> {
        (0..N_AXIS).filter(move |i| self.bits() & (1 << i) != 0)
    }
}
