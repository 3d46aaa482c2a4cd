//! Single-precision float routines
//!
//! The gateway never calls float methods directly; everything routes through
//! this shim so `no_std` builds can swap in `libm` without touching the
//! motion code. Enable exactly one of the `std` or `libm` features.

#[cfg(feature = "std")]
mod backend {
    pub fn sinf(x: f32) -> f32 {
        x.sin()
    }

    pub fn cosf(x: f32) -> f32 {
        x.cos()
    }

    pub fn atan2f(y: f32, x: f32) -> f32 {
        y.atan2(x)
    }

    pub fn sqrtf(x: f32) -> f32 {
        x.sqrt()
    }

    pub fn floorf(x: f32) -> f32 {
        x.floor()
    }

    pub fn fabsf(x: f32) -> f32 {
        x.abs()
    }
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
mod backend {
    pub use libm::{atan2f, cosf, fabsf, floorf, sinf, sqrtf};
}

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("kerf-core needs a float backend: enable the `std` or `libm` feature");

pub use backend::{atan2f, cosf, fabsf, floorf, sinf, sqrtf};

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;

    #[test]
    fn test_atan2_quadrants() {
        assert!((atan2f(1.0, 0.0) - PI / 2.0).abs() < 1e-6);
        assert!((atan2f(0.0, -1.0).abs() - PI).abs() < 1e-6);
    }

    #[test]
    fn test_sqrt_floor() {
        assert_eq!(sqrtf(9.0), 3.0);
        assert_eq!(floorf(2.9), 2.0);
    }
}
