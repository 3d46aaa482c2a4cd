//! Arc decomposition
//!
//! Replaces a circular or helical arc with linear segments whose chord never
//! deviates from the true arc by more than the configured tolerance. The
//! radius vector is advanced by an incremental small-angle rotation, with a
//! periodic exact recomputation that bounds the accumulated drift; single
//! trig calls cost 100-200 us on the target MCUs, the rotation about 40 us.

use core::f32::consts::PI;

use crate::axis::{Position, AXIS_X, AXIS_Y, AXIS_Z};
use crate::math;
use crate::traits::{Condition, Machine, PlanLine};

use super::Gateway;

/// Incremental rotations applied between exact corrections.
pub const N_ARC_CORRECTION: u8 = 12;

/// Angular travel this close to zero is treated as a full revolution, so
/// `I J` full-circle commands behave correctly.
pub const ARC_ANGULAR_TRAVEL_EPSILON: f32 = 5e-7;

/// Circle plane and helical axis selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArcPlane {
    /// First axis of the circle plane.
    pub axis_0: usize,
    /// Second axis of the circle plane.
    pub axis_1: usize,
    /// Axis of helical travel.
    pub axis_linear: usize,
}

impl ArcPlane {
    /// G17: circle in XY, helix along Z.
    pub const XY: ArcPlane = ArcPlane {
        axis_0: AXIS_X,
        axis_1: AXIS_Y,
        axis_linear: AXIS_Z,
    };
    /// G18: circle in ZX, helix along Y.
    pub const ZX: ArcPlane = ArcPlane {
        axis_0: AXIS_Z,
        axis_1: AXIS_X,
        axis_linear: AXIS_Y,
    };
    /// G19: circle in YZ, helix along X.
    pub const YZ: ArcPlane = ArcPlane {
        axis_0: AXIS_Y,
        axis_1: AXIS_Z,
        axis_linear: AXIS_X,
    };
}

/// Signed angular travel from radius vector `r` to `rt`, counter-clockwise
/// positive. Clockwise arcs land in (-2pi, 0], counter-clockwise in
/// [0, 2pi); near-zero travel becomes a full revolution in the commanded
/// direction.
pub fn arc_angular_travel(r: [f32; 2], rt: [f32; 2], clockwise: bool) -> f32 {
    let mut travel = math::atan2f(r[0] * rt[1] - r[1] * rt[0], r[0] * rt[0] + r[1] * rt[1]);
    if clockwise {
        if travel >= -ARC_ANGULAR_TRAVEL_EPSILON {
            travel -= 2.0 * PI;
        }
    } else if travel <= ARC_ANGULAR_TRAVEL_EPSILON {
        travel += 2.0 * PI;
    }
    travel
}

/// Number of segments needed to keep the chord within `tolerance` of the
/// arc. Segment end points lie on the arc, so the diameter can come out
/// smaller by up to twice the tolerance; that fit is fine for machining.
pub fn arc_segment_count(angular_travel: f32, radius: f32, tolerance: f32) -> u32 {
    let chord_height = math::sqrtf(tolerance * (2.0 * radius - tolerance));
    math::floorf(math::fabsf(0.5 * angular_travel * radius) / chord_height) as u32
}

impl<M: Machine> Gateway<M> {
    /// Decompose one arc into line submissions.
    ///
    /// `position` is the current machine target in all axes; `offset` is the
    /// vector from `position` to the arc centre in the circle plane. On
    /// return `position` holds the last interpolated point, and the final
    /// submission lands on `target` exactly so rounding never reaches the
    /// endpoint.
    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        &mut self,
        target: &Position,
        line: &PlanLine,
        position: &mut Position,
        offset: [f32; 2],
        radius: f32,
        plane: ArcPlane,
        clockwise: bool,
    ) {
        let center_0 = position[plane.axis_0] + offset[0];
        let center_1 = position[plane.axis_1] + offset[1];
        // Radius vector from the centre to the current position.
        let mut r = [-offset[0], -offset[1]];
        let rt = [
            target[plane.axis_0] - center_0,
            target[plane.axis_1] - center_1,
        ];

        let angular_travel = arc_angular_travel(r, rt, clockwise);
        let segments = arc_segment_count(angular_travel, radius, self.settings.arc_tolerance);

        let mut line = *line;
        if segments > 0 {
            if line.condition.contains(Condition::INVERSE_TIME) {
                // The commanded inverse time covers the whole arc; scale to
                // an absolute per-segment feed so the sum comes out right.
                line.feed_rate *= segments as f32;
                line.condition.remove(Condition::INVERSE_TIME);
            }

            let theta_per_segment = angular_travel / segments as f32;
            let linear_per_segment =
                (target[plane.axis_linear] - position[plane.axis_linear]) / segments as f32;

            // Third-order small-angle rotation terms. Good to ~0.25 rad;
            // the tolerance-derived theta stays far below that.
            let t2 = theta_per_segment * theta_per_segment;
            let cos_t = 1.0 - 0.5 * t2;
            let sin_t = theta_per_segment * (1.0 - t2 / 6.0);

            let mut count: u8 = 0;
            for i in 1..segments {
                if count < N_ARC_CORRECTION {
                    // r' = [cos -sin; sin cos] * r
                    let r_1 = r[0] * sin_t + r[1] * cos_t;
                    r[0] = r[0] * cos_t - r[1] * sin_t;
                    r[1] = r_1;
                    count += 1;
                } else {
                    // Recompute the radius vector exactly from the original
                    // offset, capping the approximation drift.
                    let angle = i as f32 * theta_per_segment;
                    let cos_i = math::cosf(angle);
                    let sin_i = math::sinf(angle);
                    r[0] = -offset[0] * cos_i + offset[1] * sin_i;
                    r[1] = -offset[0] * sin_i - offset[1] * cos_i;
                    count = 0;
                }

                position[plane.axis_0] = center_0 + r[0];
                position[plane.axis_1] = center_1 + r[1];
                position[plane.axis_linear] += linear_per_segment;

                self.line(position, &line);
                if self.sys.aborted() {
                    return;
                }
            }
        }
        // The last segment lands on the commanded target, never on an
        // interpolated point.
        self.line(target, &line);
    }
}
