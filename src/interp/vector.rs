//! Linear blend for vector-space coefficients.

use nalgebra::DVector;

use crate::core::Time;
use crate::interp::blend_alpha;

/// Linearly interpolate between two vector coefficients.
///
/// `alpha` equals 1 at the left coefficient and 0 at the right, so the blend
/// reproduces the stored values exactly at both bracket times. A degenerate
/// zero-width bracket returns the left value.
pub fn interpolate(
    t_left: Time,
    v_left: &DVector<f64>,
    t_right: Time,
    v_right: &DVector<f64>,
    time: Time,
) -> DVector<f64> {
    let alpha = blend_alpha(t_left, t_right, time);
    v_left * alpha + v_right * (1.0 - alpha)
}
