//! Piecewise constant-velocity interpolation on SE(3).
//!
//! The value between two bracketing rigid transformations composes a
//! fractional increment of the relative motion: spherical interpolation of
//! the relative rotation, linear interpolation of the translation. The
//! first derivative is the relative motion divided by the bracket width,
//! expressed as a twist in either frame convention:
//! - frame A: the coordinate frame of the left (earlier) coefficient,
//! - frame B: the coordinate frame of the right (later) coefficient.
//!
//! The two differ by the relative rotation between the brackets. Derivative
//! orders above 1 are identically zero in this model; the curve façade
//! handles that case without calling in here.

use crate::core::Time;
use crate::interp::{SE3, Twist, blend_alpha, twist_from_parts};

/// Interpolate between two rigid transformations at the query time.
///
/// Reproduces the stored transformations exactly at both bracket times; a
/// degenerate zero-width bracket returns the left coefficient.
pub fn interpolate(t_left: Time, left: &SE3, t_right: Time, right: &SE3, time: Time) -> SE3 {
    let alpha = blend_alpha(t_left, t_right, time);
    left.lerp_slerp(right, 1.0 - alpha)
}

/// Twist of the bracket's relative motion per unit time, in frame A.
///
/// Linear part: the translation increment rotated into the left coefficient
/// frame. Angular part: the log of the relative rotation. Both divided by
/// the bracket width, which must be nonzero.
pub fn twist_frame_a(t_left: Time, left: &SE3, t_right: Time, right: &SE3) -> Twist {
    debug_assert!(t_right > t_left, "derivative bracket must have nonzero width");
    let dt = (t_right - t_left) as f64;
    let translation_increment = right.translation.vector - left.translation.vector;
    let linear = left.rotation.inverse_transform_vector(&translation_increment) / dt;
    let relative_rotation = left.rotation.inverse() * right.rotation;
    let angular = relative_rotation.scaled_axis() / dt;
    twist_from_parts(linear, angular)
}

/// Twist of the bracket's relative motion per unit time, in frame B.
///
/// Equal to the frame-A twist rotated by the inverse of the bracket's
/// relative rotation.
pub fn twist_frame_b(t_left: Time, left: &SE3, t_right: Time, right: &SE3) -> Twist {
    debug_assert!(t_right > t_left, "derivative bracket must have nonzero width");
    let dt = (t_right - t_left) as f64;
    let translation_increment = right.translation.vector - left.translation.vector;
    let linear = right.rotation.inverse_transform_vector(&translation_increment) / dt;
    let relative_rotation = left.rotation.inverse() * right.rotation;
    let angular = relative_rotation
        .inverse_transform_vector(&(relative_rotation.scaled_axis()))
        / dt;
    twist_from_parts(linear, angular)
}
