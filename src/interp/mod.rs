//! Pure interpolation and derivative math for the curve algebras.
//!
//! Every function here operates on a bracketing pair of coefficients passed
//! in by the curve façades; nothing in this module touches the coefficient
//! manager or any other mutable state. One submodule per algebra:
//! [`vector`] for linear blends in Rⁿ, [`se3`] for piecewise
//! constant-velocity rigid-transformation interpolation, [`hermite`] for
//! cubic Hermite blends with tangent twists.
//!
//! The rotation and vector algebra itself (composition, inverse, log/exp,
//! slerp) comes from `nalgebra`; this module only arranges those primitives
//! into the blend and derivative formulas.

use nalgebra::{Isometry3, Vector3, Vector6};

use crate::core::Time;

pub mod hermite;
pub mod se3;
pub mod vector;

/// Rigid transformation: rotation (unit quaternion) plus translation.
pub type SE3 = Isometry3<f64>;

/// Six-component twist: linear velocity (0..3), angular velocity (3..6).
pub type Twist = Vector6<f64>;

/// Blend fraction for a bracketing pair: 1 at the left time, 0 at the right.
///
/// Degenerate zero-width brackets blend entirely to the left coefficient.
pub fn blend_alpha(t_left: Time, t_right: Time, time: Time) -> f64 {
    let dt = t_right - t_left;
    if dt == 0 {
        return 1.0;
    }
    (t_right - time) as f64 / dt as f64
}

/// Assemble a twist from its linear and angular parts.
pub fn twist_from_parts(linear: Vector3<f64>, angular: Vector3<f64>) -> Twist {
    let mut twist = Twist::zeros();
    twist.fixed_rows_mut::<3>(0).copy_from(&linear);
    twist.fixed_rows_mut::<3>(3).copy_from(&angular);
    twist
}

/// Linear velocity part of a twist (components 0..3).
pub fn linear_part(twist: &Twist) -> Vector3<f64> {
    twist.fixed_rows::<3>(0).into_owned()
}

/// Angular velocity part of a twist (components 3..6).
pub fn angular_part(twist: &Twist) -> Vector3<f64> {
    twist.fixed_rows::<3>(3).into_owned()
}
