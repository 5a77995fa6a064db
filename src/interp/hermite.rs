//! Cubic Hermite blend on SE(3) with stored tangent twists.
//!
//! Each Hermite coefficient carries a rigid transformation and the
//! body-frame twist of the trajectory at that knot. Between two knots the
//! value follows the two-endpoint cubic Hermite basis: translation is
//! blended in world coordinates, rotation is blended on the log of the
//! relative rotation in the left-knot frame. The derivative accessors
//! differentiate the same basis analytically.
//!
//! When both endpoint tangents equal the bracket's secant twists (the
//! frame-A twist at the left knot, the frame-B twist at the right), the
//! blend reduces exactly to the constant-velocity model's value and
//! velocity.

use crate::core::Time;
use crate::interp::{SE3, Twist, angular_part, linear_part, twist_from_parts};
use nalgebra::UnitQuaternion;

/// One knot of a cubic Hermite SE3 curve: pose plus body-frame tangent twist.
#[derive(Clone, Debug, PartialEq)]
pub struct HermiteCoefficient {
    /// Rigid transformation at the knot
    pub pose: SE3,
    /// Body-frame twist tangent at the knot
    pub twist: Twist,
}

impl HermiteCoefficient {
    /// Knot with the given pose and a zero tangent.
    pub fn from_pose(pose: SE3) -> Self {
        HermiteCoefficient {
            pose,
            twist: Twist::zeros(),
        }
    }
}

/// The four cubic Hermite basis functions evaluated at `u ∈ [0, 1]`.
struct HermiteBasis {
    h00: f64,
    h10: f64,
    h01: f64,
    h11: f64,
}

impl HermiteBasis {
    fn value(u: f64) -> Self {
        let u2 = u * u;
        let u3 = u2 * u;
        HermiteBasis {
            h00: 2.0 * u3 - 3.0 * u2 + 1.0,
            h10: u3 - 2.0 * u2 + u,
            h01: -2.0 * u3 + 3.0 * u2,
            h11: u3 - u2,
        }
    }

    /// Derivatives of the basis functions with respect to `u`.
    fn derivative(u: f64) -> Self {
        let u2 = u * u;
        HermiteBasis {
            h00: 6.0 * u2 - 6.0 * u,
            h10: 3.0 * u2 - 4.0 * u + 1.0,
            h01: -6.0 * u2 + 6.0 * u,
            h11: 3.0 * u2 - 2.0 * u,
        }
    }
}

/// Interpolate the Hermite blend between two knots at the query time.
pub fn interpolate(
    t_left: Time,
    left: &HermiteCoefficient,
    t_right: Time,
    right: &HermiteCoefficient,
    time: Time,
) -> SE3 {
    if t_right == t_left {
        return left.pose;
    }
    let dt = (t_right - t_left) as f64;
    let u = (time - t_left) as f64 / dt;
    let basis = HermiteBasis::value(u);

    let p_left = left.pose.translation.vector;
    let p_right = right.pose.translation.vector;
    let v_left_world = left.pose.rotation.transform_vector(&linear_part(&left.twist));
    let v_right_world = right.pose.rotation.transform_vector(&linear_part(&right.twist));
    let translation = basis.h00 * p_left
        + basis.h10 * dt * v_left_world
        + basis.h01 * p_right
        + basis.h11 * dt * v_right_world;

    let relative_log = (left.pose.rotation.inverse() * right.pose.rotation).scaled_axis();
    let rotation_log = basis.h10 * dt * angular_part(&left.twist)
        + basis.h01 * relative_log
        + basis.h11 * dt * angular_part(&right.twist);
    let rotation = left.pose.rotation * UnitQuaternion::from_scaled_axis(rotation_log);

    SE3::from_parts(translation.into(), rotation)
}

/// Analytic first derivative of the Hermite blend, as a twist in frame A
/// (the left knot's coordinate frame).
pub fn twist_frame_a(
    t_left: Time,
    left: &HermiteCoefficient,
    t_right: Time,
    right: &HermiteCoefficient,
    time: Time,
) -> Twist {
    debug_assert!(t_right > t_left, "derivative bracket must have nonzero width");
    let dt = (t_right - t_left) as f64;
    let u = (time - t_left) as f64 / dt;
    let basis = HermiteBasis::derivative(u);

    let p_left = left.pose.translation.vector;
    let p_right = right.pose.translation.vector;
    let v_left_world = left.pose.rotation.transform_vector(&linear_part(&left.twist));
    let v_right_world = right.pose.rotation.transform_vector(&linear_part(&right.twist));
    // Chain rule: d/dtime = (d/du) / dt.
    let velocity_world = (basis.h00 * p_left
        + basis.h10 * dt * v_left_world
        + basis.h01 * p_right
        + basis.h11 * dt * v_right_world)
        / dt;
    let linear = left.pose.rotation.inverse_transform_vector(&velocity_world);

    let relative_log = (left.pose.rotation.inverse() * right.pose.rotation).scaled_axis();
    let angular = (basis.h10 * dt * angular_part(&left.twist)
        + basis.h01 * relative_log
        + basis.h11 * dt * angular_part(&right.twist))
        / dt;

    twist_from_parts(linear, angular)
}

/// Analytic first derivative of the Hermite blend, as a twist in frame B
/// (the right knot's coordinate frame).
pub fn twist_frame_b(
    t_left: Time,
    left: &HermiteCoefficient,
    t_right: Time,
    right: &HermiteCoefficient,
    time: Time,
) -> Twist {
    let twist_a = twist_frame_a(t_left, left, t_right, right, time);
    let relative_rotation = left.pose.rotation.inverse() * right.pose.rotation;
    twist_from_parts(
        relative_rotation.inverse_transform_vector(&linear_part(&twist_a)),
        relative_rotation.inverse_transform_vector(&angular_part(&twist_a)),
    )
}

/// Central-difference tangent for an interior knot, in the knot's own frame.
///
/// Spans the neighbors on both sides; the endpoints of a fitted curve use
/// the one-sided secant twists instead.
pub fn central_tangent(
    prev: (Time, &SE3),
    center: &SE3,
    next: (Time, &SE3),
) -> Twist {
    let (t_prev, pose_prev) = prev;
    let (t_next, pose_next) = next;
    debug_assert!(t_next > t_prev, "tangent span must have nonzero width");
    let dt = (t_next - t_prev) as f64;

    let translation_increment = pose_next.translation.vector - pose_prev.translation.vector;
    let linear = center.rotation.inverse_transform_vector(&translation_increment) / dt;

    let relative_rotation = pose_prev.rotation.inverse() * pose_next.rotation;
    let angular_prev_frame = relative_rotation.scaled_axis() / dt;
    let prev_to_center = pose_prev.rotation.inverse() * center.rotation;
    let angular = prev_to_center.inverse_transform_vector(&angular_prev_frame);

    twist_from_parts(linear, angular)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::se3;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion, Vector3};

    fn pose(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> SE3 {
        SE3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        )
    }

    fn secant_knots(t_left: Time, left: SE3, t_right: Time, right: SE3) -> (HermiteCoefficient, HermiteCoefficient) {
        let twist_left = se3::twist_frame_a(t_left, &left, t_right, &right);
        let twist_right = se3::twist_frame_b(t_left, &left, t_right, &right);
        (
            HermiteCoefficient {
                pose: left,
                twist: twist_left,
            },
            HermiteCoefficient {
                pose: right,
                twist: twist_right,
            },
        )
    }

    #[test]
    fn test_exact_at_knots() {
        let left = HermiteCoefficient {
            pose: pose(0.0, 1.0, 2.0, 0.1, 0.0, 0.3),
            twist: twist_from_parts(Vector3::new(0.1, 0.0, 0.0), Vector3::new(0.0, 0.02, 0.0)),
        };
        let right = HermiteCoefficient {
            pose: pose(3.0, 1.0, 0.0, 0.0, 0.2, -0.1),
            twist: twist_from_parts(Vector3::new(0.0, 0.1, 0.0), Vector3::zeros()),
        };
        let at_left = interpolate(0, &left, 10, &right, 0);
        let at_right = interpolate(0, &left, 10, &right, 10);
        assert_relative_eq!(
            at_left.translation.vector,
            left.pose.translation.vector,
            epsilon = 1e-12
        );
        assert!(at_left.rotation.angle_to(&left.pose.rotation) < 1e-12);
        assert_relative_eq!(
            at_right.translation.vector,
            right.pose.translation.vector,
            epsilon = 1e-12
        );
        assert!(at_right.rotation.angle_to(&right.pose.rotation) < 1e-12);
    }

    #[test]
    fn test_secant_tangents_reduce_to_constant_velocity_value() {
        let left_pose = pose(1.0, -2.0, 0.5, 0.3, -0.1, 0.8);
        let right_pose = pose(2.0, 0.0, 1.5, -0.2, 0.4, 1.1);
        let (left, right) = secant_knots(0, left_pose, 10, right_pose);

        for time in [0, 2, 5, 7, 10] {
            let hermite = interpolate(0, &left, 10, &right, time);
            let discrete = se3::interpolate(0, &left_pose, 10, &right_pose, time);
            assert_relative_eq!(
                hermite.translation.vector,
                discrete.translation.vector,
                epsilon = 1e-9
            );
            assert!(hermite.rotation.angle_to(&discrete.rotation) < 1e-9);
        }
    }

    #[test]
    fn test_secant_tangents_reduce_to_constant_velocity_twist() {
        let left_pose = pose(1.0, -2.0, 0.5, 0.3, -0.1, 0.8);
        let right_pose = pose(2.0, 0.0, 1.5, -0.2, 0.4, 1.1);
        let (left, right) = secant_knots(0, left_pose, 10, right_pose);

        let secant = se3::twist_frame_a(0, &left_pose, 10, &right_pose);
        for time in [0, 3, 5, 8, 10] {
            let twist = twist_frame_a(0, &left, 10, &right, time);
            assert_relative_eq!(twist, secant, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let left = HermiteCoefficient {
            pose: pose(0.0, 0.0, 0.0, 0.0, 0.0, 0.0),
            twist: twist_from_parts(Vector3::new(0.2, 0.0, 0.1), Vector3::new(0.0, 0.0, 0.05)),
        };
        let right = HermiteCoefficient {
            pose: pose(2.0, 1.0, 0.0, 0.0, 0.0, 0.4),
            twist: twist_from_parts(Vector3::new(0.1, 0.1, 0.0), Vector3::new(0.0, 0.0, 0.02)),
        };

        let t0: Time = 0;
        let t1: Time = 1_000;
        let query: Time = 400;
        let twist = twist_frame_a(t0, &left, t1, &right, query);

        let before = interpolate(t0, &left, t1, &right, query - 1);
        let after = interpolate(t0, &left, t1, &right, query + 1);
        let numeric_velocity = (after.translation.vector - before.translation.vector) / 2.0;
        let numeric_in_frame_a = left
            .pose
            .rotation
            .inverse_transform_vector(&numeric_velocity);
        assert_relative_eq!(linear_part(&twist), numeric_in_frame_a, epsilon = 1e-5);
    }

    #[test]
    fn test_frames_agree_under_relative_rotation() {
        let left = HermiteCoefficient {
            pose: pose(0.0, 0.0, 0.0, 0.1, 0.2, 0.3),
            twist: twist_from_parts(Vector3::new(0.2, 0.0, 0.1), Vector3::new(0.01, 0.0, 0.05)),
        };
        let right = HermiteCoefficient {
            pose: pose(2.0, 1.0, -0.5, -0.1, 0.0, 0.6),
            twist: twist_from_parts(Vector3::new(0.1, 0.1, 0.0), Vector3::new(0.0, 0.03, 0.02)),
        };

        let twist_a = twist_frame_a(0, &left, 10, &right, 4);
        let twist_b = twist_frame_b(0, &left, 10, &right, 4);
        let relative_rotation = left.pose.rotation.inverse() * right.pose.rotation;
        assert_relative_eq!(
            relative_rotation.transform_vector(&linear_part(&twist_b)),
            linear_part(&twist_a),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            relative_rotation.transform_vector(&angular_part(&twist_b)),
            angular_part(&twist_a),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_central_tangent_straight_line() {
        let prev = pose(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let center = pose(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let next = pose(2.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let tangent = central_tangent((0, &prev), &center, (20, &next));
        assert_relative_eq!(linear_part(&tangent), Vector3::new(0.1, 0.0, 0.0));
        assert_relative_eq!(angular_part(&tangent), Vector3::zeros());
    }
}
