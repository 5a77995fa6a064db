//! Symbolic interpolation expressions for the optimizer's factor graph.
//!
//! An expression captures the structure of one curve query — which
//! coefficient keys participate and which blend connects them — without
//! holding any coefficient values. The optimizer keeps the keys as leaves of
//! its own differentiation graph and calls [`ValueExpression::evaluate`] /
//! [`DerivativeExpression::evaluate`] as pure functions of a [`Values`]
//! container.

use crate::core::{Key, Time};
use crate::error::{CurveError, CurveResult};
use crate::interp::{self, SE3, Twist, hermite::HermiteCoefficient};
use crate::values::{CoefficientValue, Values};

/// Frame convention for twist expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    /// The left (earlier) bracketing coefficient's frame
    A,
    /// The right (later) bracketing coefficient's frame
    B,
}

/// Symbolic curve-value query over the bracketing coefficient keys.
#[derive(Clone, Debug)]
pub enum ValueExpression {
    /// A single stored coefficient (degenerate bracket)
    Coefficient {
        /// The coefficient's key
        key: Key,
    },
    /// Constant-velocity SE3 interpolation between two coefficients
    Se3Interpolate {
        /// Left bracketing key
        left: Key,
        /// Right bracketing key
        right: Key,
        /// Left bracket time
        t_left: Time,
        /// Right bracket time
        t_right: Time,
        /// Query time
        time: Time,
    },
    /// Cubic Hermite SE3 interpolation between two knots
    Se3Hermite {
        /// Left bracketing key
        left: Key,
        /// Right bracketing key
        right: Key,
        /// Left bracket time
        t_left: Time,
        /// Right bracket time
        t_right: Time,
        /// Query time
        time: Time,
    },
}

impl ValueExpression {
    /// Keys this expression depends on.
    pub fn keys(&self) -> Vec<Key> {
        match self {
            ValueExpression::Coefficient { key } => vec![*key],
            ValueExpression::Se3Interpolate { left, right, .. }
            | ValueExpression::Se3Hermite { left, right, .. } => vec![*left, *right],
        }
    }

    /// Evaluate the expression against a values container.
    pub fn evaluate(&self, values: &Values) -> CurveResult<SE3> {
        match self {
            ValueExpression::Coefficient { key } => pose_for(values, *key),
            ValueExpression::Se3Interpolate {
                left,
                right,
                t_left,
                t_right,
                time,
            } => {
                let pose_left = pose_for(values, *left)?;
                let pose_right = pose_for(values, *right)?;
                Ok(interp::se3::interpolate(
                    *t_left,
                    &pose_left,
                    *t_right,
                    &pose_right,
                    *time,
                ))
            }
            ValueExpression::Se3Hermite {
                left,
                right,
                t_left,
                t_right,
                time,
            } => {
                let knot_left = hermite_for(values, *left)?;
                let knot_right = hermite_for(values, *right)?;
                Ok(interp::hermite::interpolate(
                    *t_left,
                    &knot_left,
                    *t_right,
                    &knot_right,
                    *time,
                ))
            }
        }
    }
}

/// Symbolic curve-derivative query over the bracketing coefficient keys.
#[derive(Clone, Debug)]
pub enum DerivativeExpression {
    /// Identically zero twist (constant-velocity model, order ≥ 2)
    ConstantZeroTwist,
    /// Relative-motion twist of a constant-velocity bracket
    Se3RelativeTwist {
        /// Left bracketing key
        left: Key,
        /// Right bracketing key
        right: Key,
        /// Left bracket time
        t_left: Time,
        /// Right bracket time
        t_right: Time,
        /// Frame convention
        frame: Frame,
    },
    /// Analytic Hermite-basis derivative between two knots
    Se3HermiteTwist {
        /// Left bracketing key
        left: Key,
        /// Right bracketing key
        right: Key,
        /// Left bracket time
        t_left: Time,
        /// Right bracket time
        t_right: Time,
        /// Query time
        time: Time,
        /// Frame convention
        frame: Frame,
    },
}

impl DerivativeExpression {
    /// Keys this expression depends on.
    pub fn keys(&self) -> Vec<Key> {
        match self {
            DerivativeExpression::ConstantZeroTwist => Vec::new(),
            DerivativeExpression::Se3RelativeTwist { left, right, .. }
            | DerivativeExpression::Se3HermiteTwist { left, right, .. } => vec![*left, *right],
        }
    }

    /// Evaluate the expression against a values container.
    pub fn evaluate(&self, values: &Values) -> CurveResult<Twist> {
        match self {
            DerivativeExpression::ConstantZeroTwist => Ok(Twist::zeros()),
            DerivativeExpression::Se3RelativeTwist {
                left,
                right,
                t_left,
                t_right,
                frame,
            } => {
                let pose_left = pose_for(values, *left)?;
                let pose_right = pose_for(values, *right)?;
                let twist = match frame {
                    Frame::A => {
                        interp::se3::twist_frame_a(*t_left, &pose_left, *t_right, &pose_right)
                    }
                    Frame::B => {
                        interp::se3::twist_frame_b(*t_left, &pose_left, *t_right, &pose_right)
                    }
                };
                Ok(twist)
            }
            DerivativeExpression::Se3HermiteTwist {
                left,
                right,
                t_left,
                t_right,
                time,
                frame,
            } => {
                let knot_left = hermite_for(values, *left)?;
                let knot_right = hermite_for(values, *right)?;
                let twist = match frame {
                    Frame::A => interp::hermite::twist_frame_a(
                        *t_left,
                        &knot_left,
                        *t_right,
                        &knot_right,
                        *time,
                    ),
                    Frame::B => interp::hermite::twist_frame_b(
                        *t_left,
                        &knot_left,
                        *t_right,
                        &knot_right,
                        *time,
                    ),
                };
                Ok(twist)
            }
        }
    }
}

fn pose_for(values: &Values, key: Key) -> CurveResult<SE3> {
    match values.get_required(key)? {
        CoefficientValue::SE3(pose) => Ok(*pose),
        CoefficientValue::HermiteSE3 { pose, .. } => Ok(*pose),
        CoefficientValue::Vector(_) => Err(CurveError::WrongValueAlgebra { key }),
    }
}

fn hermite_for(values: &Values, key: Key) -> CurveResult<HermiteCoefficient> {
    match values.get_required(key)? {
        CoefficientValue::HermiteSE3 { pose, twist } => Ok(HermiteCoefficient {
            pose: *pose,
            twist: *twist,
        }),
        _ => Err(CurveError::WrongValueAlgebra { key }),
    }
}
