//! Curve façades composing the manager, the sampling policy, and the
//! interpolation math.
//!
//! Each façade owns one [`crate::core::CoefficientManager`] and (for the SE3
//! curves) one [`crate::core::SamplingPolicy`], and exposes the evaluation,
//! extension, and optimizer-exchange surface for its coefficient algebra.

use crate::core::{CoefficientManager, CoefficientRef, Key, Time};
use crate::error::{CurveError, CurveResult};

pub mod cubic_hermite_se3;
pub mod discrete_se3;
pub mod vector_space;

pub use cubic_hermite_se3::CubicHermiteSE3Curve;
pub use discrete_se3::DiscreteSE3Curve;
pub use vector_space::LinearInterpolationVectorSpaceCurve;

/// Common capability surface of every curve algebra.
///
/// One implementation per algebra; the shared coefficient manager and
/// sampling policy are composed inside the implementors rather than
/// inherited from a base curve.
pub trait Curve {
    /// Value type returned by evaluation and accepted by extension
    type Value;
    /// Derivative type returned by `evaluate_derivative`
    type Derivative;

    /// The first valid time of the curve.
    fn min_time(&self) -> CurveResult<Time>;

    /// The last valid time of the curve.
    fn max_time(&self) -> CurveResult<Time>;

    /// Whether the curve holds no coefficients.
    fn is_empty(&self) -> bool;

    /// Number of coefficients the curve is composed of.
    fn size(&self) -> usize;

    /// Extend the curve so that it can be evaluated at these times,
    /// fitting to the given values under the curve's sampling policy.
    fn extend(&mut self, times: &[Time], values: &[Self::Value]) -> CurveResult<Vec<Key>>;

    /// Fit a new curve to these data points. The existing curve is cleared.
    fn fit_curve(&mut self, times: &[Time], values: &[Self::Value]) -> CurveResult<Vec<Key>>;

    /// Evaluate the curve value at a time inside `[min_time, max_time]`.
    fn evaluate(&self, time: Time) -> CurveResult<Self::Value>;

    /// Evaluate a curve derivative of the given order.
    fn evaluate_derivative(&self, time: Time, order: u32) -> CurveResult<Self::Derivative>;

    /// Remove all coefficients and reset the sampling policy state.
    fn clear(&mut self);
}

/// Bracket used for derivative evaluation on the SE3 curves.
///
/// A query between coefficients uses the surrounding pair. A query on a
/// stored time uses that coefficient and its successor, except on the last
/// coefficient where it uses the predecessor and the last, so a velocity is
/// still defined at the final sample.
pub(crate) fn derivative_bracket<C: Clone>(
    manager: &CoefficientManager<C>,
    time: Time,
) -> CurveResult<(CoefficientRef<'_, C>, CoefficientRef<'_, C>)> {
    let (left, right) = manager.coefficients_at(time)?;
    if left.key != right.key {
        return Ok((left, right));
    }
    let front = manager.front_time()?;
    let back = manager.back_time()?;
    if time == back {
        let previous = manager
            .predecessor(time)
            .ok_or(CurveError::OutOfDomain { time, front, back })?;
        Ok((previous, left))
    } else {
        let next = manager
            .successor(time)
            .ok_or(CurveError::OutOfDomain { time, front, back })?;
        Ok((left, next))
    }
}
