//! Cubic Hermite SE3 curve: smooth rigid-body trajectory with tangent knots.

use std::path::Path;

use nalgebra::Vector3;
use tracing::info;

use crate::core::{CoefficientManager, Key, SamplingPolicy, SamplingPolicyConfig, Time};
use crate::curves::Curve;
use crate::error::{CurveError, CurveResult};
use crate::expression::{DerivativeExpression, Frame, ValueExpression};
use crate::factors::PriorFactor;
use crate::interp::{self, SE3, Twist, angular_part, hermite::HermiteCoefficient, linear_part};
use crate::io;
use crate::values::{CoefficientValue, Values};

/// Rigid-transformation curve blended with a cubic Hermite basis.
///
/// Each knot stores a pose and a body-frame tangent twist. Knot tangents are
/// derived from neighboring samples when the curve is fitted or extended:
/// central differences for interior knots, one-sided secants at the ends.
/// Evaluation needs at least four ordered knots so both bracket tangents are
/// backed by neighbors.
#[derive(Clone, Debug)]
pub struct CubicHermiteSE3Curve {
    manager: CoefficientManager<HermiteCoefficient>,
    policy: SamplingPolicy,
}

impl Default for CubicHermiteSE3Curve {
    fn default() -> Self {
        Self::new()
    }
}

impl CubicHermiteSE3Curve {
    /// Create an empty curve with the default sampling policy (one
    /// coefficient per measurement).
    pub fn new() -> Self {
        CubicHermiteSE3Curve {
            manager: CoefficientManager::new(),
            policy: SamplingPolicy::from_config(SamplingPolicyConfig::default()),
        }
    }

    /// Create an empty curve with the given sampling policy configuration.
    pub fn with_policy_config(config: SamplingPolicyConfig) -> Self {
        CubicHermiteSE3Curve {
            manager: CoefficientManager::new(),
            policy: SamplingPolicy::from_config(config),
        }
    }

    /// Set the sampling ratio, e.g. 4 will add a coefficient every 4 extends.
    pub fn set_sampling_ratio(&mut self, ratio: usize) {
        self.policy.set_minimum_measurements(ratio);
    }

    /// Set the minimum sampling period of the sampling policy.
    pub fn set_min_sampling_period(&mut self, period: Time) {
        self.policy.set_min_sampling_period(period);
    }

    /// Set some coefficients of the curve without clearing it.
    ///
    /// Samples at already-stored times overwrite that knot's pose; samples
    /// at new times densify the curve. Tangents of the touched knots and
    /// their neighbors are refreshed afterwards.
    pub fn set_curve(&mut self, times: &[Time], values: &[SE3]) -> CurveResult<()> {
        if times.len() != values.len() {
            return Err(CurveError::MismatchedLengths {
                times: times.len(),
                values: values.len(),
            });
        }
        if times.is_empty() {
            return Ok(());
        }
        for (&time, value) in times.iter().zip(values.iter()) {
            let existing = self.manager.coefficient_at_exact(time).map(|c| c.key);
            match existing {
                Some(key) => {
                    let twist = self.manager.coefficient_by_key(key)?.twist;
                    self.manager.set_coefficient_by_key(
                        key,
                        HermiteCoefficient {
                            pose: *value,
                            twist,
                        },
                    )?;
                }
                None => {
                    self.manager
                        .insert_coefficients(&[time], &[HermiteCoefficient::from_pose(*value)])?;
                }
            }
        }
        let start = times[0];
        let end = times[times.len() - 1];
        self.refresh_tangents_around(start, end)
    }

    /// Rigidly transform the whole curve on the left side.
    ///
    /// Every knot pose becomes `transform * pose`; keys and times are
    /// untouched, and body-frame tangents are invariant under a left
    /// transformation.
    pub fn transform_curve(&mut self, transform: &SE3) -> CurveResult<()> {
        for key in self.manager.keys() {
            let knot = self.manager.coefficient_by_key(key)?.clone();
            self.manager.set_coefficient_by_key(
                key,
                HermiteCoefficient {
                    pose: transform * knot.pose,
                    twist: knot.twist,
                },
            )?;
        }
        Ok(())
    }

    /// Twist of frame B as seen from frame A, expressed in frame A.
    pub fn evaluate_twist_a(&self, time: Time) -> CurveResult<Twist> {
        self.require_evaluable()?;
        let (left, right) = crate::curves::derivative_bracket(&self.manager, time)?;
        Ok(interp::hermite::twist_frame_a(
            left.time, left.value, right.time, right.value, time,
        ))
    }

    /// Twist of frame A as seen from frame B, expressed in frame B.
    pub fn evaluate_twist_b(&self, time: Time) -> CurveResult<Twist> {
        self.require_evaluable()?;
        let (left, right) = crate::curves::derivative_bracket(&self.manager, time)?;
        Ok(interp::hermite::twist_frame_b(
            left.time, left.value, right.time, right.value, time,
        ))
    }

    /// Angular velocity of frame B as seen from frame A, expressed in frame A.
    pub fn evaluate_angular_velocity_a(&self, time: Time) -> CurveResult<Vector3<f64>> {
        Ok(angular_part(&self.evaluate_twist_a(time)?))
    }

    /// Angular velocity of frame A as seen from frame B, expressed in frame B.
    pub fn evaluate_angular_velocity_b(&self, time: Time) -> CurveResult<Vector3<f64>> {
        Ok(angular_part(&self.evaluate_twist_b(time)?))
    }

    /// Linear velocity of frame B as seen from frame A, expressed in frame A.
    pub fn evaluate_linear_velocity_a(&self, time: Time) -> CurveResult<Vector3<f64>> {
        Ok(linear_part(&self.evaluate_twist_a(time)?))
    }

    /// Linear velocity of frame A as seen from frame B, expressed in frame B.
    pub fn evaluate_linear_velocity_b(&self, time: Time) -> CurveResult<Vector3<f64>> {
        Ok(linear_part(&self.evaluate_twist_b(time)?))
    }

    /// Twist derivative of the given order in frame A.
    pub fn evaluate_derivative_a(&self, time: Time, order: u32) -> CurveResult<Twist> {
        match order {
            0 => Err(CurveError::InvalidDerivativeOrder(0)),
            1 => self.evaluate_twist_a(time),
            _ => Err(CurveError::NotImplemented(
                "derivative orders above 1 on the cubic Hermite curve",
            )),
        }
    }

    /// Twist derivative of the given order in frame B.
    pub fn evaluate_derivative_b(&self, time: Time, order: u32) -> CurveResult<Twist> {
        match order {
            0 => Err(CurveError::InvalidDerivativeOrder(0)),
            1 => self.evaluate_twist_b(time),
            _ => Err(CurveError::NotImplemented(
                "derivative orders above 1 on the cubic Hermite curve",
            )),
        }
    }

    /// Write the current value of each requested coefficient (or all of
    /// them) into an optimizer values container.
    pub fn initialize_values(&self, keys: Option<&[Key]>, values: &mut Values) -> CurveResult<()> {
        match keys {
            Some(keys) => {
                for &key in keys {
                    let knot = self.manager.coefficient_by_key(key)?;
                    values.insert(
                        key,
                        CoefficientValue::HermiteSE3 {
                            pose: knot.pose,
                            twist: knot.twist,
                        },
                    );
                }
            }
            None => {
                for coefficient in self.manager.iter() {
                    values.insert(
                        coefficient.key,
                        CoefficientValue::HermiteSE3 {
                            pose: coefficient.value.pose,
                            twist: coefficient.value.twist,
                        },
                    );
                }
            }
        }
        Ok(())
    }

    /// Overwrite stored coefficient values from an optimizer values
    /// container; keys present only in the container are ignored.
    pub fn update_from_values(&mut self, values: &Values) -> CurveResult<()> {
        for key in self.manager.keys() {
            if let Some(value) = values.get(key) {
                match value {
                    CoefficientValue::HermiteSE3 { pose, twist } => {
                        self.manager.set_coefficient_by_key(
                            key,
                            HermiteCoefficient {
                                pose: *pose,
                                twist: *twist,
                            },
                        )?;
                    }
                    _ => return Err(CurveError::WrongValueAlgebra { key }),
                }
            }
        }
        Ok(())
    }

    /// Symbolic value query over the bracketing knot keys.
    pub fn get_value_expression(&self, time: Time) -> CurveResult<ValueExpression> {
        self.require_evaluable()?;
        let (left, right) = self.manager.coefficients_at(time)?;
        if left.key == right.key {
            return Ok(ValueExpression::Coefficient { key: left.key });
        }
        Ok(ValueExpression::Se3Hermite {
            left: left.key,
            right: right.key,
            t_left: left.time,
            t_right: right.time,
            time,
        })
    }

    /// Symbolic derivative query over the bracketing knot keys, in frame A.
    pub fn get_derivative_expression(
        &self,
        time: Time,
        order: u32,
    ) -> CurveResult<DerivativeExpression> {
        match order {
            0 => Err(CurveError::InvalidDerivativeOrder(0)),
            1 => {
                self.require_evaluable()?;
                let (left, right) = crate::curves::derivative_bracket(&self.manager, time)?;
                Ok(DerivativeExpression::Se3HermiteTwist {
                    left: left.key,
                    right: right.key,
                    t_left: left.time,
                    t_right: right.time,
                    time,
                    frame: Frame::A,
                })
            }
            _ => Err(CurveError::NotImplemented(
                "derivative orders above 1 on the cubic Hermite curve",
            )),
        }
    }

    /// Add factors constraining the knots active at this time to their
    /// current values.
    pub fn add_prior_factors(
        &self,
        graph: &mut Vec<PriorFactor>,
        prior_time: Time,
    ) -> CurveResult<()> {
        let (left, right) = self.manager.coefficients_at(prior_time)?;
        graph.push(PriorFactor::new(
            left.key,
            CoefficientValue::HermiteSE3 {
                pose: left.value.pose,
                twist: left.value.twist,
            },
        ));
        if right.key != left.key {
            graph.push(PriorFactor::new(
                right.key,
                CoefficientValue::HermiteSE3 {
                    pose: right.value.pose,
                    twist: right.value.twist,
                },
            ));
        }
        Ok(())
    }

    /// Stored time for a coefficient key.
    pub fn get_time_at_key(&self, key: Key) -> CurveResult<Time> {
        self.manager.time_at_key(key)
    }

    /// Restrict the curve to a time range. Unimplemented.
    pub fn set_time_range(&mut self, _min_time: Time, _max_time: Time) -> CurveResult<()> {
        Err(CurveError::NotImplemented(
            "set_time_range on the cubic Hermite curve",
        ))
    }

    /// Stored keys, in time order.
    pub fn keys(&self) -> Vec<Key> {
        self.manager.keys()
    }

    /// Stored times, in order.
    pub fn times(&self) -> Vec<Time> {
        self.manager.times()
    }

    /// Stored tangent twist at a key, for diagnostics and tests.
    pub fn tangent_at_key(&self, key: Key) -> CurveResult<Twist> {
        Ok(self.manager.coefficient_by_key(key)?.twist)
    }

    /// Write all (time, pose, tangent) rows to a flat text file.
    pub fn save_curve_times_and_values<P: AsRef<Path>>(&self, path: P) -> CurveResult<()> {
        let rows: Vec<(Time, Vec<f64>)> = self
            .manager
            .iter()
            .map(|coefficient| {
                let mut fields = io::se3_fields(&coefficient.value.pose);
                fields.extend(coefficient.value.twist.iter().copied());
                (coefficient.time, fields)
            })
            .collect();
        io::save_times_and_values(path, rows)
    }

    /// Log the curve contents, for debugging and unit tests.
    pub fn print(&self, label: &str) {
        info!(label, size = self.manager.size(), "cubic Hermite SE3 curve");
        for coefficient in self.manager.iter() {
            info!(
                key = %coefficient.key,
                time = coefficient.time,
                pose = %coefficient.value.pose,
                twist = ?coefficient.value.twist.as_slice(),
                "knot"
            );
        }
    }

    fn require_evaluable(&self) -> CurveResult<()> {
        if self.manager.size() < 4 {
            return Err(CurveError::InsufficientCoefficients {
                required: 4,
                actual: self.manager.size(),
            });
        }
        Ok(())
    }

    /// Recompute tangents for every knot in the neighborhood of `[start,
    /// end]`, including one knot on each side.
    fn refresh_tangents_around(&mut self, start: Time, end: Time) -> CurveResult<()> {
        let from = self
            .manager
            .predecessor(start)
            .map(|c| c.time)
            .unwrap_or(start);
        let to = self.manager.successor(end).map(|c| c.time).unwrap_or(end);
        let targets: Vec<Time> = self
            .manager
            .coefficients_in_range(from, to)
            .iter()
            .map(|c| c.time)
            .collect();
        for time in targets {
            self.recompute_tangent_at(time)?;
        }
        Ok(())
    }

    /// Derive one knot's tangent from its neighbors: central difference for
    /// interior knots, one-sided secant twists at the ends.
    fn recompute_tangent_at(&mut self, time: Time) -> CurveResult<()> {
        let Some(knot) = self.manager.coefficient_at_exact(time) else {
            return Ok(());
        };
        let key = knot.key;
        let pose = knot.value.pose;
        let previous = self.manager.predecessor(time).map(|c| (c.time, c.value.pose));
        let next = self.manager.successor(time).map(|c| (c.time, c.value.pose));

        let twist = match (previous, next) {
            (Some((t_prev, pose_prev)), Some((t_next, pose_next))) => {
                interp::hermite::central_tangent((t_prev, &pose_prev), &pose, (t_next, &pose_next))
            }
            (None, Some((t_next, pose_next))) => {
                interp::se3::twist_frame_a(time, &pose, t_next, &pose_next)
            }
            (Some((t_prev, pose_prev)), None) => {
                interp::se3::twist_frame_b(t_prev, &pose_prev, time, &pose)
            }
            (None, None) => Twist::zeros(),
        };
        self.manager
            .set_coefficient_by_key(key, HermiteCoefficient { pose, twist })
    }
}

impl Curve for CubicHermiteSE3Curve {
    type Value = SE3;
    type Derivative = Twist;

    fn min_time(&self) -> CurveResult<Time> {
        self.manager.front_time()
    }

    fn max_time(&self) -> CurveResult<Time> {
        self.manager.back_time()
    }

    fn is_empty(&self) -> bool {
        self.manager.is_empty()
    }

    fn size(&self) -> usize {
        self.manager.size()
    }

    fn extend(&mut self, times: &[Time], values: &[Self::Value]) -> CurveResult<Vec<Key>> {
        if times.len() != values.len() {
            return Err(CurveError::MismatchedLengths {
                times: times.len(),
                values: values.len(),
            });
        }
        if times.is_empty() {
            return Ok(Vec::new());
        }
        let knots: Vec<HermiteCoefficient> = values
            .iter()
            .map(|pose| HermiteCoefficient::from_pose(*pose))
            .collect();
        let keys = self.policy.extend(times, &knots, &mut self.manager)?;
        let start = times[0];
        let end = times[times.len() - 1];
        self.refresh_tangents_around(start, end)?;
        Ok(keys)
    }

    fn fit_curve(&mut self, times: &[Time], values: &[Self::Value]) -> CurveResult<Vec<Key>> {
        if times.len() != values.len() {
            return Err(CurveError::MismatchedLengths {
                times: times.len(),
                values: values.len(),
            });
        }
        self.clear();
        if times.is_empty() {
            return Ok(Vec::new());
        }
        let knots: Vec<HermiteCoefficient> = values
            .iter()
            .map(|pose| HermiteCoefficient::from_pose(*pose))
            .collect();
        let keys = self.manager.insert_coefficients(times, &knots)?;
        self.refresh_tangents_around(times[0], times[times.len() - 1])?;
        Ok(keys)
    }

    fn evaluate(&self, time: Time) -> CurveResult<Self::Value> {
        self.require_evaluable()?;
        let (left, right) = self.manager.coefficients_at(time)?;
        if left.key == right.key {
            return Ok(left.value.pose);
        }
        Ok(interp::hermite::interpolate(
            left.time, left.value, right.time, right.value, time,
        ))
    }

    fn evaluate_derivative(&self, time: Time, order: u32) -> CurveResult<Self::Derivative> {
        self.evaluate_derivative_a(time, order)
    }

    fn clear(&mut self) {
        self.manager.clear();
        self.policy.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    fn translate(x: f64) -> SE3 {
        SE3::from_parts(Translation3::new(x, 0.0, 0.0), UnitQuaternion::identity())
    }

    fn straight_line_curve() -> CubicHermiteSE3Curve {
        let mut curve = CubicHermiteSE3Curve::new();
        curve
            .fit_curve(
                &[0, 10, 20, 30],
                &[translate(0.0), translate(1.0), translate(2.0), translate(3.0)],
            )
            .unwrap();
        curve
    }

    #[test]
    fn test_requires_four_knots() {
        let mut curve = CubicHermiteSE3Curve::new();
        curve
            .fit_curve(&[0, 10, 20], &[translate(0.0), translate(1.0), translate(2.0)])
            .unwrap();
        assert!(matches!(
            curve.evaluate(5),
            Err(CurveError::InsufficientCoefficients {
                required: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_straight_line_matches_linear_motion() {
        let curve = straight_line_curve();
        // Uniform sampling of constant-velocity motion makes every tangent
        // the secant twist, so the Hermite blend degenerates to the linear
        // one.
        for (time, expected) in [(5, 0.5), (15, 1.5), (25, 2.5)] {
            let pose = curve.evaluate(time).unwrap();
            assert_relative_eq!(pose.translation.vector.x, expected, epsilon = 1e-9);
        }
        let velocity = curve.evaluate_linear_velocity_a(15).unwrap();
        assert_relative_eq!(velocity, Vector3::new(0.1, 0.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_evaluate_at_knots_is_exact() {
        let curve = straight_line_curve();
        for (time, expected) in [(0, 0.0), (10, 1.0), (20, 2.0), (30, 3.0)] {
            let pose = curve.evaluate(time).unwrap();
            assert_relative_eq!(pose.translation.vector.x, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_fitted_tangents_are_central_differences() {
        let mut curve = CubicHermiteSE3Curve::new();
        let keys = curve
            .fit_curve(
                &[0, 10, 20, 30],
                &[translate(0.0), translate(1.0), translate(3.0), translate(6.0)],
            )
            .unwrap();
        // Interior knot at t = 10 spans (0, 20): (3 - 0) / 20.
        let tangent = curve.tangent_at_key(keys[1]).unwrap();
        assert_relative_eq!(linear_part(&tangent), Vector3::new(0.15, 0.0, 0.0));
        // Front knot uses the one-sided secant over (0, 10).
        let tangent = curve.tangent_at_key(keys[0]).unwrap();
        assert_relative_eq!(linear_part(&tangent), Vector3::new(0.1, 0.0, 0.0));
        // Back knot uses the one-sided secant over (20, 30).
        let tangent = curve.tangent_at_key(keys[3]).unwrap();
        assert_relative_eq!(linear_part(&tangent), Vector3::new(0.3, 0.0, 0.0));
    }

    #[test]
    fn test_extend_refreshes_tail_tangents() {
        let mut curve = straight_line_curve();
        let keys_before = curve.keys();
        curve.extend(&[40], &[translate(5.0)]).unwrap();

        // Earlier knots keep their keys.
        assert_eq!(&curve.keys()[..4], &keys_before[..]);
        // The previous back knot is now interior; its tangent spans (20, 40).
        let tangent = curve.tangent_at_key(keys_before[3]).unwrap();
        assert_relative_eq!(linear_part(&tangent), Vector3::new(0.15, 0.0, 0.0));
        // The new back knot carries the one-sided secant over (30, 40).
        let last_key = *curve.keys().last().unwrap();
        let tangent = curve.tangent_at_key(last_key).unwrap();
        assert_relative_eq!(linear_part(&tangent), Vector3::new(0.2, 0.0, 0.0));
    }

    #[test]
    fn test_derivative_orders_above_one_unimplemented() {
        let curve = straight_line_curve();
        assert!(matches!(
            curve.evaluate_derivative(5, 2),
            Err(CurveError::NotImplemented(_))
        ));
        assert!(matches!(
            curve.evaluate_derivative(5, 0),
            Err(CurveError::InvalidDerivativeOrder(0))
        ));
    }

    #[test]
    fn test_out_of_domain_fails() {
        let curve = straight_line_curve();
        assert!(matches!(
            curve.evaluate(31),
            Err(CurveError::OutOfDomain { .. })
        ));
    }

    #[test]
    fn test_values_round_trip_preserves_knots() {
        let mut curve = straight_line_curve();
        let mut values = Values::new();
        curve.initialize_values(None, &mut values).unwrap();
        assert_eq!(values.len(), curve.size());

        let before: Vec<SE3> = curve
            .times()
            .iter()
            .map(|&t| curve.evaluate(t).unwrap())
            .collect();
        curve.update_from_values(&values).unwrap();
        let after: Vec<SE3> = curve
            .times()
            .iter()
            .map(|&t| curve.evaluate(t).unwrap())
            .collect();
        for (a, b) in before.iter().zip(after.iter()) {
            assert_relative_eq!(
                a.translation.vector,
                b.translation.vector,
                epsilon = 1e-15
            );
        }
    }

    #[test]
    fn test_transform_curve_preserves_tangents() {
        let mut curve = straight_line_curve();
        let keys = curve.keys();
        let tangent_before = curve.tangent_at_key(keys[1]).unwrap();
        curve
            .transform_curve(&SE3::from_parts(
                Translation3::new(0.0, 2.0, 0.0),
                UnitQuaternion::from_euler_angles(0.0, 0.0, 0.5),
            ))
            .unwrap();
        assert_eq!(curve.tangent_at_key(keys[1]).unwrap(), tangent_before);
        assert_eq!(curve.keys(), keys);
    }

    #[test]
    fn test_prior_factors_carry_pose_and_tangent() {
        let curve = straight_line_curve();
        let mut graph = Vec::new();
        curve.add_prior_factors(&mut graph, 15).unwrap();
        assert_eq!(graph.len(), 2);
        for factor in &graph {
            assert!(matches!(
                factor.measurement,
                CoefficientValue::HermiteSE3 { .. }
            ));
        }
    }
}
