//! Discrete SE3 curve: piecewise constant-velocity rigid-body trajectory.

use std::path::Path;

use nalgebra::Vector3;
use tracing::info;

use crate::core::{
    CoefficientManager, CoefficientRef, Key, SamplingPolicy, SamplingPolicyConfig, Time,
};
use crate::curves::Curve;
use crate::error::{CurveError, CurveResult};
use crate::expression::{DerivativeExpression, Frame, ValueExpression};
use crate::factors::PriorFactor;
use crate::interp::{self, SE3, Twist, angular_part, linear_part};
use crate::io;
use crate::values::{CoefficientValue, Values};

/// Rigid-transformation curve interpolated with constant velocity between
/// coefficients.
///
/// The value between two coefficients composes a fractional increment of
/// their relative motion; the first derivative is that relative motion over
/// the bracket width, available as a twist in the frame of either bracketing
/// coefficient. Derivatives of order above 1 are identically zero.
#[derive(Clone, Debug)]
pub struct DiscreteSE3Curve {
    manager: CoefficientManager<SE3>,
    policy: SamplingPolicy,
}

impl Default for DiscreteSE3Curve {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscreteSE3Curve {
    /// Create an empty curve with the default sampling policy (one
    /// coefficient per measurement).
    pub fn new() -> Self {
        DiscreteSE3Curve {
            manager: CoefficientManager::new(),
            policy: SamplingPolicy::from_config(SamplingPolicyConfig::default()),
        }
    }

    /// Create an empty curve with the given sampling policy configuration.
    pub fn with_policy_config(config: SamplingPolicyConfig) -> Self {
        DiscreteSE3Curve {
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
    /// Samples at already-stored times overwrite that coefficient's value;
    /// samples at new times densify the curve with fresh coefficients.
    pub fn set_curve(&mut self, times: &[Time], values: &[SE3]) -> CurveResult<()> {
        if times.len() != values.len() {
            return Err(CurveError::MismatchedLengths {
                times: times.len(),
                values: values.len(),
            });
        }
        for (&time, value) in times.iter().zip(values.iter()) {
            let existing = self.manager.coefficient_at_exact(time).map(|c| c.key);
            match existing {
                Some(key) => self.manager.set_coefficient_by_key(key, *value)?,
                None => {
                    self.manager.insert_coefficients(&[time], &[*value])?;
                }
            }
        }
        Ok(())
    }

    /// Rigidly transform the whole curve on the left side.
    ///
    /// Every stored value becomes `transform * value`; keys and times are
    /// untouched.
    pub fn transform_curve(&mut self, transform: &SE3) -> CurveResult<()> {
        for key in self.manager.keys() {
            let value = *self.manager.coefficient_by_key(key)?;
            self.manager.set_coefficient_by_key(key, transform * value)?;
        }
        Ok(())
    }

    /// Twist of frame B as seen from frame A, expressed in frame A.
    pub fn evaluate_twist_a(&self, time: Time) -> CurveResult<Twist> {
        let (left, right) = self.derivative_bracket(time)?;
        Ok(interp::se3::twist_frame_a(
            left.time, left.value, right.time, right.value,
        ))
    }

    /// Twist of frame A as seen from frame B, expressed in frame B.
    pub fn evaluate_twist_b(&self, time: Time) -> CurveResult<Twist> {
        let (left, right) = self.derivative_bracket(time)?;
        Ok(interp::se3::twist_frame_b(
            left.time, left.value, right.time, right.value,
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

    /// Twist derivative of the given order in frame A; orders above 1 are
    /// the zero twist.
    pub fn evaluate_derivative_a(&self, time: Time, order: u32) -> CurveResult<Twist> {
        match order {
            0 => Err(CurveError::InvalidDerivativeOrder(0)),
            1 => self.evaluate_twist_a(time),
            _ => {
                self.derivative_bracket(time)?;
                Ok(Twist::zeros())
            }
        }
    }

    /// Twist derivative of the given order in frame B; orders above 1 are
    /// the zero twist.
    pub fn evaluate_derivative_b(&self, time: Time, order: u32) -> CurveResult<Twist> {
        match order {
            0 => Err(CurveError::InvalidDerivativeOrder(0)),
            1 => self.evaluate_twist_b(time),
            _ => {
                self.derivative_bracket(time)?;
                Ok(Twist::zeros())
            }
        }
    }

    /// Angular derivative of the given order in frame A.
    pub fn evaluate_angular_derivative_a(
        &self,
        time: Time,
        order: u32,
    ) -> CurveResult<Vector3<f64>> {
        Ok(angular_part(&self.evaluate_derivative_a(time, order)?))
    }

    /// Angular derivative of the given order in frame B.
    pub fn evaluate_angular_derivative_b(
        &self,
        time: Time,
        order: u32,
    ) -> CurveResult<Vector3<f64>> {
        Ok(angular_part(&self.evaluate_derivative_b(time, order)?))
    }

    /// Linear derivative of the given order in frame A.
    pub fn evaluate_linear_derivative_a(
        &self,
        time: Time,
        order: u32,
    ) -> CurveResult<Vector3<f64>> {
        Ok(linear_part(&self.evaluate_derivative_a(time, order)?))
    }

    /// Linear derivative of the given order in frame B.
    pub fn evaluate_linear_derivative_b(
        &self,
        time: Time,
        order: u32,
    ) -> CurveResult<Vector3<f64>> {
        Ok(linear_part(&self.evaluate_derivative_b(time, order)?))
    }

    /// Write the current value of each requested coefficient (or all of
    /// them) into an optimizer values container.
    pub fn initialize_values(&self, keys: Option<&[Key]>, values: &mut Values) -> CurveResult<()> {
        match keys {
            Some(keys) => {
                for &key in keys {
                    let pose = *self.manager.coefficient_by_key(key)?;
                    values.insert(key, CoefficientValue::SE3(pose));
                }
            }
            None => {
                for coefficient in self.manager.iter() {
                    values.insert(coefficient.key, CoefficientValue::SE3(*coefficient.value));
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
                    CoefficientValue::SE3(pose) => {
                        self.manager.set_coefficient_by_key(key, *pose)?;
                    }
                    _ => return Err(CurveError::WrongValueAlgebra { key }),
                }
            }
        }
        Ok(())
    }

    /// Symbolic value query over the bracketing coefficient keys.
    pub fn get_value_expression(&self, time: Time) -> CurveResult<ValueExpression> {
        let (left, right) = self.manager.coefficients_at(time)?;
        if left.key == right.key {
            return Ok(ValueExpression::Coefficient { key: left.key });
        }
        Ok(ValueExpression::Se3Interpolate {
            left: left.key,
            right: right.key,
            t_left: left.time,
            t_right: right.time,
            time,
        })
    }

    /// Symbolic derivative query over the bracketing coefficient keys, in
    /// frame A.
    pub fn get_derivative_expression(
        &self,
        time: Time,
        order: u32,
    ) -> CurveResult<DerivativeExpression> {
        match order {
            0 => Err(CurveError::InvalidDerivativeOrder(0)),
            1 => {
                let (left, right) = self.derivative_bracket(time)?;
                Ok(DerivativeExpression::Se3RelativeTwist {
                    left: left.key,
                    right: right.key,
                    t_left: left.time,
                    t_right: right.time,
                    frame: Frame::A,
                })
            }
            _ => {
                self.derivative_bracket(time)?;
                Ok(DerivativeExpression::ConstantZeroTwist)
            }
        }
    }

    /// Add factors constraining the coefficients active at this time to
    /// their current values.
    pub fn add_prior_factors(
        &self,
        graph: &mut Vec<PriorFactor>,
        prior_time: Time,
    ) -> CurveResult<()> {
        let (left, right) = self.manager.coefficients_at(prior_time)?;
        graph.push(PriorFactor::new(
            left.key,
            CoefficientValue::SE3(*left.value),
        ));
        if right.key != left.key {
            graph.push(PriorFactor::new(
                right.key,
                CoefficientValue::SE3(*right.value),
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
            "set_time_range on the discrete SE3 curve",
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

    /// Write all (time, value) pairs to a flat text file.
    pub fn save_curve_times_and_values<P: AsRef<Path>>(&self, path: P) -> CurveResult<()> {
        let rows: Vec<(Time, Vec<f64>)> = self
            .manager
            .iter()
            .map(|coefficient| (coefficient.time, io::se3_fields(coefficient.value)))
            .collect();
        io::save_times_and_values(path, rows)
    }

    /// Log the curve contents, for debugging and unit tests.
    pub fn print(&self, label: &str) {
        info!(label, size = self.manager.size(), "discrete SE3 curve");
        for coefficient in self.manager.iter() {
            info!(
                key = %coefficient.key,
                time = coefficient.time,
                value = %coefficient.value,
                "coefficient"
            );
        }
    }

    fn derivative_bracket(
        &self,
        time: Time,
    ) -> CurveResult<(CoefficientRef<'_, SE3>, CoefficientRef<'_, SE3>)> {
        crate::curves::derivative_bracket(&self.manager, time)
    }
}

impl Curve for DiscreteSE3Curve {
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
        self.policy.extend(times, values, &mut self.manager)
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
        self.manager.insert_coefficients(times, values)
    }

    fn evaluate(&self, time: Time) -> CurveResult<Self::Value> {
        let (left, right) = self.manager.coefficients_at(time)?;
        if left.key == right.key {
            return Ok(*left.value);
        }
        Ok(interp::se3::interpolate(
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
