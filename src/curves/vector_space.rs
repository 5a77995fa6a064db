//! Linearly interpolated curve over a fixed-dimension vector space.

use std::collections::HashMap;

use nalgebra::DVector;
use tracing::info;

use crate::core::{CoefficientManager, CoefficientRef, Key, Time};
use crate::curves::Curve;
use crate::error::{CurveError, CurveResult};
use crate::interp;

/// Curve over Rⁿ with linear interpolation between coefficients.
///
/// Evaluation needs a bracketing pair; derivatives, extension, and the
/// expression surface are deliberately unimplemented and fail loudly rather
/// than return a partial answer.
#[derive(Clone, Debug)]
pub struct LinearInterpolationVectorSpaceCurve {
    dimension: usize,
    manager: CoefficientManager<DVector<f64>>,
}

impl LinearInterpolationVectorSpaceCurve {
    /// Create an empty curve over vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        LinearInterpolationVectorSpaceCurve {
            dimension,
            manager: CoefficientManager::new(),
        }
    }

    /// Dimension of the underlying vector space.
    pub fn dim(&self) -> usize {
        self.dimension
    }

    /// Bracketing coefficients at a query time.
    pub fn coefficients_at(
        &self,
        time: Time,
    ) -> CurveResult<(CoefficientRef<'_, DVector<f64>>, CoefficientRef<'_, DVector<f64>>)> {
        self.manager.coefficients_at(time)
    }

    /// All coefficients with time in `[start, end]`, keyed for the caller.
    pub fn coefficients_in_range(
        &self,
        start: Time,
        end: Time,
    ) -> Vec<CoefficientRef<'_, DVector<f64>>> {
        self.manager.coefficients_in_range(start, end)
    }

    /// All coefficients as a key → value map.
    pub fn coefficients(&self) -> HashMap<Key, DVector<f64>> {
        self.manager
            .iter()
            .map(|coefficient| (coefficient.key, coefficient.value.clone()))
            .collect()
    }

    /// Overwrite one coefficient's value by key.
    pub fn set_coefficient(&mut self, key: Key, value: DVector<f64>) -> CurveResult<()> {
        self.check_dimension(&value)?;
        self.manager.set_coefficient_by_key(key, value)
    }

    /// Overwrite several coefficients' values by key.
    pub fn set_coefficients(&mut self, coefficients: &HashMap<Key, DVector<f64>>) -> CurveResult<()> {
        for (&key, value) in coefficients {
            self.set_coefficient(key, value.clone())?;
        }
        Ok(())
    }

    /// Stored time for a key.
    pub fn time_at_key(&self, key: Key) -> CurveResult<Time> {
        self.manager.time_at_key(key)
    }

    /// Restrict the curve to a time range. Unimplemented.
    pub fn set_time_range(&mut self, _min_time: Time, _max_time: Time) -> CurveResult<()> {
        Err(CurveError::NotImplemented(
            "set_time_range on the vector-space curve",
        ))
    }

    /// Symbolic value query for the optimizer. Unimplemented.
    pub fn get_value_expression(
        &self,
        _time: Time,
    ) -> CurveResult<crate::expression::ValueExpression> {
        Err(CurveError::NotImplemented(
            "value expressions on the vector-space curve",
        ))
    }

    /// Log the curve contents, for debugging and unit tests.
    pub fn print(&self, label: &str) {
        info!(
            label,
            size = self.manager.size(),
            dimension = self.dimension,
            "vector-space curve"
        );
        for coefficient in self.manager.iter() {
            info!(
                key = %coefficient.key,
                time = coefficient.time,
                value = ?coefficient.value.as_slice(),
                "coefficient"
            );
        }
    }

    fn check_dimension(&self, value: &DVector<f64>) -> CurveResult<()> {
        if value.len() != self.dimension {
            return Err(CurveError::DimensionMismatch {
                expected: self.dimension,
                actual: value.len(),
            });
        }
        Ok(())
    }
}

impl Curve for LinearInterpolationVectorSpaceCurve {
    type Value = DVector<f64>;
    type Derivative = DVector<f64>;

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

    fn extend(&mut self, _times: &[Time], _values: &[Self::Value]) -> CurveResult<Vec<Key>> {
        Err(CurveError::NotImplemented(
            "extend on the vector-space curve",
        ))
    }

    fn fit_curve(&mut self, times: &[Time], values: &[Self::Value]) -> CurveResult<Vec<Key>> {
        if times.len() != values.len() {
            return Err(CurveError::MismatchedLengths {
                times: times.len(),
                values: values.len(),
            });
        }
        for value in values {
            self.check_dimension(value)?;
        }
        self.manager.clear();
        if times.is_empty() {
            return Ok(Vec::new());
        }
        self.manager.insert_coefficients(times, values)
    }

    fn evaluate(&self, time: Time) -> CurveResult<Self::Value> {
        let (left, right) = self.manager.coefficients_at(time)?;
        if left.key == right.key {
            return Ok(left.value.clone());
        }
        Ok(interp::vector::interpolate(
            left.time, left.value, right.time, right.value, time,
        ))
    }

    fn evaluate_derivative(&self, _time: Time, _order: u32) -> CurveResult<Self::Derivative> {
        Err(CurveError::NotImplemented(
            "derivatives of the vector-space curve",
        ))
    }

    fn clear(&mut self) {
        self.manager.clear();
    }
}
