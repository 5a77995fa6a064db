//! Prior factors anchoring curve coefficients during optimization.
//!
//! A prior factor pulls one coefficient toward a target value. The curves
//! build these for the coefficients bracketing a given time, so parts of the
//! trajectory can be pinned while the optimizer adjusts the rest. The
//! residual is the tangent-space difference between the container's current
//! value and the anchored measurement.

use nalgebra::DVector;

use crate::core::Key;
use crate::error::{CurveError, CurveResult};
use crate::values::{CoefficientValue, Values};

/// Unary constraint pulling one coefficient toward its anchored value.
#[derive(Clone, Debug)]
pub struct PriorFactor {
    /// Key of the constrained coefficient
    pub key: Key,
    /// Anchored target value
    pub measurement: CoefficientValue,
}

impl PriorFactor {
    /// Create a prior factor for a coefficient key and target value.
    pub fn new(key: Key, measurement: CoefficientValue) -> Self {
        PriorFactor { key, measurement }
    }

    /// Tangent-space residual of the container's current value against the
    /// anchored measurement.
    ///
    /// Vector coefficients: `z - x`. SE3 coefficients: the twist
    /// `[R_x⁻¹(p_z - p_x); log(R_x⁻¹ R_z)]`. Hermite coefficients: the pose
    /// residual stacked with the tangent difference (12 components).
    pub fn error(&self, values: &Values) -> CurveResult<DVector<f64>> {
        let current = values.get_required(self.key)?;
        match (current, &self.measurement) {
            (CoefficientValue::Vector(x), CoefficientValue::Vector(z)) => {
                if x.len() != z.len() {
                    return Err(CurveError::DimensionMismatch {
                        expected: z.len(),
                        actual: x.len(),
                    });
                }
                Ok(z - x)
            }
            (CoefficientValue::SE3(x), CoefficientValue::SE3(z)) => {
                Ok(DVector::from_column_slice(pose_residual(x, z).as_slice()))
            }
            (
                CoefficientValue::HermiteSE3 { pose: x, twist: tx },
                CoefficientValue::HermiteSE3 { pose: z, twist: tz },
            ) => {
                let pose_part = pose_residual(x, z);
                let mut residual = DVector::zeros(12);
                residual.rows_mut(0, 6).copy_from(&pose_part);
                residual.rows_mut(6, 6).copy_from(&(tz - tx));
                Ok(residual)
            }
            _ => Err(CurveError::WrongValueAlgebra { key: self.key }),
        }
    }
}

fn pose_residual(x: &crate::interp::SE3, z: &crate::interp::SE3) -> nalgebra::Vector6<f64> {
    let translation = x
        .rotation
        .inverse_transform_vector(&(z.translation.vector - x.translation.vector));
    let rotation = (x.rotation.inverse() * z.rotation).scaled_axis();
    crate::interp::twist_from_parts(translation, rotation)
}
