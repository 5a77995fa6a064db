//! Key-addressed coefficient values for the optimizer boundary.
//!
//! An external nonlinear least-squares optimizer names each coefficient by
//! its [`Key`]. [`Values`] is the exchange container the curves fill via
//! `initialize_values` and read back via `update_from_values`;
//! [`CoefficientValue`] is the closed set of coefficient algebras a curve
//! can exchange.

use std::collections::HashMap;

use nalgebra::DVector;

use crate::core::Key;
use crate::error::{CurveError, CurveResult};
use crate::interp::{SE3, Twist};

/// One coefficient value in any of the supported algebras.
#[derive(Clone, Debug)]
pub enum CoefficientValue {
    /// Real vector of fixed dimension
    Vector(DVector<f64>),
    /// Rigid transformation
    SE3(SE3),
    /// Rigid transformation plus body-frame tangent twist
    HermiteSE3 {
        /// Rigid transformation at the knot
        pose: SE3,
        /// Body-frame twist tangent at the knot
        twist: Twist,
    },
}

impl CoefficientValue {
    /// The SE3 value, if this is an SE3 coefficient.
    pub fn as_se3(&self) -> Option<&SE3> {
        match self {
            CoefficientValue::SE3(pose) => Some(pose),
            _ => None,
        }
    }

    /// The vector value, if this is a vector coefficient.
    pub fn as_vector(&self) -> Option<&DVector<f64>> {
        match self {
            CoefficientValue::Vector(vector) => Some(vector),
            _ => None,
        }
    }

    /// The pose and tangent, if this is a Hermite coefficient.
    pub fn as_hermite(&self) -> Option<(&SE3, &Twist)> {
        match self {
            CoefficientValue::HermiteSE3 { pose, twist } => Some((pose, twist)),
            _ => None,
        }
    }
}

/// Variable-value container exchanged with the external optimizer.
#[derive(Clone, Debug, Default)]
pub struct Values {
    map: HashMap<Key, CoefficientValue>,
}

impl Values {
    /// Create an empty container.
    pub fn new() -> Self {
        Values {
            map: HashMap::new(),
        }
    }

    /// Insert or replace the value for a key.
    pub fn insert(&mut self, key: Key, value: CoefficientValue) {
        self.map.insert(key, value);
    }

    /// Value for a key, if present.
    pub fn get(&self, key: Key) -> Option<&CoefficientValue> {
        self.map.get(&key)
    }

    /// Value for a key, or an unknown-key error.
    pub fn get_required(&self, key: Key) -> CurveResult<&CoefficientValue> {
        self.map.get(&key).ok_or(CurveError::UnknownKey(key))
    }

    /// Whether a key is present.
    pub fn contains(&self, key: Key) -> bool {
        self.map.contains_key(&key)
    }

    /// Remove the value for a key.
    pub fn remove(&mut self, key: Key) -> Option<CoefficientValue> {
        self.map.remove(&key)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the container is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Stored keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.map.keys().copied()
    }

    /// Iterate over stored (key, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Key, &CoefficientValue)> {
        self.map.iter().map(|(&key, value)| (key, value))
    }
}
