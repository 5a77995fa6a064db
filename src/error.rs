//! Error types for the trajectory-curves library.
//!
//! This module provides the main error and result types used throughout the
//! library. All errors use the `thiserror` crate for automatic trait
//! implementations.
//!
//! The taxonomy is deliberately flat: precondition violations (mismatched
//! input lengths, unordered times, unknown keys), out-of-domain queries, and
//! explicitly unimplemented capabilities. None of these are recoverable at
//! the call site that triggered them; the library never clamps a query time
//! or extrapolates past the stored coefficients.

use crate::core::{Key, Time};
use thiserror::Error;

/// Main result type used throughout the trajectory-curves library.
pub type CurveResult<T> = Result<T, CurveError>;

/// Main error type for the trajectory-curves library.
#[derive(Debug, Error)]
pub enum CurveError {
    /// Input slices that must be paired have different lengths
    #[error("mismatched input lengths: {times} times vs {values} values")]
    MismatchedLengths { times: usize, values: usize },

    /// Batch times are not strictly increasing
    #[error("times must be strictly increasing (violation at index {index})")]
    NonIncreasingTimes { index: usize },

    /// A coefficient already exists at this time
    #[error("a coefficient already exists at time {0}")]
    DuplicateTime(Time),

    /// Appended time does not extend the curve
    #[error("time {time} does not extend the curve past its back time {back}")]
    TimeNotAtEnd { time: Time, back: Time },

    /// Key is not present in the manager
    #[error("unknown coefficient key {0}")]
    UnknownKey(Key),

    /// Query time outside the curve's valid range
    #[error("unable to locate bracketing coefficients at time {time}: curve is defined on [{front}, {back}]")]
    OutOfDomain { time: Time, front: Time, back: Time },

    /// Curve holds too few coefficients for the requested operation
    #[error("curve has {actual} coefficients but the operation requires at least {required}")]
    InsufficientCoefficients { required: usize, actual: usize },

    /// Curve is empty
    #[error("curve is empty")]
    EmptyCurve,

    /// Vector value does not match the curve dimension
    #[error("dimension mismatch: curve has dimension {expected}, value has dimension {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Derivative order not meaningful for this query
    #[error("invalid derivative order {0}")]
    InvalidDerivativeOrder(u32),

    /// A values container holds the wrong algebra for a key
    #[error("value for key {key} has the wrong coefficient algebra")]
    WrongValueAlgebra { key: Key },

    /// Capability deliberately left unimplemented
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// IO errors from the curve dump helpers
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
