//! Continuous-time trajectory curves with local support.
//!
//! A trajectory is represented as a sparse, time-ordered set of coefficients
//! (vector samples, rigid transformations, or rigid transformations with
//! tangent twists). Evaluation at an arbitrary query time depends on at most
//! the nearest coefficients, and every coefficient carries a stable key so an
//! external nonlinear least-squares optimizer can address it as an estimation
//! variable.
//!
//! The crate is organized around four components:
//! - [`core`] — the time-ordered coefficient manager and the sampling policy
//!   that decides when incoming measurements create new coefficients.
//! - [`interp`] — the pure interpolation and derivative math, one submodule
//!   per coefficient algebra.
//! - [`curves`] — the curve façades composing manager, policy, and math.
//! - [`values`], [`expression`], [`factors`] — the boundary surface an
//!   external optimizer round-trips coefficient values through.

pub mod core;
pub mod curves;
pub mod error;
pub mod expression;
pub mod factors;
pub mod interp;
pub mod io;
pub mod logger;
pub mod values;

pub use crate::core::{Key, Time};
pub use crate::error::{CurveError, CurveResult};
pub use crate::logger::{init_logger, init_logger_with_level};
