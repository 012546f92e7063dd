//! Curve fitting.
//!
//! Responsibilities:
//!
//! - seed parameters from a model's guess heuristic and caller overrides
//! - either report the seed (dry run) or optimize it with Levenberg–Marquardt
//! - turn the optimizer report into parameters and fit statistics

pub mod fitter;

pub use fitter::*;
