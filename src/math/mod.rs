//! Numerical building blocks: least squares solvers, spectra and statistics.

pub mod lm;
pub mod ols;
pub mod spectrum;
pub mod stats;

pub use lm::*;
pub use ols::*;
pub use spectrum::*;
pub use stats::*;
