//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - named outputs (`ParamValue`, `Parameter`, `ParameterSet`)
//! - analysis results (`AnalysisResult`, `FitOutcome`, `FitStats`)
//! - inputs and configuration (`Coordinates`, `Dataset`, `FitConfig`, ...)

pub mod parameter;
pub mod result;
pub mod types;

pub use parameter::*;
pub use result::*;
pub use types::*;
