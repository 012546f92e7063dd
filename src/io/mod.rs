//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - result exports (JSON) and dataset/curve CSVs (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
