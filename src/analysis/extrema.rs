//! Extremum finders.
//!
//! `FindMax` reports `max_val` and `max_pos`; `FindMin` reports `min_val` and
//! `min_pos`. The position is the coordinate of the extremum: a number for 1-D
//! inputs, an array with one value per axis otherwise. Ties resolve to the
//! lowest index, and NaN samples are ignored.

use crate::analysis::Analysis;
use crate::domain::{AnalysisResult, Dataset, ParameterSet};
use crate::error::AnalysisError;
use crate::math::{argmax, argmin};

#[derive(Debug, Clone, Copy, Default)]
pub struct FindMax;

#[derive(Debug, Clone, Copy, Default)]
pub struct FindMin;

impl Analysis for FindMax {
    fn name(&self) -> &str {
        "FindMax"
    }

    fn analyze(&self, input: &Dataset) -> Result<AnalysisResult, AnalysisError> {
        extremum(input, argmax(input.data()), "max_val", "max_pos")
    }
}

impl Analysis for FindMin {
    fn name(&self) -> &str {
        "FindMin"
    }

    fn analyze(&self, input: &Dataset) -> Result<AnalysisResult, AnalysisError> {
        extremum(input, argmin(input.data()), "min_val", "min_pos")
    }
}

fn extremum(
    input: &Dataset,
    idx: Option<usize>,
    val_name: &str,
    pos_name: &str,
) -> Result<AnalysisResult, AnalysisError> {
    let idx = idx.ok_or_else(|| AnalysisError::EmptyInput("all data values are NaN".into()))?;
    let pos = input.coordinates().point(idx).ok_or_else(|| {
        AnalysisError::LengthMismatch {
            what: "coordinates".into(),
            expected: input.len(),
            actual: input.coordinates().len(),
        }
    })?;

    let mut params = ParameterSet::new();
    params.add(val_name, input.data()[idx]);
    params.add_with(pos_name, pos, [("index", idx)]);
    Ok(AnalysisResult::new(params))
}
