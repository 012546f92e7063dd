//! Error types.
//!
//! Two layers:
//!
//! - [`AnalysisError`]: returned by the library core (analyses, fits, parameter
//!   access). Nothing in the core logs or recovers these; they surface to the
//!   immediate caller.
//! - [`AppError`]: what the `anafit` binary reports, carrying a process exit code.

/// Errors produced by analyses, fits and result/parameter access.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    /// A required capability was invoked on an implementation that does not provide it.
    #[error("{operation} is not implemented for {owner}")]
    NotImplemented { owner: String, operation: &'static str },

    #[error("parameter '{parameter}' has no attribute '{attribute}'")]
    UnknownAttribute { parameter: String, attribute: String },

    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    /// The least-squares optimizer could not produce a solution.
    #[error("optimization failed: {0}")]
    Optimization(String),

    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("length mismatch: {what} has {actual} values, expected {expected}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("{analysis} expects {expected}-dimensional coordinates, got {actual}")]
    DimensionMismatch {
        analysis: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid analysis outputs: {0}")]
    InvalidOutputs(String),
}

impl AnalysisError {
    pub fn not_implemented(owner: impl Into<String>, operation: &'static str) -> Self {
        Self::NotImplemented {
            owner: owner.into(),
            operation,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        // Shape problems with the input are usage errors; everything else is a
        // failure of the analysis itself.
        let code = match &err {
            AnalysisError::EmptyInput(_) => 3,
            AnalysisError::InvalidInput(_)
            | AnalysisError::LengthMismatch { .. }
            | AnalysisError::DimensionMismatch { .. }
            | AnalysisError::UnknownParameter(_)
            | AnalysisError::InvalidOutputs(_) => 2,
            _ => 4,
        };
        AppError::new(code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
