use thiserror::Error;

/// Failures raised by the numeric side of the demos.
///
/// File handling and chart rendering stay on `anyhow`; these are the cases
/// a caller may want to match on.
#[derive(Error, Debug)]
pub enum DemoError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Survey contains no points")]
    EmptySurvey,

    #[error("Interpolation system is singular (pivot {pivot:.3e} at row {row})")]
    SingularSystem { row: usize, pivot: f64 },

    #[error("Series length mismatch: {name} has {got} values, expected {expected}")]
    LengthMismatch {
        name: String,
        got: usize,
        expected: usize,
    },
}

pub type Result<T> = std::result::Result<T, DemoError>;
