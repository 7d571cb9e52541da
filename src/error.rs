use thiserror::Error;

/// Errors raised by the survey computation core.
///
/// Loading failures are wrapped in `anyhow` with file context by the loader;
/// everything else surfaces here so the dashboard can report it per interaction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurveyError {
    #[error("required column '{0}' is missing")]
    MissingColumn(String),
    #[error("row {row}, column '{column}': '{value}' {reason}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("field '{field}' is not a {expected} column")]
    WrongFieldKind {
        field: String,
        expected: &'static str,
    },
    #[error("field '{0}' cannot be filtered on")]
    NotFilterable(String),
    #[error("weights must be non-negative and sum to 1.0, got {sum}")]
    InvalidWeights { sum: f64 },
    #[error("no value supplied for weighted metric '{0}'")]
    MissingMetric(String),
    #[error("weight given for unknown metric '{0}'")]
    UnknownMetric(String),
    #[error("metric '{name}' = {value} is outside [{min}, {max}]")]
    MetricOutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType { column: String, data_type: String },
}

pub type Result<T> = std::result::Result<T, SurveyError>;
