use thiserror::Error as ThisError;

/// Library-level errors raised while building or evaluating data points.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Error {
    #[error("missing required parameter `{0}`")]
    MissingField(String),

    #[error("invalid value '{value}' for `{field}`: {reason}")]
    InvalidField {
        field: String,
        value: String,
        reason: String,
    },

    #[error("invalid assignment '{assignment}': {reason}")]
    InvalidAssignment { assignment: String, reason: String },

    #[error("invalid pulse timing: {0}")]
    InvalidTiming(String),

    #[error("invalid value {value} for parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid uncertainty {0} (must be finite and > 0)")]
    InvalidUncertainty(f64),

    #[error("noise distribution error: {0}")]
    Noise(String),
}

impl Error {
    /// Whether the error comes from user-supplied input rather than evaluation.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Error::InvalidParameter { .. } | Error::Noise(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Error surfaced by the binary, carrying the process exit code.
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

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let exit_code = if err.is_input_error() { 2 } else { 4 };
        AppError::new(exit_code, err.to_string())
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
