use thiserror::Error;

/// Errors raised by the calculation engine.
///
/// [`TaxError::Validation`] is always recoverable by the caller.
/// [`TaxError::Configuration`] is raised while rate tables are being built and
/// means the engine must not be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxError {
    /// A caller-supplied value is missing, malformed or out of range.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// No rates are defined for the requested tax year.
    #[error("no rate table defined for tax year {0}")]
    UnsupportedYear(i32),

    /// A rate table is internally inconsistent.
    #[error("invalid rate configuration: {0}")]
    Configuration(String),
}

impl TaxError {
    pub fn validation(
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Name of the offending input field, for validation errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type TaxResult<T> = Result<T, TaxError>;
