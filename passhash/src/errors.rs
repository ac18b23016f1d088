// Error types for password hashing and verification

use thiserror::Error;

/// Password hashing errors
///
/// A verification mismatch is not an error; `verify` returns `Ok(false)`.
/// None of the messages carry the secret itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid cost factor {cost}: must be between {min} and {max}")]
    InvalidCost { cost: u32, min: u32, max: u32 },

    #[error("Hashing primitive failed: {0}")]
    PrimitiveFailure(String),

    #[error("Malformed hash record: {0}")]
    MalformedRecord(String),
}

impl HashError {
    /// Caller-supplied secret or cost was rejected; the caller may retry with other input
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::InvalidCost { .. })
    }

    /// Stored record is corrupt or uses an unsupported algorithm
    pub fn is_malformed_record(&self) -> bool {
        matches!(self, Self::MalformedRecord(_))
    }

    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidCost { .. } => "invalid_cost",
            Self::PrimitiveFailure(_) => "primitive_failure",
            Self::MalformedRecord(_) => "malformed_record",
        }
    }
}

impl From<bcrypt::BcryptError> for HashError {
    fn from(e: bcrypt::BcryptError) -> Self {
        HashError::PrimitiveFailure(e.to_string())
    }
}

pub type HashResult<T> = Result<T, HashError>;
