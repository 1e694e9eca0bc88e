//! Error types. `Display` output is what the user sees in the status line.

use thiserror::Error;

pub const UNREACHABLE: &str = "Could not reach backend. Is it running?";

/// Input rejected before any request is made.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields.")]
    MissingFields,
    #[error("Password must be at least 8 characters.")]
    PasswordTooShort,
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("Enter numeric values for all fields.")]
    NonNumeric,
    #[error("Please select a file first.")]
    NoFile,
    #[error("Unsupported file type. Upload CSV or Excel.")]
    UnsupportedFile,
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ApiError {
    /// Non-2xx response or a payload that reports failure.
    #[error("{0}")]
    Backend(String),
    #[error("{}", UNREACHABLE)]
    Transport(String),
    #[error("Unexpected response from backend.")]
    Decode(String),
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Backend(String),
    #[error("{}", UNREACHABLE)]
    Transport,
    #[error("Please wait for the current request to finish.")]
    Busy,
    /// The session changed while the request was in flight.
    #[error("Request was superseded.")]
    Stale,
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Backend(detail) => AuthError::Backend(detail),
            ApiError::Transport(_) => AuthError::Transport,
            decode @ ApiError::Decode(_) => AuthError::Backend(decode.to_string()),
        }
    }
}
