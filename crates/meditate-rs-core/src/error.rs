//! Error types for the generation pipeline.

use meditate_rs_protocol::ErrorKind;
use thiserror::Error;

/// Classified failures raised by pipeline components.
///
/// The `Display` output is the caller-facing message; provider details that
/// help reproduce a failure are logged where the failure is classified.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MeditationError {
    /// One or more selection rules were violated.
    #[error("{}", .messages.join(" "))]
    ValidationFailed { messages: Vec<String> },
    /// Selections could not be read as strings.
    #[error("{0}")]
    InputFormat(String),
    /// Missing or rejected provider credentials.
    #[error("{0}")]
    Configuration(String),
    /// Provider quota or rate limit exhausted.
    #[error("{0}")]
    ProviderOverloaded(String),
    /// Provider call exceeded its timeout.
    #[error("{0}")]
    ProviderTimeout(String),
    /// Provider could not be reached.
    #[error("{0}")]
    ProviderUnreachable(String),
    /// Provider token budget exceeded.
    #[error("{0}")]
    RequestTooComplex(String),
    /// Unclassified provider failure carrying the provider's detail.
    #[error("{0}")]
    Provider(String),
    /// Anything else, including persistence failures.
    #[error("{0}")]
    Unexpected(String),
}

impl MeditationError {
    /// Caller-visible kind for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeditationError::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            MeditationError::InputFormat(_) => ErrorKind::InputFormat,
            MeditationError::Configuration(_) => ErrorKind::ConfigurationError,
            MeditationError::ProviderOverloaded(_) => ErrorKind::ProviderOverloaded,
            MeditationError::ProviderTimeout(_) => ErrorKind::ProviderTimeout,
            MeditationError::ProviderUnreachable(_) => ErrorKind::ProviderUnreachable,
            MeditationError::RequestTooComplex(_) => ErrorKind::RequestTooComplex,
            MeditationError::Provider(_) => ErrorKind::ProviderError,
            MeditationError::Unexpected(_) => ErrorKind::UnexpectedError,
        }
    }

    /// Individual violations for structured consumers.
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            MeditationError::ValidationFailed { messages } => Some(messages),
            _ => None,
        }
    }
}
