//! Caller-visible error kinds and the JSON error body.

use serde::{Deserialize, Serialize};

/// Classified failure kinds surfaced by the generation pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller input violated one or more selection rules.
    ValidationFailed,
    /// Caller input could not be coerced into selection strings.
    InputFormat,
    /// Deployment/setup defect (missing or rejected credentials).
    ConfigurationError,
    /// Provider quota or rate limit exhausted.
    ProviderOverloaded,
    /// Provider did not answer within the configured timeout.
    ProviderTimeout,
    /// No network path to the provider.
    ProviderUnreachable,
    /// Request exceeded the provider's token budget.
    RequestTooComplex,
    /// Unclassified provider failure.
    ProviderError,
    /// Anything not anticipated, including persistence failures.
    UnexpectedError,
}

impl ErrorKind {
    /// Whether the caller can fix the problem (400-class).
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            ErrorKind::ValidationFailed | ErrorKind::InputFormat | ErrorKind::ConfigurationError
        )
    }

    /// `error_type` tag carried in error bodies, if the kind has one.
    pub fn error_type(self) -> Option<&'static str> {
        match self {
            ErrorKind::ValidationFailed | ErrorKind::InputFormat => None,
            ErrorKind::ConfigurationError => Some("value_error"),
            ErrorKind::UnexpectedError => Some("unexpected_error"),
            ErrorKind::ProviderOverloaded
            | ErrorKind::ProviderTimeout
            | ErrorKind::ProviderUnreachable
            | ErrorKind::RequestTooComplex
            | ErrorKind::ProviderError => Some("runtime_error"),
        }
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<String>>,
}

impl ApiErrorBody {
    /// Body with only an `error` message.
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiErrorBody, ErrorKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn status_classes_follow_kind() {
        assert!(ErrorKind::ValidationFailed.is_client_error());
        assert!(ErrorKind::ConfigurationError.is_client_error());
        assert!(!ErrorKind::ProviderTimeout.is_client_error());
        assert!(!ErrorKind::UnexpectedError.is_client_error());
    }

    #[test]
    fn error_type_tags() {
        assert_eq!(ErrorKind::ConfigurationError.error_type(), Some("value_error"));
        assert_eq!(ErrorKind::ProviderOverloaded.error_type(), Some("runtime_error"));
        assert_eq!(ErrorKind::UnexpectedError.error_type(), Some("unexpected_error"));
        assert_eq!(ErrorKind::ValidationFailed.error_type(), None);
    }

    #[test]
    fn error_body_omits_absent_fields() {
        let body = ApiErrorBody::message("Meditation not found");
        assert_eq!(
            serde_json::to_value(body).expect("json"),
            json!({ "error": "Meditation not found" })
        );
    }
}
