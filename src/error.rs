use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "Service Info.api key", "feedback.data")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_file", "query")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the Predictive Service client.
///
/// Construction failures surface as [`Error::Configuration`]; call-level
/// failures as [`Error::InvalidArgument`], [`Error::NotFound`] or
/// [`Error::Request`]. Nothing is retried automatically.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Invalid argument: {message}{}", format_context(.context))]
    InvalidArgument {
        message: String,
        context: ErrorContext,
    },

    /// The service answered 404 for a query URI.
    #[error("Predictive Object '{uri}' cannot be found")]
    NotFound { uri: String },

    /// Any other non-success HTTP status.
    #[error("Request error status: {status}, error: {body}")]
    Request { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new invalid-argument error with structured context
    pub fn invalid_argument_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::InvalidArgument {
            message: msg.into(),
            context,
        }
    }

    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::InvalidArgument { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// HTTP status carried by the error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound { .. } => Some(404),
            Error::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// True for errors caused by the caller's input rather than the service.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display_includes_context() {
        let err = Error::configuration_with_context(
            "missing required key",
            ErrorContext::new()
                .with_field_path("Service Info.api key")
                .with_source("config_file"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: missing required key (field: Service Info.api key, source: config_file)"
        );
        assert_eq!(
            err.context().and_then(|c| c.source.as_deref()),
            Some("config_file")
        );
    }

    #[test]
    fn test_context_omitted_when_empty() {
        let err = Error::invalid_argument_with_context("bad timeout", ErrorContext::default());
        assert_eq!(err.to_string(), "Invalid argument: bad timeout");
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_status_accessor() {
        let not_found = Error::NotFound {
            uri: "missing".into(),
        };
        assert_eq!(not_found.status(), Some(404));
        assert!(not_found.is_not_found());
        assert_eq!(
            not_found.to_string(),
            "Predictive Object 'missing' cannot be found"
        );

        let request = Error::Request {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(request.status(), Some(500));
        assert_eq!(request.to_string(), "Request error status: 500, error: boom");
        assert!(request.context().is_none());

        assert_eq!(Error::InvalidResponse("x".into()).status(), None);
    }
}
