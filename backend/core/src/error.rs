use thiserror::Error;

/// Top-level error type for the ForumLink runtime.
#[derive(Debug, Error)]
pub enum ForumError {
    /// Required configuration is missing or malformed. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A parameter failed its declared schema.
    #[error("invalid parameter '{param}': {message}")]
    Validation { param: String, message: String },

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// Non-success response (or transport failure) from the forum API.
    #[error("Discourse API error: {status} {status_text}")]
    Upstream { status: u16, status_text: String },

    /// Upstream payload could not be shaped into a public record.
    #[error("unexpected upstream payload: {0}")]
    Projection(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ForumError {
    pub fn validation(param: impl Into<String>, message: impl Into<String>) -> Self {
        ForumError::Validation {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn upstream(status: u16, status_text: impl Into<String>) -> Self {
        ForumError::Upstream {
            status,
            status_text: status_text.into(),
        }
    }

    /// True for errors raised before a handler runs (bad name or parameters).
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            ForumError::Validation { .. } | ForumError::UnknownOperation(_)
        )
    }
}

pub type Result<T, E = ForumError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_carries_status() {
        let err = ForumError::upstream(500, "Internal Server Error");
        assert_eq!(
            err.to_string(),
            "Discourse API error: 500 Internal Server Error"
        );
        assert!(!err.is_request_error());
    }

    #[test]
    fn validation_is_request_level() {
        let err = ForumError::validation("per_page", "must be <= 50");
        assert!(err.is_request_error());
        assert!(err.to_string().contains("per_page"));
    }
}
