//! Webhook adapter error types.

/// Errors specific to the webhook notifier.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// No maker key is configured.
    #[error("webhook key not configured")]
    MissingKey,

    /// The event name cannot be used as a URL path segment.
    #[error("invalid event name {0:?}")]
    InvalidEvent(String),

    /// The HTTP client could not be built or the request failed.
    #[error("webhook request failed")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("webhook endpoint answered {status}")]
    Status { status: reqwest::StatusCode },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_missing_key_error() {
        assert_eq!(
            WebhookError::MissingKey.to_string(),
            "webhook key not configured"
        );
    }

    #[test]
    fn should_display_status_error() {
        let err = WebhookError::Status {
            status: reqwest::StatusCode::UNAUTHORIZED,
        };
        assert_eq!(err.to_string(), "webhook endpoint answered 401 Unauthorized");
    }
}
