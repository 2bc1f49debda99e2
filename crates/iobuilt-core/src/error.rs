// ── Core error types ──
//
// Errors surfaced by stores and facades. Consumers never match on raw HTTP
// or JSON failures; `From<iobuilt_api::Error>` folds them into the variants
// below. Payloads are strings so the type stays `Clone` and can sit in a
// store's error log.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Session ──────────────────────────────────────────────────────
    #[error("Not authenticated -- sign in first")]
    NotAuthenticated,

    #[error("Session data is incomplete -- sign in again")]
    SessionIncomplete,

    #[error("Session expired or rejected -- sign in again")]
    Unauthorized,

    // ── Connection ───────────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data ─────────────────────────────────────────────────────────
    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("No current subscription")]
    NoCurrentSubscription,

    #[error("{0} is required")]
    MissingArgument(String),

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.to_string(),
        }
    }

    /// True for errors that a fresh sign-in would resolve.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated | Self::SessionIncomplete | Self::Unauthorized
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<iobuilt_api::Error> for CoreError {
    fn from(err: iobuilt_api::Error) -> Self {
        match err {
            iobuilt_api::Error::Unauthorized => CoreError::Unauthorized,
            iobuilt_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            iobuilt_api::Error::Status {
                status: 404,
                message,
                ..
            } => CoreError::NotFound {
                entity: "resource".into(),
                identifier: message,
            },
            iobuilt_api::Error::Status {
                status, message, ..
            } => CoreError::Api {
                message,
                status: Some(status),
            },
            iobuilt_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            iobuilt_api::Error::ClientBuild(reason) => CoreError::Config {
                message: format!("HTTP client: {reason}"),
            },
            iobuilt_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            iobuilt_api::Error::EmptyBody { status } => CoreError::Api {
                message: "empty response body".into(),
                status: Some(status),
            },
            iobuilt_api::Error::MissingArgument(name) => CoreError::MissingArgument(name.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_auth_error() {
        let err = CoreError::from(iobuilt_api::Error::Unauthorized);
        assert_eq!(err, CoreError::Unauthorized);
        assert!(err.is_auth());
    }

    #[test]
    fn status_404_maps_to_not_found() {
        let err = CoreError::from(iobuilt_api::Error::Status {
            status: 404,
            message: "Not Found".into(),
            body: String::new(),
        });
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn other_status_keeps_code_and_message() {
        let err = CoreError::from(iobuilt_api::Error::Status {
            status: 500,
            message: "boom".into(),
            body: String::new(),
        });
        assert_eq!(
            err,
            CoreError::Api {
                message: "boom".into(),
                status: Some(500)
            }
        );
    }
}
