use thiserror::Error;

/// Top-level error type for the `iobuilt-api` crate.
///
/// Covers every failure mode of the REST surface: transport, HTTP status,
/// forced logout on 401, payload decoding, and missing call arguments.
/// `iobuilt-core` maps these into store-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to build the underlying HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── HTTP status ─────────────────────────────────────────────────
    /// The backend answered 401. The session has already been cleared
    /// and the navigator sent to the login view when this is returned.
    #[error("Unauthorized -- session cleared, sign in again")]
    Unauthorized,

    /// Any other non-2xx response.
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A 2xx response arrived without the payload the caller needs.
    #[error("Empty response body (HTTP {status})")]
    EmptyBody { status: u16 },

    // ── Arguments ───────────────────────────────────────────────────
    /// A required argument was absent (e.g. profile fetch without a user id).
    #[error("{0} is required")]
    MissingArgument(&'static str),
}

impl Error {
    /// Returns `true` if the backend rejected the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Status { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::EmptyBody { status } => Some(*status),
            Self::Unauthorized => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
