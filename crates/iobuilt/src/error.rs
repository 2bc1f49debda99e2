//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use iobuilt_config::ConfigError;
use iobuilt_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the IoBuilt backend at {url}")]
    #[diagnostic(
        code(iobuilt::connection_failed),
        help(
            "Check that the backend is running and the URL is right.\n\
             Reason: {reason}\n\
             Try: iobuilt config set api_url <URL>"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(iobuilt::timeout),
        help("Raise timeout_secs in the config or check backend responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(iobuilt::auth),
        help(
            "Sign in with: iobuilt auth login\n\
             Or set [session] user_id and role in the config to act as a test user."
        )
    )]
    AuthRequired { message: String },

    #[error("No password available for {email}")]
    #[diagnostic(
        code(iobuilt::no_password),
        help("Set IOBUILT_PASSWORD, store one with `iobuilt auth login --remember`, or run interactively.")
    )]
    NoPassword { email: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(iobuilt::not_found), help("{hint}"))]
    NotFound {
        resource_type: String,
        identifier: String,
        hint: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(iobuilt::api_error))]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(iobuilt::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(iobuilt::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(iobuilt::config),
        help("Inspect the effective configuration with: iobuilt config show")
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(iobuilt::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthRequired { .. } | Self::NoPassword { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::Config(ConfigError::Validation { .. } | ConfigError::UnknownKey(_)) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    pub fn not_found(resource_type: &str, identifier: impl ToString, list_command: &str) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.to_string(),
            hint: format!("Run: iobuilt {list_command} to see what is available"),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotAuthenticated | CoreError::SessionIncomplete | CoreError::Unauthorized => {
                CliError::AuthRequired {
                    message: err.to_string(),
                }
            }

            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout => CliError::Timeout,

            CoreError::NotFound { entity, identifier } => CliError::NotFound {
                resource_type: entity,
                identifier,
                hint: "Check the ID and try again.".into(),
            },

            CoreError::NoCurrentSubscription => {
                CliError::not_found("subscription", "current", "subscription plans")
            }

            CoreError::MissingArgument(field) => CliError::Validation {
                field,
                reason: "a value is required".into(),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::Api { message, status },

            CoreError::Internal(message) => CliError::Api {
                message,
                status: None,
            },
        }
    }
}
