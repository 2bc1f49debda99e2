//! Shared configuration for IoBuilt front ends.
//!
//! TOML file + `IOBUILT_*` environment layering, translation to
//! `iobuilt_core::AppConfig`, a file-backed session store and sign-in
//! password resolution (env + keyring). The CLI adds prompting on top.

pub mod session;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use iobuilt_api::EndpointPaths;
use iobuilt_core::{AppConfig, Role, SimulatedSession};

pub use session::FileSessionStore;

const KEYRING_SERVICE: &str = "iobuilt";
const PASSWORD_ENV: &str = "IOBUILT_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown config key '{0}'")]
    UnknownKey(String),

    #[error("no platform config directory could be determined")]
    NoConfigDir,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("session file is not valid JSON: {0}")]
    SessionFormat(#[from] serde_json::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL (e.g., "http://localhost:3000").
    pub api_url: String,

    /// View the navigator is sent to when the session is rejected.
    pub login_path: String,

    /// Front-end origin used to build payment redirect URLs.
    pub app_origin: String,

    /// Request timeout. Unset waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Override for the persisted session file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_file: Option<PathBuf>,

    pub endpoints: EndpointPaths,

    /// Identity used by builder/owner views when nobody is signed in.
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".into(),
            login_path: "/login".into(),
            app_origin: "http://localhost:5173".into(),
            timeout_secs: None,
            session_file: None,
            endpoints: EndpointPaths::default(),
            session: SessionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,

    /// "builder" or "owner".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Config {
    /// Translate into the runtime configuration the stores consume.
    pub fn to_app_config(&self) -> Result<AppConfig, ConfigError> {
        let api_url: url::Url = self
            .api_url
            .parse()
            .map_err(|_| ConfigError::validation("api_url", format!("invalid URL: {}", self.api_url)))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::validation(
                "api_url",
                format!("expected http or https, got '{}'", api_url.scheme()),
            ));
        }

        let timeout = match self.timeout_secs {
            Some(0) => return Err(ConfigError::validation("timeout_secs", "must be positive")),
            other => other.map(Duration::from_secs),
        };

        let role = self
            .session
            .role
            .as_deref()
            .map(|raw| {
                Role::parse(raw).ok_or_else(|| {
                    ConfigError::validation(
                        "session.role",
                        format!("expected 'builder' or 'owner', got '{raw}'"),
                    )
                })
            })
            .transpose()?;

        let mut app = AppConfig::new(api_url);
        app.paths = self.endpoints.clone();
        app.login_path.clone_from(&self.login_path);
        app.app_origin.clone_from(&self.app_origin);
        app.timeout = timeout;
        app.simulated_session = SimulatedSession {
            user_id: self.session.user_id,
            role,
        };
        Ok(app)
    }

    /// Set one dotted key from its string form, as `config set` does.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let parse_u64 = |field: &str| {
            value
                .parse::<u64>()
                .map_err(|_| ConfigError::validation(field, format!("expected a number, got '{value}'")))
        };

        match key {
            "api_url" => self.api_url = value.into(),
            "login_path" => self.login_path = value.into(),
            "app_origin" => self.app_origin = value.into(),
            "timeout_secs" => self.timeout_secs = Some(parse_u64(key)?),
            "session_file" => self.session_file = Some(PathBuf::from(value)),
            "session.user_id" => self.session.user_id = Some(parse_u64(key)?),
            "session.role" => {
                let role = Role::parse(value).ok_or_else(|| {
                    ConfigError::validation(key, format!("expected 'builder' or 'owner', got '{value}'"))
                })?;
                self.session.role = Some(role.to_string());
            }
            _ => {
                let Some(name) = key.strip_prefix("endpoints.") else {
                    return Err(ConfigError::UnknownKey(key.into()));
                };
                let slot = endpoint_slot(&mut self.endpoints, name)
                    .ok_or_else(|| ConfigError::UnknownKey(key.into()))?;
                *slot = value.into();
            }
        }
        Ok(())
    }

    /// Where the session is persisted: the override, or the data dir.
    pub fn session_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.session_file {
            Some(path) => Ok(path.clone()),
            None => session::default_session_path(),
        }
    }
}

fn endpoint_slot<'a>(paths: &'a mut EndpointPaths, name: &str) -> Option<&'a mut String> {
    Some(match name {
        "authentication" => &mut paths.authentication,
        "users" => &mut paths.users,
        "user_details" => &mut paths.user_details,
        "projects" => &mut paths.projects,
        "clients" => &mut paths.clients,
        "devices" => &mut paths.devices,
        "device_configurations" => &mut paths.device_configurations,
        "subscriptions" => &mut paths.subscriptions,
        "plans" => &mut paths.plans,
        "analytics" => &mut paths.analytics,
        _ => return None,
    })
}

// ── Config file path ────────────────────────────────────────────────

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "iobuilt", "iobuilt")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .ok_or(ConfigError::NoConfigDir)
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path()?)
}

/// Load from an explicit file. A missing file yields defaults + env.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("IOBUILT_").split("__"))
        .extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path()?;
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Sign-in password for `email`: `IOBUILT_PASSWORD`, then the keyring.
///
/// `None` means the caller has to ask interactively.
pub fn resolve_password(email: &str) -> Option<SecretString> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Some(SecretString::from(pw));
        }
    }

    keyring::Entry::new(KEYRING_SERVICE, email)
        .and_then(|entry| entry.get_password())
        .ok()
        .map(SecretString::from)
}

/// Remember the password for `email` in the system keyring.
pub fn store_password(email: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, email)?.set_password(password.expose_secret())?;
    debug!(email, "password stored in keyring");
    Ok(())
}

/// Forget the keyring entry for `email`. A missing entry is not an error.
pub fn forget_password(email: &str) -> Result<(), ConfigError> {
    match keyring::Entry::new(KEYRING_SERVICE, email)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
