//! CLI-specific configuration glue.
//!
//! Re-exports the shared `iobuilt-config` crate and adds the `GlobalOpts`
//! overrides, the persisted session and `App` construction.

use std::sync::Arc;

use iobuilt_api::Navigator;
use iobuilt_core::App;

pub use iobuilt_config::{
    Config, FileSessionStore, config_path, forget_password, load_config, load_config_from,
    resolve_password, save_config, save_config_to, store_password,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Sends the user back to `auth login` when the backend rejects the session.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        tracing::debug!(path, "navigation requested");
        eprintln!("Session rejected by the backend. Sign in again with: iobuilt auth login");
    }
}

/// Load config from `--config` or the default path, then apply flag overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = match &global.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(url) = &global.api_url {
        cfg.api_url.clone_from(url);
    }
    Ok(cfg)
}

/// Build the application over the persisted session.
pub fn build_app(cfg: &Config) -> Result<App, CliError> {
    let app_config = cfg.to_app_config()?;
    let session = FileSessionStore::open(cfg.session_path()?)?;
    tracing::debug!(api_url = %app_config.api_url, session = %session.path().display(), "building app");
    let app = App::new(app_config, Arc::new(session), Arc::new(TerminalNavigator))?;
    Ok(app)
}
