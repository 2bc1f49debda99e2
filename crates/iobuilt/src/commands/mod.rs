//! Command dispatch: bridges CLI args -> store actions -> output formatting.

pub mod analytics;
pub mod auth;
pub mod clients;
pub mod config_cmd;
pub mod devices;
pub mod monitoring;
pub mod profile;
pub mod projects;
pub mod subscription;
pub mod util;

use iobuilt_core::App;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Auth(args) => auth::handle(app, args, global).await,
        Command::Profile(args) => profile::handle(app, args, global).await,
        Command::Projects(args) => projects::handle(app, args, global).await,
        Command::Clients(args) => clients::handle(app, args, global).await,
        Command::Devices(args) => devices::handle(app, args, global).await,
        Command::Subscription(args) => subscription::handle(app, args, global).await,
        Command::Monitoring(args) => monitoring::handle(app, args, global).await,
        Command::Analytics(args) => analytics::handle(app, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
