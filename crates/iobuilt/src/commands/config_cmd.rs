//! Config subcommand handlers.

use std::io::IsTerminal;
use std::path::PathBuf;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

/// The file `--config` points at, or the platform default.
fn target_path(global: &GlobalOpts) -> Result<PathBuf, CliError> {
    match &global.config {
        Some(path) => Ok(path.clone()),
        None => Ok(config::config_path()?),
    }
}

fn save(cfg: &Config, global: &GlobalOpts) -> Result<PathBuf, CliError> {
    let path = match &global.config {
        Some(path) => {
            config::save_config_to(cfg, path)?;
            path.clone()
        }
        None => config::save_config(cfg)?,
    };
    Ok(path)
}

/// Ask for the values most setups change. Keeps `cfg` values as defaults.
fn prompt_config(mut cfg: Config) -> Result<Config, CliError> {
    cfg.api_url = Input::new()
        .with_prompt("Backend URL")
        .default(cfg.api_url)
        .interact_text()
        .map_err(util::prompt_err)?;

    cfg.app_origin = Input::new()
        .with_prompt("Front-end origin (payment redirects)")
        .default(cfg.app_origin)
        .interact_text()
        .map_err(util::prompt_err)?;

    let choices = ["none (sign in)", "builder", "owner"];
    let current = match cfg.session.role.as_deref() {
        Some("builder") => 1,
        Some("owner") => 2,
        _ => 0,
    };
    let picked = Select::new()
        .with_prompt("Simulated session role")
        .items(&choices)
        .default(current)
        .interact()
        .map_err(util::prompt_err)?;

    if picked == 0 {
        cfg.session.role = None;
        cfg.session.user_id = None;
    } else {
        cfg.set("session.role", choices[picked])?;
        let user_id: u64 = Input::new()
            .with_prompt("Simulated user id")
            .default(cfg.session.user_id.unwrap_or(1))
            .interact_text()
            .map_err(util::prompt_err)?;
        cfg.session.user_id = Some(user_id);
    }
    Ok(cfg)
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let existing = config::load(global)?;
            let cfg = if std::io::stdin().is_terminal() {
                prompt_config(existing)?
            } else {
                existing
            };
            // Fail before writing anything unusable.
            cfg.to_app_config()?;
            let path = save(&cfg, global)?;
            output::notice(&format!("Configuration written to {}", path.display()), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)
                    .map_err(|e| CliError::Config(e.into()))?,
                _ => output::render_single(&global.output, &cfg, |_| String::new(), |c| {
                    c.api_url.clone()
                })?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&target_path(global)?.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let path = target_path(global)?;
            let mut cfg = config::load_config_from(&path)?;
            cfg.set(&key, &value)?;
            cfg.to_app_config()?;
            save(&cfg, global)?;
            output::notice(&format!("{key} = {value}"), global.quiet);
            Ok(())
        }
    }
}
