//! Auth command handlers.

use std::io::IsTerminal;

use dialoguer::Input;
use iobuilt_core::{App, CoreError, CurrentUser, User};
use secrecy::SecretString;
use tabled::Tabled;

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: util::opt_id(u.id),
            email: u.email.clone(),
            role: u.role.to_string(),
        }
    }
}

fn user_detail(u: &User) -> String {
    output::detail_lines(&[
        ("ID", util::opt_id(u.id)),
        ("Email", u.email.clone()),
        ("Role", u.role.to_string()),
    ])
}

fn current_user_detail(u: &CurrentUser) -> String {
    output::detail_lines(&[
        ("ID", u.id.to_string()),
        ("Email", u.email.clone()),
        ("Role", u.role.to_string()),
        ("Username", u.username.clone().unwrap_or_default()),
        ("Name", u.name.clone().unwrap_or_default()),
    ])
}

// ── Prompts ─────────────────────────────────────────────────────────

fn prompt_email() -> Result<String, CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "email".into(),
            reason: "pass --email when not running interactively".into(),
        });
    }
    Input::new()
        .with_prompt("Email")
        .interact_text()
        .map_err(util::prompt_err)
}

fn prompt_secret(prompt: &str, email: &str) -> Result<SecretString, CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NoPassword {
            email: email.into(),
        });
    }
    let raw = rpassword::prompt_password(format!("{prompt}: "))?;
    Ok(SecretString::from(raw))
}

/// Env, then keyring, then an interactive prompt.
fn password_for(email: &str) -> Result<SecretString, CliError> {
    match config::resolve_password(email) {
        Some(pw) => Ok(pw),
        None => prompt_secret("Password", email),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(app: &App, args: AuthArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let iam = app.iam();

    match args.command {
        AuthCommand::Login { email, remember } => {
            let email = match email {
                Some(e) => e,
                None => prompt_email()?,
            };
            let password = password_for(&email)?;
            let user = iam.sign_in(&email, &password).await?;
            if remember {
                config::store_password(&email, &password)?;
            }
            output::notice(
                &format!("Signed in as {} ({})", user.email, user.role),
                global.quiet,
            );
            Ok(())
        }

        AuthCommand::Logout { forget } => {
            let email = iam.current_user().map(|u| u.email);
            app.sign_out();
            if let Some(email) = email.as_deref().filter(|_| forget) {
                config::forget_password(email)?;
            }
            output::notice("Signed out", global.quiet);
            Ok(())
        }

        AuthCommand::Signup { email, role } => {
            let password = password_for(&email)?;
            let created = iam.sign_up(&email, &password, role).await?;
            match created {
                Some(user) => {
                    let out = output::render_single(&global.output, &user, user_detail, |u| {
                        util::opt_id(u.id)
                    })?;
                    output::print_output(&out, global.quiet);
                }
                None => output::notice(&format!("Account created for {email}"), global.quiet),
            }
            Ok(())
        }

        AuthCommand::Whoami => {
            let user = iam.current_user().ok_or(CoreError::NotAuthenticated)?;
            let out = output::render_single(&global.output, &user, current_user_detail, |u| {
                u.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AuthCommand::Passwd => {
            let email = iam.current_user().ok_or(CoreError::NotAuthenticated)?.email;
            let current = prompt_secret("Current password", &email)?;
            let new = prompt_secret("New password", &email)?;
            let confirm = prompt_secret("Confirm new password", &email)?;
            iam.change_password(&current, &new, &confirm).await?;
            output::notice("Password changed", global.quiet);
            Ok(())
        }

        AuthCommand::Users => {
            let users = iam.fetch_users().await;
            util::ensure_no_errors(iam.errors())?;
            let out = output::render_list(&global.output, &users, |u| UserRow::from(u), |u| {
                util::opt_id(u.id)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AuthCommand::User { id } => {
            let user = iam.fetch_user_by_id(id).await;
            util::ensure_no_errors(iam.errors())?;
            let user = user.ok_or_else(|| CliError::not_found("user", id, "auth users"))?;
            let out = output::render_single(&global.output, &user, user_detail, |u| {
                util::opt_id(u.id)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
