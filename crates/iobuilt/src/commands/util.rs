//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use chrono::{DateTime, Utc};
use iobuilt_core::ErrorLog;
use serde::de::DeserializeOwned;

use crate::error::CliError;

/// Fetch actions record failures instead of returning them. Surface the
/// latest one so the process exits with the right code.
pub fn ensure_no_errors(errors: &ErrorLog) -> Result<(), CliError> {
    match errors.last() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

pub fn opt_id(id: Option<u64>) -> String {
    id.map(|v| v.to_string()).unwrap_or_default()
}

pub fn date(value: Option<DateTime<Utc>>) -> String {
    value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Overwrite `target` when a flag was given.
pub fn apply<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use iobuilt_core::CoreError;

    use super::*;

    #[test]
    fn recorded_errors_surface() {
        let log = ErrorLog::new();
        assert!(ensure_no_errors(&log).is_ok());

        log.record("fetch_projects", CoreError::NotAuthenticated);
        assert!(matches!(
            ensure_no_errors(&log),
            Err(CliError::AuthRequired { .. })
        ));
    }

    #[test]
    fn apply_only_overwrites_given_values() {
        let mut name = String::from("North");
        apply(&mut name, None);
        assert_eq!(name, "North");
        apply(&mut name, Some("South".into()));
        assert_eq!(name, "South");
    }

    #[test]
    fn dates_render_as_days() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).single();
        assert_eq!(date(ts), "2025-03-09");
        assert_eq!(date(None), "");
    }
}
