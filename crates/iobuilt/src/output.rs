//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Paint a status word: green for healthy states, red for failed ones.
pub fn paint_status(status: &str, color: bool) -> String {
    if !color {
        return status.to_owned();
    }
    match status.to_ascii_lowercase().as_str() {
        "online" | "active" | "paid" => status.green().to_string(),
        "offline" | "cancelled" | "canceled" | "failed" | "expired" => status.red().to_string(),
        "warning" | "pending" | "planning" => status.yellow().to_string(),
        _ => status.dimmed().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => render_yaml(data)?,
        OutputFormat::Plain => data.iter().map(id_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render a single item. Table mode uses `detail_fn` for a key/value view.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => render_yaml(data)?,
        OutputFormat::Plain => id_fn(data),
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Status line on stderr, silenced by `--quiet`.
pub fn notice(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Validation {
        field: "output".into(),
        reason: format!("YAML rendering failed: {e}"),
    })
}

/// Aligned `Label: value` lines for detail views.
pub fn detail_lines(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0) + 1;
    pairs
        .iter()
        .map(|(k, v)| {
            let label = format!("{k}:");
            let value = if v.is_empty() { "-" } else { v.as_str() };
            format!("{label:<width$} {value}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        id: u64,
        name: &'static str,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Name")]
        name: String,
    }

    fn items() -> Vec<Item> {
        vec![Item { id: 1, name: "North" }, Item { id: 2, name: "South" }]
    }

    fn render(format: &OutputFormat) -> String {
        render_list(
            format,
            &items(),
            |i| ItemRow {
                id: i.id,
                name: i.name.into(),
            },
            |i| i.id.to_string(),
        )
        .unwrap()
    }

    #[test]
    fn list_formats() {
        assert_eq!(render(&OutputFormat::Plain), "1\n2");
        assert_eq!(
            render(&OutputFormat::JsonCompact),
            r#"[{"id":1,"name":"North"},{"id":2,"name":"South"}]"#
        );
        let table = render(&OutputFormat::Table);
        assert!(table.contains("Name") && table.contains("South"));
        assert!(render(&OutputFormat::Yaml).contains("name: North"));
    }

    #[test]
    fn detail_lines_align_and_fill_blanks() {
        let out = detail_lines(&[("ID", "7".into()), ("Location", String::new())]);
        assert_eq!(out, "ID:       7\nLocation: -");
    }

    #[test]
    fn status_is_plain_without_color() {
        assert_eq!(paint_status("online", false), "online");
        assert_ne!(paint_status("online", true), "online");
    }
}
