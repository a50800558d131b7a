//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a serializable value whose table form is a list of rows.
///
/// - `table`: `to_rows` builds `Tabled` rows
/// - `json` / `json-compact` / `yaml`: serializes the original data via serde
/// - `plain`: `to_ids` yields one identifier per line
pub fn render_rows<T, R>(
    format: &OutputFormat,
    data: &T,
    to_rows: impl Fn(&T) -> Vec<R>,
    to_ids: impl Fn(&T) -> Vec<String>,
) -> Result<String, CliError>
where
    T: Serialize + ?Sized,
    R: Tabled,
{
    match format {
        OutputFormat::Table => Ok(render_table(&to_rows(data))),
        OutputFormat::Plain => Ok(to_ids(data).join("\n")),
        structured => render_structured(structured, data),
    }
}

/// Render a single item; the table form is a pre-formatted detail view.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Plain => Ok(id_fn(data)),
        structured => render_structured(structured, data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_structured<T: Serialize + ?Sized>(
    format: &OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        _ => serde_json::to_string_pretty(data)?,
    })
}
