//! Output formatting: table, JSON, YAML, plain, CSV.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use csv::WriterBuilder;
use owo_colors::{OwoColorize, Stream};
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Apply `--color` to the process-wide owo-colors override.
pub fn apply_color_mode(mode: &ColorMode) {
    match mode {
        ColorMode::Always => owo_colors::set_override(true),
        ColorMode::Never => owo_colors::set_override(false),
        ColorMode::Auto => {
            if !should_color(mode) {
                owo_colors::set_override(false);
            }
        }
    }
}

/// Success line on stderr (`✓ message`).
pub fn success(message: &str, quiet: bool) {
    if quiet {
        return;
    }
    eprintln!(
        "{} {message}",
        "✓".if_supports_color(Stream::Stderr, |t| t.green())
    );
}

/// Warning line on stderr, printed even in quiet mode.
pub fn warn(message: &str) {
    eprintln!(
        "{} {message}",
        "!".if_supports_color(Stream::Stderr, |t| t.yellow())
    );
}

/// Section heading on stderr, used ahead of tables.
pub fn heading(title: &str, quiet: bool) {
    if quiet {
        return;
    }
    eprintln!("{}", title.if_supports_color(Stream::Stderr, |t| t.bold()));
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: builds `R` rows via `to_row`
/// - `json` / `json-compact` / `yaml`: serializes the original data
/// - `plain`: calls `id_fn` on each item, one per line
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
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                return Ok(String::new());
            }
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single item. Table mode uses `detail_fn` for a pre-formatted
/// key/value view.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
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

/// Whether human-facing chatter (headings, menus) belongs on stdout.
pub fn is_table(format: &OutputFormat) -> bool {
    matches!(format, OutputFormat::Table)
}

// ── Format-specific renderers ────────────────────────────────────────

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Serialize(e.to_string()))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Serialize(e.to_string()))
}

// ── CSV export ───────────────────────────────────────────────────────

/// Write `headers` then `rows` to `writer` as CSV.
pub fn write_csv<W, I, S>(writer: W, headers: &[&str], rows: I) -> Result<(), CliError>
where
    W: Write,
    I: IntoIterator<Item = Vec<S>>,
    S: AsRef<str>,
{
    let mut out = WriterBuilder::new().from_writer(writer);
    out.write_record(headers)?;
    for row in rows {
        out.write_record(row.iter().map(AsRef::<str>::as_ref))?;
    }
    out.flush()?;
    Ok(())
}

/// Create `path` and write CSV into it.
pub fn write_csv_file<I, S>(path: &Path, headers: &[&str], rows: I) -> Result<(), CliError>
where
    I: IntoIterator<Item = Vec<S>>,
    S: AsRef<str>,
{
    let file = std::fs::File::create(path)?;
    write_csv(io::BufWriter::new(file), headers, rows)
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        name: String,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "Name")]
        name: String,
    }

    fn items() -> Vec<Item> {
        vec![Item { name: "a".into() }, Item { name: "b".into() }]
    }

    fn render(format: &OutputFormat) -> String {
        render_list(
            format,
            &items(),
            |i| ItemRow {
                name: i.name.clone(),
            },
            |i| i.name.clone(),
        )
        .expect("renders")
    }

    #[test]
    fn plain_is_one_identifier_per_line() {
        assert_eq!(render(&OutputFormat::Plain), "a\nb");
    }

    #[test]
    fn compact_json_is_single_line() {
        assert_eq!(
            render(&OutputFormat::JsonCompact),
            r#"[{"name":"a"},{"name":"b"}]"#
        );
    }

    #[test]
    fn table_has_header_and_rounded_corners() {
        let table = render(&OutputFormat::Table);
        assert!(table.contains("Name"));
        assert!(table.starts_with('╭'));
    }

    #[test]
    fn empty_table_renders_nothing() {
        let out = render_list(
            &OutputFormat::Table,
            &Vec::<Item>::new(),
            |i| ItemRow {
                name: i.name.clone(),
            },
            |i| i.name.clone(),
        )
        .expect("renders");
        assert!(out.is_empty());
    }

    #[test]
    fn csv_quotes_embedded_separators() {
        let mut buf = Vec::new();
        write_csv(
            &mut buf,
            &["Rule", "Actions"],
            vec![vec!["r1", "log=true; count=c1"], vec!["r,2", "-"]],
        )
        .expect("csv");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(
            text,
            "Rule,Actions\nr1,log=true; count=c1\n\"r,2\",-\n"
        );
    }
}
