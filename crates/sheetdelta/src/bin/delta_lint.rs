use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::Value as JsonValue;
use sheetdelta::common::{CellValue, TableSchema};
use sheetdelta::{DataProvider, GeneratedData};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "delta-lint",
    about = "Validate a table schema and, optionally, a saved edit-state blob against it"
)]
struct Cli {
    /// Table schema (YAML; JSON when the file ends in `.json`).
    schema: PathBuf,

    /// Saved overlay state to restore against the schema.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Row count of the base dataset the state was saved for. Inferred from
    /// the highest row the blob mentions when omitted.
    #[arg(long)]
    rows: Option<usize>,

    /// Fail when the restore skips any entry or finds incomplete rows.
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let schema = load_schema(&cli.schema)?;
    println!(
        "{}: ok ({} columns)",
        cli.schema.display(),
        schema.columns.len()
    );

    if let Some(path) = &cli.state {
        check_state(&schema, path, cli.rows, cli.strict)?;
    }
    Ok(())
}

#[cfg(feature = "tracing")]
fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(not(feature = "tracing"))]
fn init_tracing() {}

fn load_schema(path: &Path) -> Result<TableSchema> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading schema {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let schema = if is_json {
        TableSchema::from_json_str(&text)
    } else {
        TableSchema::from_yaml_str(&text)
    }
    .with_context(|| format!("parsing schema {}", path.display()))?;
    schema
        .validate()
        .with_context(|| format!("validating schema {}", path.display()))?;
    Ok(schema)
}

/// One past the highest original row index the blob refers to. Indices with
/// no successor are left out; the restore reports them as skipped.
fn infer_rows(state: &JsonValue) -> usize {
    let edited = state["edited_rows"]
        .as_object()
        .into_iter()
        .flat_map(|rows| rows.keys())
        .filter_map(|k| k.parse::<usize>().ok());
    let deleted = state["deleted_rows"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|d| d.as_u64().map(|d| d as usize));
    edited
        .chain(deleted)
        .filter_map(|row| row.checked_add(1))
        .max()
        .unwrap_or(0)
}

fn check_state(schema: &TableSchema, path: &Path, rows: Option<usize>, strict: bool) -> Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading state {}", path.display()))?;
    let state: JsonValue = serde_json::from_str(&text)
        .with_context(|| format!("parsing state {}", path.display()))?;
    let rows = rows.unwrap_or_else(|| infer_rows(&state));

    let base = GeneratedData::new(rows, |_, _| CellValue::Empty);
    let mut provider = DataProvider::from_schema(base, schema)?;
    let report = provider
        .restore_state_value(&state)
        .with_context(|| format!("restoring state {}", path.display()))?;
    let incomplete = provider
        .overlay()
        .incomplete_rows(provider.columns(), provider.types());

    println!(
        "{}: {} edited cells, {} added rows ({} incomplete), {} deleted rows over {} base rows",
        path.display(),
        report.edited_cells,
        report.added_rows,
        incomplete.len(),
        report.deleted_rows,
        rows
    );
    for reason in &report.skipped {
        println!("  skipped: {reason}");
    }
    for slot in &incomplete {
        println!("  incomplete: added row {slot} is missing a required value");
    }

    if strict && (!report.skipped.is_empty() || !incomplete.is_empty()) {
        bail!(
            "{} skipped entries and {} incomplete rows",
            report.skipped.len(),
            incomplete.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inferred_rows_cover_every_mentioned_row() {
        let state = json!({
            "edited_rows": { "7": {}, "x": {} },
            "added_rows": [],
            "deleted_rows": [2, 9],
        });
        assert_eq!(infer_rows(&state), 10);
        assert_eq!(infer_rows(&json!({})), 0);
    }

    #[test]
    fn largest_index_does_not_overflow() {
        let state = json!({ "deleted_rows": [u64::MAX, 3] });
        assert_eq!(infer_rows(&state), 4);
    }
}
