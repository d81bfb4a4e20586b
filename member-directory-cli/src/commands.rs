//! Subcommand handlers.
//!
//! Each handler finishes all fallible work in memory before touching the
//! destination file, so a failed run never leaves a partial CSV behind.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use member_directory::{spreadsheet, write_grid, ExportPolicy, Exporter, Table};
use slog::{info, warn, Logger};

use crate::args::Commands;

/// Dispatches a parsed subcommand.
pub fn run(command: Commands, logger: &Logger) -> Result<()> {
    match command {
        Commands::Extract {
            workbook,
            output,
            sheet,
        } => extract(&workbook, &output, &sheet, logger),
        Commands::Publish {
            input,
            output,
            policy,
        } => publish(&input, &output, policy.as_deref(), logger),
    }
}

fn extract(workbook: &Path, output: &Path, sheet: &str, logger: &Logger) -> Result<()> {
    if !workbook.exists() {
        bail!("workbook not found: {}", workbook.display());
    }

    let grid = spreadsheet::extract_sheet(workbook, sheet, logger)
        .with_context(|| format!("extracting '{}'", workbook.display()))?;

    let mut bytes = Vec::new();
    write_grid(&grid.rows, &mut bytes)?;
    fs::write(output, &bytes).with_context(|| format!("writing '{}'", output.display()))?;

    info!(logger, "sheet exported";
        "rows" => grid.rows.len(),
        "columns" => grid.width(),
        "linked_cells" => grid.linked_cells,
        "sheet" => &grid.name,
        "path" => %output.display());
    Ok(())
}

fn publish(input: &Path, output: &Path, policy: Option<&Path>, logger: &Logger) -> Result<()> {
    if !input.exists() {
        bail!("input file not found: {}", input.display());
    }

    let policy = match policy {
        Some(path) => ExportPolicy::from_json_path(path)
            .with_context(|| format!("loading policy '{}'", path.display()))?,
        None => ExportPolicy::default(),
    };

    let table = Table::read_path(input).with_context(|| format!("reading '{}'", input.display()))?;
    info!(logger, "member table read";
        "path" => %input.display(),
        "encoding" => table.encoding().as_str(),
        "rows" => table.rows().len());

    let export = Exporter::new(policy)
        .with_logger(logger.clone())
        .run(&table)?;
    let bytes = export.to_csv_bytes()?;
    fs::write(output, &bytes).with_context(|| format!("writing '{}'", output.display()))?;

    info!(logger, "public feed written";
        "path" => %output.display(),
        "kib" => format!("{:.1}", bytes.len() as f64 / 1024.0));
    warn!(logger, "the source file must never be published";
        "source" => %input.display());
    Ok(())
}
