use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data::model::{ResultRow, Tabular};

pub const RESULTS_FILE: &str = "results_complete.csv";
pub const SUMMARY_FILE: &str = "peak_area_summary.csv";
pub const METADATA_FILE: &str = "metadata.csv";

/// Write `table` as CSV: string headers, then one record per row.
pub fn write_table<W: io::Write>(table: &dyn Tabular, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.headers()).context("writing header")?;
    for record in table.records() {
        wtr.write_record(record.iter().map(|cell| cell.to_string()))
            .context("writing record")?;
    }
    wtr.flush().context("flushing CSV")?;
    Ok(())
}

pub fn write_table_csv(table: &dyn Tabular, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_table(table, file)
}

/// Write result rows with the measurement engine's column names.
pub fn write_results_csv(rows: &[ResultRow], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        wtr.serialize(row).context("writing result row")?;
    }
    wtr.flush().context("flushing CSV")?;
    Ok(())
}

/// Export a session into `dir`: complete results, the current summary table
/// and a small metadata file. Returns the written paths.
pub fn export_all(dir: &Path, results: &[ResultRow], summary: &dyn Tabular) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let results_path = dir.join(RESULTS_FILE);
    write_results_csv(results, &results_path)?;

    let summary_path = dir.join(SUMMARY_FILE);
    write_table_csv(summary, &summary_path)?;

    let metadata_path = dir.join(METADATA_FILE);
    let mut wtr = csv::Writer::from_path(&metadata_path)
        .with_context(|| format!("creating {}", metadata_path.display()))?;
    let today = chrono::Local::now().date_naive().to_string();
    wtr.write_record(["Version", env!("CARGO_PKG_VERSION")])?;
    wtr.write_record(["Date", today.as_str()])?;
    wtr.flush().context("flushing CSV")?;

    log::info!("Exported {} result rows to {}", results.len(), dir.display());
    Ok(vec![results_path, summary_path, metadata_path])
}
