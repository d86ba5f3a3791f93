use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{IntensityStats, ResultRow, RtProjection};

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the measurement engine's results table. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – one row per (file, target), engine column names as header
/// * `.json`    – `[{ "msFile": ..., "peakLabel": ..., "peakArea": ... }, ...]`
/// * `.parquet` – same columns; any numeric column type is accepted
pub fn load_results(path: &Path) -> Result<Vec<ResultRow>> {
    let rows = match extension(path).as_str() {
        "csv" => load_results_csv(path),
        "json" => load_results_json(path),
        "parquet" | "pq" => load_results_parquet(path),
        other => bail!("Unsupported results file extension: .{other}"),
    }?;
    log::info!("Loaded {} result rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load retention-time projections. Dispatch by extension.
///
/// * `.json` – `{ "<target>": { "<file>": [[rt, intensity], ...] } }`
/// * `.csv`  – long format with columns `peakLabel, msFile, retentionTime, intensity`
pub fn load_projections(path: &Path) -> Result<RtProjection> {
    let projection = match extension(path).as_str() {
        "json" => load_projections_json(path),
        "csv" => load_projections_csv(path),
        other => bail!("Unsupported projection file extension: .{other}"),
    }?;
    log::info!(
        "Loaded projections for {} targets from {}",
        projection.labels().len(),
        path.display()
    );
    Ok(projection)
}

// ---------------------------------------------------------------------------
// Results: CSV / JSON
// ---------------------------------------------------------------------------

fn load_results_csv(path: &Path) -> Result<Vec<ResultRow>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    reader
        .deserialize::<ResultRow>()
        .enumerate()
        .map(|(row_no, rec)| rec.with_context(|| format!("CSV row {row_no}")))
        .collect()
}

fn load_results_json(path: &Path) -> Result<Vec<ResultRow>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    serde_json::from_str(&text).context("parsing JSON results (expected an array of records)")
}

// ---------------------------------------------------------------------------
// Results: Parquet
// ---------------------------------------------------------------------------

fn load_results_parquet(path: &Path) -> Result<Vec<ResultRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let n = batch.num_rows();

        let ms_file = string_column(&batch, "msFile", true)?;
        let peak_label = string_column(&batch, "peakLabel", true)?;
        let peak_area = float_column(&batch, "peakArea", true)?;
        let rt_max = float_column(&batch, "rt_max_intensity", true)?;
        let i_median = float_column(&batch, "intensity_median", false)?;
        let i_max = float_column(&batch, "intensity_max", false)?;
        let i_min = float_column(&batch, "intensity_min", false)?;
        let i_sum = float_column(&batch, "intensity sum", false)?;
        let size = float_column(&batch, "fileSize[MB]", false)?;
        let peak_list = string_column(&batch, "peakListFile", false)?;
        let mz = float_column(&batch, "peakMz", false)?;
        let mz_width = float_column(&batch, "peakMzWidth[ppm]", false)?;
        let rt_min = float_column(&batch, "rtmin", false)?;
        let rt_max_window = float_column(&batch, "rtmax", false)?;

        for i in 0..n {
            rows.push(ResultRow {
                ms_file: ms_file[i].clone(),
                peak_label: peak_label[i].clone(),
                peak_area: peak_area[i],
                rt_max_intensity: rt_max[i],
                intensity: IntensityStats {
                    median: i_median[i],
                    max: i_max[i],
                    min: i_min[i],
                    sum: i_sum[i],
                },
                file_size_mb: size[i],
                peak_list_file: peak_list[i].clone(),
                peak_mz: mz[i],
                peak_mz_width_ppm: mz_width[i],
                rt_window: (rt_min[i], rt_max_window[i]),
            });
        }
    }
    Ok(rows)
}

// -- Parquet / Arrow helpers --

/// Column `name` cast to `to`, or `None` if the batch lacks it.
fn column_as(batch: &RecordBatch, name: &str, to: &DataType) -> Result<Option<ArrayRef>> {
    let Some(col) = batch.column_by_name(name) else {
        return Ok(None);
    };
    let casted = cast(col.as_ref(), to)
        .with_context(|| format!("column '{name}' cannot be read as {to:?}"))?;
    Ok(Some(casted))
}

fn check_nulls(col: &dyn Array, name: &str, required: bool) -> Result<()> {
    if required && col.null_count() > 0 {
        bail!("required column '{name}' contains {} null values", col.null_count());
    }
    Ok(())
}

/// Text column; missing optional columns and nulls read as empty strings.
fn string_column(batch: &RecordBatch, name: &str, required: bool) -> Result<Vec<String>> {
    let Some(col) = column_as(batch, name, &DataType::Utf8)? else {
        if required {
            bail!("Parquet file missing '{name}' column");
        }
        return Ok(vec![String::new(); batch.num_rows()]);
    };
    check_nulls(col.as_ref(), name, required)?;
    let arr = col
        .as_any()
        .downcast_ref::<StringArray>()
        .context("expected StringArray")?;
    Ok(arr
        .iter()
        .map(|v| v.map(str::to_string).unwrap_or_default())
        .collect())
}

/// Numeric column as `f64`; missing optional columns and nulls read as `0.0`.
fn float_column(batch: &RecordBatch, name: &str, required: bool) -> Result<Vec<f64>> {
    let Some(col) = column_as(batch, name, &DataType::Float64)? else {
        if required {
            bail!("Parquet file missing '{name}' column");
        }
        return Ok(vec![0.0; batch.num_rows()]);
    };
    check_nulls(col.as_ref(), name, required)?;
    let arr = col
        .as_any()
        .downcast_ref::<Float64Array>()
        .context("expected Float64Array")?;
    Ok(arr.iter().map(|v| v.unwrap_or(0.0)).collect())
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

fn load_projections_json(path: &Path) -> Result<RtProjection> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let mut projection: RtProjection =
        serde_json::from_str(&text).context("parsing JSON projections")?;
    projection.sort_traces();
    Ok(projection)
}

#[derive(Debug, Deserialize)]
struct ProjectionRecord {
    #[serde(rename = "peakLabel")]
    peak_label: String,
    #[serde(rename = "msFile")]
    ms_file: String,
    #[serde(rename = "retentionTime")]
    retention_time: f64,
    intensity: f64,
}

fn load_projections_csv(path: &Path) -> Result<RtProjection> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let mut projection = RtProjection::new();
    for (row_no, rec) in reader.deserialize::<ProjectionRecord>().enumerate() {
        let rec = rec.with_context(|| format!("CSV row {row_no}"))?;
        projection.push_sample(&rec.peak_label, &rec.ms_file, rec.retention_time, rec.intensity);
    }
    Ok(projection)
}
