use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CellValue – a single cell of a displayed / exported table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell. Tables are either text-keyed (labels, file
/// names) or numeric (measurements), so two variants plus `Null` suffice.
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Null,
}

/// Equality agrees with [`Ord`]: numbers compare with `total_cmp`, so `NaN`
/// equals itself.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Null < numbers < text, so sorting a mixed column keeps numbers together.
impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Null, _) => std::cmp::Ordering::Less,
            (_, Null) => std::cmp::Ordering::Greater,
            (Number(a), Number(b)) => a.total_cmp(b),
            (Number(_), Text(_)) => std::cmp::Ordering::Less,
            (Text(_), Number(_)) => std::cmp::Ordering::Greater,
            (Text(a), Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// Anything that can be shown as / serialized to a flat table with string headers.
pub trait Tabular {
    fn headers(&self) -> Vec<String>;
    fn records(&self) -> Vec<Vec<CellValue>>;
}

// ---------------------------------------------------------------------------
// ResultRow – one (sample file, target) measurement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IntensityStats {
    pub median: f64,
    pub max: f64,
    pub min: f64,
    pub sum: f64,
}

/// One row of the measurement engine's long-format results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ResultRecord", into = "ResultRecord")]
pub struct ResultRow {
    pub ms_file: String,
    pub peak_label: String,
    pub peak_area: f64,
    pub rt_max_intensity: f64,
    pub intensity: IntensityStats,
    pub file_size_mb: f64,
    pub peak_list_file: String,
    pub peak_mz: f64,
    pub peak_mz_width_ppm: f64,
    pub rt_window: (f64, f64),
}

/// Flat on-disk layout of a [`ResultRow`], column names as written by the
/// measurement engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResultRecord {
    #[serde(rename = "msFile")]
    ms_file: String,
    #[serde(rename = "peakLabel")]
    peak_label: String,
    #[serde(rename = "peakArea")]
    peak_area: f64,
    rt_max_intensity: f64,
    #[serde(default)]
    intensity_median: f64,
    #[serde(default)]
    intensity_max: f64,
    #[serde(default)]
    intensity_min: f64,
    #[serde(rename = "intensity sum", default)]
    intensity_sum: f64,
    #[serde(rename = "fileSize[MB]", default)]
    file_size_mb: f64,
    #[serde(rename = "peakListFile", default)]
    peak_list_file: String,
    #[serde(rename = "peakMz", default)]
    peak_mz: f64,
    #[serde(rename = "peakMzWidth[ppm]", default)]
    peak_mz_width_ppm: f64,
    #[serde(default)]
    rtmin: f64,
    #[serde(default)]
    rtmax: f64,
}

impl From<ResultRecord> for ResultRow {
    fn from(r: ResultRecord) -> Self {
        ResultRow {
            ms_file: r.ms_file,
            peak_label: r.peak_label,
            peak_area: r.peak_area,
            rt_max_intensity: r.rt_max_intensity,
            intensity: IntensityStats {
                median: r.intensity_median,
                max: r.intensity_max,
                min: r.intensity_min,
                sum: r.intensity_sum,
            },
            file_size_mb: r.file_size_mb,
            peak_list_file: r.peak_list_file,
            peak_mz: r.peak_mz,
            peak_mz_width_ppm: r.peak_mz_width_ppm,
            rt_window: (r.rtmin, r.rtmax),
        }
    }
}

impl From<ResultRow> for ResultRecord {
    fn from(r: ResultRow) -> Self {
        ResultRecord {
            ms_file: r.ms_file,
            peak_label: r.peak_label,
            peak_area: r.peak_area,
            rt_max_intensity: r.rt_max_intensity,
            intensity_median: r.intensity.median,
            intensity_max: r.intensity.max,
            intensity_min: r.intensity.min,
            intensity_sum: r.intensity.sum,
            file_size_mb: r.file_size_mb,
            peak_list_file: r.peak_list_file,
            peak_mz: r.peak_mz,
            peak_mz_width_ppm: r.peak_mz_width_ppm,
            rtmin: r.rt_window.0,
            rtmax: r.rt_window.1,
        }
    }
}

// ---------------------------------------------------------------------------
// WideTable – the analyst table
// ---------------------------------------------------------------------------

/// Display columns of the analyst table, in order.
pub const WIDE_COLUMNS: [&str; 16] = [
    "Label",
    "peakLabel",
    "peakArea",
    "rt_max_intensity",
    "intensity_median",
    "intensity_max",
    "intensity_min",
    "msPath",
    "msFile",
    "fileSize[MB]",
    "intensity sum",
    "peakListFile",
    "peakMz",
    "peakMzWidth[ppm]",
    "rtmin",
    "rtmax",
];

/// How the `Label` column of a [`WideTable`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelScheme {
    /// Every label is a token of its file name.
    Derived,
    /// Derivation failed for at least one row; every label is the file name.
    FileName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub label: String,
    /// The sample file as delivered by the measurement engine.
    pub ms_path: String,
    /// Measurement; `ms_file` may have been shortened to its basename.
    pub result: ResultRow,
}

impl WideRow {
    pub fn cell(&self, column: &str) -> Option<CellValue> {
        let r = &self.result;
        let v = match column {
            "Label" => CellValue::Text(self.label.clone()),
            "peakLabel" => CellValue::Text(r.peak_label.clone()),
            "peakArea" => r.peak_area.into(),
            "rt_max_intensity" => r.rt_max_intensity.into(),
            "intensity_median" => r.intensity.median.into(),
            "intensity_max" => r.intensity.max.into(),
            "intensity_min" => r.intensity.min.into(),
            "msPath" => CellValue::Text(self.ms_path.clone()),
            "msFile" => CellValue::Text(r.ms_file.clone()),
            "fileSize[MB]" => r.file_size_mb.into(),
            "intensity sum" => r.intensity.sum.into(),
            "peakListFile" => CellValue::Text(r.peak_list_file.clone()),
            "peakMz" => r.peak_mz.into(),
            "peakMzWidth[ppm]" => r.peak_mz_width_ppm.into(),
            "rtmin" => r.rt_window.0.into(),
            "rtmax" => r.rt_window.1.into(),
            _ => return None,
        };
        Some(v)
    }
}

/// Result rows with a derived sample label, projected to [`WIDE_COLUMNS`].
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    pub rows: Vec<WideRow>,
    pub label_scheme: LabelScheme,
}

impl WideTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted, de-duplicated target labels.
    pub fn peak_labels(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.result.peak_label.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Tabular for WideTable {
    fn headers(&self) -> Vec<String> {
        WIDE_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn records(&self) -> Vec<Vec<CellValue>> {
        self.rows
            .iter()
            .map(|row| {
                WIDE_COLUMNS
                    .iter()
                    .map(|c| row.cell(c).unwrap_or(CellValue::Null))
                    .collect()
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// RtProjection – retention-time traces per target and file
// ---------------------------------------------------------------------------

/// `(retention time, intensity)` samples of one file for one target, ordered by time.
pub type RtTrace = Vec<(f64, f64)>;

/// target label → sample file → trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RtProjection {
    traces: BTreeMap<String, BTreeMap<String, RtTrace>>,
}

impl RtProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: &str, file: &str, mut trace: RtTrace) {
        trace.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.traces
            .entry(label.to_string())
            .or_default()
            .insert(file.to_string(), trace);
    }

    /// Append one sample, keeping the trace ordered by retention time.
    pub fn push_sample(&mut self, label: &str, file: &str, rt: f64, intensity: f64) {
        let trace = self
            .traces
            .entry(label.to_string())
            .or_default()
            .entry(file.to_string())
            .or_default();
        let pos = trace.partition_point(|(t, _)| *t <= rt);
        trace.insert(pos, (rt, intensity));
    }

    pub fn labels(&self) -> Vec<String> {
        self.traces.keys().cloned().collect()
    }

    /// Every sample file observed under any target, sorted.
    pub fn files(&self) -> Vec<String> {
        self.traces
            .values()
            .flat_map(|per_file| per_file.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn for_label(&self, label: &str) -> Option<&BTreeMap<String, RtTrace>> {
        self.traces.get(label)
    }

    pub fn get(&self, label: &str, file: &str) -> Option<&RtTrace> {
        self.traces.get(label)?.get(file)
    }

    pub fn is_empty(&self) -> bool {
        self.traces.values().all(|per_file| per_file.is_empty())
    }

    /// Re-sort every trace by retention time (deserialized input may be unordered).
    pub fn sort_traces(&mut self) {
        for per_file in self.traces.values_mut() {
            for trace in per_file.values_mut() {
                trace.sort_by(|a, b| a.0.total_cmp(&b.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_equality_matches_ordering() {
        let nan = CellValue::Number(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_eq!(nan.cmp(&nan.clone()), std::cmp::Ordering::Equal);
        assert_ne!(CellValue::Number(0.0), CellValue::Number(-0.0));
        assert_ne!(CellValue::Number(1.0), CellValue::Text("1".into()));

        let mut cells = std::collections::BTreeSet::new();
        cells.insert(nan.clone());
        cells.insert(CellValue::Number(f64::NAN));
        assert_eq!(cells.len(), 1);
    }

    #[test]
    fn cell_ordering_puts_numbers_before_text() {
        let mut cells = vec![
            CellValue::Text("b".into()),
            CellValue::Number(2.0),
            CellValue::Null,
            CellValue::Number(-1.0),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                CellValue::Null,
                CellValue::Number(-1.0),
                CellValue::Number(2.0),
                CellValue::Text("b".into()),
            ]
        );
    }

    #[test]
    fn projection_keeps_samples_ordered() {
        let mut p = RtProjection::new();
        p.push_sample("X", "a.mzXML", 2.0, 20.0);
        p.push_sample("X", "a.mzXML", 1.0, 10.0);
        p.push_sample("Y", "b.mzXML", 0.5, 5.0);
        assert_eq!(p.get("X", "a.mzXML").unwrap(), &vec![(1.0, 10.0), (2.0, 20.0)]);
        assert_eq!(p.labels(), vec!["X", "Y"]);
        assert_eq!(p.files(), vec!["a.mzXML", "b.mzXML"]);
        assert!(!p.is_empty());
        assert!(RtProjection::new().is_empty());
    }
}
