use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use super::matrix::PivotMatrix;
use crate::data::model::{ResultRow, WideRow, WideTable};
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Pivot axes, value columns and aggregations
// ---------------------------------------------------------------------------

/// Categorical column of the analyst table usable as a pivot axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Derived sample label.
    Label,
    /// Target name.
    PeakLabel,
    /// Sample file.
    MsFile,
}

impl Category {
    pub fn column_name(self) -> &'static str {
        match self {
            Category::Label => "Label",
            Category::PeakLabel => "peakLabel",
            Category::MsFile => "msFile",
        }
    }

    fn key(self, row: &WideRow) -> &str {
        match self {
            Category::Label => &row.label,
            Category::PeakLabel => &row.result.peak_label,
            Category::MsFile => &row.result.ms_file,
        }
    }
}

/// The numeric columns the pivot engine aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationTarget {
    PeakArea,
    RtMaxIntensity,
}

impl AggregationTarget {
    /// `None` for any column that is not a recognized aggregation target.
    pub fn from_column(name: &str) -> Option<Self> {
        match name {
            "peakArea" => Some(AggregationTarget::PeakArea),
            "rt_max_intensity" => Some(AggregationTarget::RtMaxIntensity),
            _ => None,
        }
    }

    pub fn column_name(self) -> &'static str {
        match self {
            AggregationTarget::PeakArea => "peakArea",
            AggregationTarget::RtMaxIntensity => "rt_max_intensity",
        }
    }

    fn value(self, row: &ResultRow) -> f64 {
        match self {
            AggregationTarget::PeakArea => row.peak_area,
            AggregationTarget::RtMaxIntensity => row.rt_max_intensity,
        }
    }

    /// Peak areas are shown as whole counts; retention times keep full precision.
    fn finish(self, v: f64) -> f64 {
        match self {
            AggregationTarget::PeakArea => v.round_ties_even(),
            AggregationTarget::RtMaxIntensity => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    #[default]
    Mean,
    Sum,
    Median,
    Min,
    Max,
}

impl Aggregation {
    pub const ALL: [Aggregation; 5] = [
        Aggregation::Mean,
        Aggregation::Sum,
        Aggregation::Median,
        Aggregation::Min,
        Aggregation::Max,
    ];

    /// Aggregate a non-empty group.
    pub fn apply(self, values: &[f64]) -> f64 {
        debug_assert!(!values.is_empty());
        match self {
            Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Aggregation::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Median => {
                let mut sorted = values.to_vec();
                sorted.sort_by(f64::total_cmp);
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (sorted[mid - 1] + sorted[mid]) / 2.0
                } else {
                    sorted[mid]
                }
            }
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Aggregation::Mean => "mean",
            Aggregation::Sum => "sum",
            Aggregation::Median => "median",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        };
        f.write_str(name)
    }
}

impl FromStr for Aggregation {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Aggregation::ALL
            .into_iter()
            .find(|a| a.to_string() == s)
            .ok_or_else(|| AnalysisError::UnknownOption(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Pivot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PivotSpec {
    pub rows: Category,
    pub columns: Category,
    pub value_column: String,
    pub aggregation: Aggregation,
}

impl PivotSpec {
    /// Sample × target layout used by the analyst table.
    pub fn samples_by_targets(value_column: &str) -> Self {
        PivotSpec {
            rows: Category::Label,
            columns: Category::PeakLabel,
            value_column: value_column.to_string(),
            aggregation: Aggregation::Mean,
        }
    }
}

/// What the pivot engine produced. Callers must check which mode applies.
#[derive(Debug, Clone, PartialEq)]
pub enum PivotOutcome {
    Matrix(PivotMatrix),
    /// The value column is not an aggregation target; the table is returned as is.
    Unpivoted(WideTable),
}

impl PivotOutcome {
    pub fn matrix(&self) -> Option<&PivotMatrix> {
        match self {
            PivotOutcome::Matrix(m) => Some(m),
            PivotOutcome::Unpivoted(_) => None,
        }
    }
}

/// Crosstabulate `table` into a `spec.rows` × `spec.columns` matrix of
/// aggregated `spec.value_column` values.
///
/// Categories are sorted; cells without any measurement are `0.0`.
pub fn pivot(table: &WideTable, spec: &PivotSpec) -> Result<PivotOutcome, AnalysisError> {
    if table.is_empty() {
        return Err(AnalysisError::NoData);
    }
    let Some(target) = AggregationTarget::from_column(&spec.value_column) else {
        log::debug!("'{}' is not an aggregation target; not pivoting", spec.value_column);
        return Ok(PivotOutcome::Unpivoted(table.clone()));
    };

    let mut groups: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    let mut row_keys: BTreeSet<&str> = BTreeSet::new();
    let mut col_keys: BTreeSet<&str> = BTreeSet::new();
    for row in &table.rows {
        let r = spec.rows.key(row);
        let c = spec.columns.key(row);
        row_keys.insert(r);
        col_keys.insert(c);
        groups.entry((r, c)).or_default().push(target.value(&row.result));
    }

    let values = row_keys
        .iter()
        .map(|&r| {
            col_keys
                .iter()
                .map(|&c| match groups.get(&(r, c)) {
                    Some(group) => target.finish(spec.aggregation.apply(group)),
                    None => 0.0,
                })
                .collect()
        })
        .collect();

    let matrix = PivotMatrix::new(
        spec.rows.column_name(),
        spec.columns.column_name(),
        row_keys.iter().map(|s| s.to_string()).collect(),
        col_keys.iter().map(|s| s.to_string()).collect(),
        values,
    );
    log::debug!(
        "pivoted {} rows into {}x{} {} matrix ({})",
        table.len(),
        matrix.n_rows(),
        matrix.n_cols(),
        target.column_name(),
        spec.aggregation
    );
    Ok(PivotOutcome::Matrix(matrix))
}
