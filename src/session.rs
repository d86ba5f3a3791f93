use crate::analysis::matrix::PivotMatrix;
use crate::analysis::pivot::{pivot, Aggregation, PivotOutcome, PivotSpec};
use crate::analysis::prepare_matrix;
use crate::data::model::{ResultRow, RtProjection, WideTable};
use crate::data::table::build_wide_table;
use crate::error::AnalysisError;
use crate::figure::heatmap::compose_heatmap;
use crate::figure::traces::{compose_ribbon_3d, compose_trace_grid};
use crate::figure::Figure;
use crate::options::{HeatmapOptions, TraceOptions};

// ---------------------------------------------------------------------------
// Session – the inputs of one analysis
// ---------------------------------------------------------------------------

/// Results and projections of the current analysis.
///
/// Every operation reads the session and returns freshly computed values; a
/// session never caches derived matrices or figures.
#[derive(Debug, Clone, Default)]
pub struct Session {
    results: Vec<ResultRow>,
    projections: Option<RtProjection>,
}

/// Everything needed to go from results to a heatmap.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapRequest {
    pub split_index: i64,
    pub value_column: String,
    pub aggregation: Aggregation,
    pub options: HeatmapOptions,
    pub max_cluster_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapView {
    /// Matrix after transforms and reordering, as drawn.
    pub matrix: PivotMatrix,
    pub figure: Figure,
}

impl Session {
    pub fn new(results: Vec<ResultRow>, projections: Option<RtProjection>) -> Self {
        Session {
            results,
            projections,
        }
    }

    pub fn results(&self) -> &[ResultRow] {
        &self.results
    }

    pub fn projections(&self) -> Option<&RtProjection> {
        self.projections.as_ref()
    }

    pub fn set_results(&mut self, results: Vec<ResultRow>) {
        self.results = results;
    }

    pub fn set_projections(&mut self, projections: RtProjection) {
        self.projections = Some(projections);
    }

    pub fn wide_table(&self, split_index: i64) -> Result<WideTable, AnalysisError> {
        build_wide_table(&self.results, split_index)
    }

    /// Analyst table: pivoted for aggregation targets, the wide table otherwise.
    pub fn table_view(&self, split_index: i64, spec: &PivotSpec) -> Result<PivotOutcome, AnalysisError> {
        pivot(&self.wide_table(split_index)?, spec)
    }

    /// Table → pivot (samples × targets) → transforms → clustering → figure.
    ///
    /// A value column that does not pivot has no heatmap and reports `NoData`.
    pub fn heatmap(&self, request: &HeatmapRequest) -> Result<HeatmapView, AnalysisError> {
        let spec = PivotSpec {
            aggregation: request.aggregation,
            ..PivotSpec::samples_by_targets(&request.value_column)
        };
        let PivotOutcome::Matrix(pivoted) = self.table_view(request.split_index, &spec)? else {
            return Err(AnalysisError::NoData);
        };

        let prepared = prepare_matrix(&pivoted, &request.options.matrix, request.max_cluster_rows)?;
        let figure = compose_heatmap(
            &prepared.matrix,
            prepared.clustering.as_ref(),
            &request.options,
            &request.value_column,
        )?;
        Ok(HeatmapView {
            matrix: prepared.matrix,
            figure,
        })
    }

    pub fn trace_grid(&self, n_cols: usize, opts: &TraceOptions) -> Option<Figure> {
        compose_trace_grid(self.projections(), n_cols, opts)
    }

    pub fn ribbon_3d(&self, label: Option<&str>, opts: &TraceOptions) -> Option<Figure> {
        compose_ribbon_3d(self.projections(), label, opts)
    }
}
