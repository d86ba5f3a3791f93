use std::path::Path;

use rusty_mint::analysis::pivot::{Aggregation, PivotOutcome, PivotSpec};
use rusty_mint::config::ViewerConfig;
use rusty_mint::data::loader::{load_projections, load_results};
use rusty_mint::data::model::Tabular;
use rusty_mint::error::AnalysisError;
use rusty_mint::figure::Figure;
use rusty_mint::options::{HeatmapOptions, TraceOptions};
use rusty_mint::session::{HeatmapRequest, HeatmapView, Session};

/// Columns offered in the value selector.
pub const VALUE_COLUMNS: [&str; 3] = ["peakArea", "rt_max_intensity", "full"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Table,
    Heatmap,
    PeakShapes,
    Ribbon3d,
}

impl View {
    pub const ALL: [View; 4] = [View::Table, View::Heatmap, View::PeakShapes, View::Ribbon3d];

    pub fn title(self) -> &'static str {
        match self {
            View::Table => "Table",
            View::Heatmap => "Heatmap",
            View::PeakShapes => "Peak shapes",
            View::Ribbon3d => "3D peak view",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub session: Session,

    pub view: View,
    pub value_column: String,
    pub aggregation: Aggregation,
    pub split_index: i64,
    pub heatmap_options: HeatmapOptions,
    pub trace_options: TraceOptions,
    pub trace_columns: usize,
    pub max_cluster_rows: usize,

    /// Target shown in the 3D peak view.
    pub selected_peak: Option<String>,

    /// Derived views, rebuilt by [`AppState::refresh`].
    pub table: Option<PivotOutcome>,
    pub heatmap: Option<HeatmapView>,
    pub trace_grid: Option<Figure>,
    pub ribbon: Option<Figure>,

    /// Outcome of the last load, export or refresh; cleared on every refresh.
    pub status_message: Option<String>,
    /// Problem with the configuration file, shown for the whole session.
    pub config_warning: Option<String>,
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        let aggregation = config.aggregation.parse().unwrap_or_else(|e| {
            log::warn!("{e}; using the mean");
            Aggregation::Mean
        });
        Self {
            session: Session::default(),
            view: View::Table,
            value_column: config.value_column,
            aggregation,
            split_index: config.label_split_index,
            heatmap_options: HeatmapOptions::default(),
            trace_options: TraceOptions::default(),
            trace_columns: config.trace_columns.max(1),
            max_cluster_rows: config.max_cluster_rows,
            selected_peak: None,
            table: None,
            heatmap: None,
            trace_grid: None,
            ribbon: None,
            status_message: None,
            config_warning: None,
        }
    }

    pub fn has_results(&self) -> bool {
        !self.session.results().is_empty()
    }

    pub fn load_results_file(&mut self, path: &Path) {
        match load_results(path) {
            Ok(rows) => {
                self.session.set_results(rows);
                self.refresh();
            }
            Err(e) => {
                log::error!("Failed to load results: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn load_projections_file(&mut self, path: &Path) {
        match load_projections(path) {
            Ok(projection) => {
                if self.selected_peak.is_none() {
                    self.selected_peak = projection.labels().into_iter().next();
                }
                self.session.set_projections(projection);
                self.refresh();
            }
            Err(e) => {
                log::error!("Failed to load projections: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Recompute every derived view from the session and the current options.
    pub fn refresh(&mut self) {
        self.table = None;
        self.heatmap = None;
        self.status_message = None;
        let mut problem = None;

        if self.has_results() {
            let spec = PivotSpec {
                aggregation: self.aggregation,
                ..PivotSpec::samples_by_targets(&self.value_column)
            };
            match self.session.table_view(self.split_index, &spec) {
                Ok(table) => self.table = Some(table),
                Err(e) => problem = Some(e),
            }

            let request = HeatmapRequest {
                split_index: self.split_index,
                value_column: self.value_column.clone(),
                aggregation: self.aggregation,
                options: self.heatmap_options,
                max_cluster_rows: self.max_cluster_rows,
            };
            match self.session.heatmap(&request) {
                Ok(view) => self.heatmap = Some(view),
                // the non-pivoted table simply has no heatmap
                Err(AnalysisError::NoData) => {}
                Err(e) => problem = problem.or(Some(e)),
            }
        }

        self.trace_grid = self.session.trace_grid(self.trace_columns, &self.trace_options);
        self.ribbon = self
            .session
            .ribbon_3d(self.selected_peak.as_deref(), &self.trace_options);

        if let Some(e) = problem {
            log::warn!("{e}");
            self.status_message = Some(e.to_string());
        }
    }

    /// Current analyst table as a generic tabular view.
    pub fn table_view(&self) -> Option<&dyn Tabular> {
        match self.table.as_ref()? {
            PivotOutcome::Matrix(m) => Some(m as &dyn Tabular),
            PivotOutcome::Unpivoted(t) => Some(t as &dyn Tabular),
        }
    }

    pub fn export_to(&mut self, dir: &Path) {
        let Some(summary) = self.table_view() else {
            self.status_message = Some("Nothing to export".to_string());
            return;
        };
        match rusty_mint::export::export_all(dir, self.session.results(), summary) {
            Ok(paths) => {
                self.status_message = Some(format!("Exported {} files to {}", paths.len(), dir.display()));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_mint::data::model::{IntensityStats, ResultRow};

    fn row(ms_file: &str, peak_label: &str, peak_area: f64) -> ResultRow {
        ResultRow {
            ms_file: ms_file.to_string(),
            peak_label: peak_label.to_string(),
            peak_area,
            rt_max_intensity: 1.0,
            intensity: IntensityStats::default(),
            file_size_mb: 0.0,
            peak_list_file: String::new(),
            peak_mz: 0.0,
            peak_mz_width_ppm: 0.0,
            rt_window: (0.0, 0.0),
        }
    }

    fn state_with_constant_target() -> AppState {
        let mut state = AppState::new(ViewerConfig::default());
        state.session.set_results(vec![
            row("S1_a.mzXML", "A", 1.0),
            row("S1_a.mzXML", "B", 5.0),
            row("S2_a.mzXML", "A", 3.0),
            row("S2_a.mzXML", "B", 5.0),
            row("S3_a.mzXML", "A", 8.0),
            row("S3_a.mzXML", "B", 5.0),
        ]);
        state
    }

    #[test]
    fn status_clears_once_the_problem_is_gone() {
        let mut state = state_with_constant_target();
        state.heatmap_options.matrix.clustered = true;
        state.refresh();
        assert!(state.heatmap.is_none());
        let msg = state.status_message.clone().unwrap();
        assert!(msg.contains("zero variance"), "{msg}");

        state.heatmap_options.matrix.clustered = false;
        state.refresh();
        assert!(state.heatmap.is_some());
        assert_eq!(state.status_message, None);
    }

    #[test]
    fn export_notice_does_not_outlive_the_next_refresh() {
        let mut state = state_with_constant_target();
        state.refresh();
        let dir = tempfile::tempdir().unwrap();
        state.export_to(dir.path());
        assert!(state.status_message.as_deref().unwrap().starts_with("Exported 3 files"));

        state.config_warning = Some("Configuration ignored".to_string());
        state.refresh();
        assert_eq!(state.status_message, None);
        assert_eq!(state.config_warning.as_deref(), Some("Configuration ignored"));
    }
}
