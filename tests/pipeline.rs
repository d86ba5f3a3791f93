use rusty_mint::analysis::pivot::{pivot, Aggregation, Category, PivotOutcome, PivotSpec};
use rusty_mint::data::loader::load_results;
use rusty_mint::data::model::{IntensityStats, LabelScheme, ResultRow, RtProjection};
use rusty_mint::error::AnalysisError;
use rusty_mint::export::{export_all, METADATA_FILE, RESULTS_FILE, SUMMARY_FILE};
use rusty_mint::figure::{Arrangement, AxisCoords, Trace};
use rusty_mint::options::{HeatmapOptions, TraceOptions};
use rusty_mint::session::{HeatmapRequest, Session};

fn row(ms_file: &str, peak_label: &str, peak_area: f64, rt_max_intensity: f64) -> ResultRow {
    ResultRow {
        ms_file: ms_file.to_string(),
        peak_label: peak_label.to_string(),
        peak_area,
        rt_max_intensity,
        intensity: IntensityStats::default(),
        file_size_mb: 0.0,
        peak_list_file: String::new(),
        peak_mz: 0.0,
        peak_mz_width_ppm: 0.0,
        rt_window: (0.0, 0.0),
    }
}

fn request(value_column: &str, flags: &[&str]) -> HeatmapRequest {
    HeatmapRequest {
        split_index: 0,
        value_column: value_column.to_string(),
        aggregation: Aggregation::Mean,
        options: HeatmapOptions::from_flags(flags.iter().copied()).unwrap(),
        max_cluster_rows: 2000,
    }
}

/// Four samples in two obvious groups over three targets.
fn grouped_session() -> Session {
    let values = [
        ("S1", [1.0, 10.0, 100.0]),
        ("S2", [2.0, 12.0, 90.0]),
        ("S3", [10.0, 1.0, 5.0]),
        ("S4", [11.0, 2.0, 7.0]),
    ];
    let mut results = Vec::new();
    for (sample, areas) in values {
        for (target, area) in ["A", "B", "C"].into_iter().zip(areas) {
            results.push(row(&format!("/runs/{sample}_x.mzXML"), target, area, 1.0));
        }
    }
    Session::new(results, None)
}

#[test]
fn pivot_two_samples_by_two_targets() {
    let session = Session::new(
        vec![
            row("X_1.mzXML", "A", 10.0, 1.0),
            row("X_1.mzXML", "B", 30.0, 1.0),
            row("Y_1.mzXML", "A", 20.0, 1.0),
            row("Y_1.mzXML", "B", 5.0, 1.0),
        ],
        None,
    );
    let outcome = session
        .table_view(0, &PivotSpec::samples_by_targets("peakArea"))
        .unwrap();
    let m = outcome.matrix().unwrap();
    assert_eq!(m.row_labels, vec!["X", "Y"]);
    assert_eq!(m.col_labels, vec!["A", "B"]);
    assert_eq!(m.rows(), &[vec![10.0, 30.0], vec![20.0, 5.0]]);
}

#[test]
fn pivot_targets_by_samples() {
    let session = Session::new(
        vec![
            row("A_1.mzXML", "X", 10.0, 1.0),
            row("A_1.mzXML", "Y", 20.0, 1.0),
            row("B_1.mzXML", "X", 30.0, 1.0),
            row("B_1.mzXML", "Y", 5.0, 1.0),
        ],
        None,
    );
    let spec = PivotSpec {
        rows: Category::PeakLabel,
        columns: Category::Label,
        value_column: "peakArea".to_string(),
        aggregation: Aggregation::Mean,
    };
    let outcome = pivot(&session.wide_table(0).unwrap(), &spec).unwrap();
    let m = outcome.matrix().unwrap();
    assert_eq!(m.index_name, "peakLabel");
    assert_eq!(m.row_labels, vec!["X", "Y"]);
    assert_eq!(m.col_labels, vec!["A", "B"]);
    assert_eq!(m.rows(), &[vec![10.0, 30.0], vec![20.0, 5.0]]);
}

#[test]
fn duplicate_cells_are_averaged_and_rounded_half_to_even() {
    let session = Session::new(
        vec![
            row("X_1.mzXML", "A", 2.0, 1.0),
            row("X_2.mzXML", "A", 3.0, 2.0),
            row("X_1.mzXML", "B", 3.0, 1.0),
            row("X_2.mzXML", "B", 4.0, 1.0),
            row("Y_1.mzXML", "A", 7.0, 1.0),
        ],
        None,
    );
    let areas = session
        .table_view(0, &PivotSpec::samples_by_targets("peakArea"))
        .unwrap();
    let m = areas.matrix().unwrap();
    assert_eq!(m.rows(), &[vec![2.0, 4.0], vec![7.0, 0.0]]);

    let times = session
        .table_view(0, &PivotSpec::samples_by_targets("rt_max_intensity"))
        .unwrap();
    assert_eq!(times.matrix().unwrap().get(0, 0), 1.5);
}

#[test]
fn labels_fall_back_to_file_names_when_any_file_lacks_the_token() {
    let session = Session::new(
        vec![
            row("sampleset_Liver_03.mzXML", "A", 1.0, 1.0),
            row("blank.mzXML", "A", 2.0, 1.0),
        ],
        None,
    );
    let table = session.wide_table(1).unwrap();
    assert_eq!(table.label_scheme, LabelScheme::FileName);
    let labels: Vec<_> = table.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["sampleset_Liver_03.mzXML", "blank.mzXML"]);

    let derived = Session::new(vec![row("sampleset_Liver_03.mzXML", "A", 1.0, 1.0)], None);
    assert_eq!(derived.wide_table(1).unwrap().rows[0].label, "Liver");
    assert_eq!(derived.wide_table(-1).unwrap().rows[0].label, "03");
}

#[test]
fn non_aggregated_column_keeps_the_wide_table_and_has_no_heatmap() {
    let session = grouped_session();
    let outcome = session
        .table_view(0, &PivotSpec::samples_by_targets("full"))
        .unwrap();
    assert!(matches!(outcome, PivotOutcome::Unpivoted(ref t) if t.len() == 12));
    assert!(matches!(session.heatmap(&request("full", &[])), Err(AnalysisError::NoData)));
}

#[test]
fn empty_session_has_no_views() {
    let session = Session::default();
    assert!(matches!(session.heatmap(&request("peakArea", &[])), Err(AnalysisError::NoData)));
    assert!(matches!(session.wide_table(0), Err(AnalysisError::NoData)));
    assert!(session.trace_grid(4, &TraceOptions::default()).is_none());
    assert!(session.ribbon_3d(Some("A"), &TraceOptions::default()).is_none());
}

#[test]
fn plain_heatmap_is_a_single_panel() {
    let view = grouped_session().heatmap(&request("peakArea", &["legend"])).unwrap();
    assert_eq!(view.figure.title, "Heatmap of peakArea");
    assert_eq!(view.figure.arrangement, Arrangement::Single);
    assert_eq!(view.figure.height, 800);
    assert!(view.figure.legend.visible);
    assert_eq!(view.matrix.row_labels, vec!["S1", "S2", "S3", "S4"]);
}

#[test]
fn clustered_heatmap_with_dendrogram_shares_the_row_axis() {
    let view = grouped_session()
        .heatmap(&request("peakArea", &["clustered", "dendrogram"]))
        .unwrap();
    let fig = &view.figure;
    assert_eq!(fig.title, "Heatmap of clustered peakArea");
    assert_eq!(fig.arrangement, Arrangement::SharedY);
    assert_eq!(fig.panels.len(), 2);
    assert_eq!(fig.panels[0].domain, [0.0, 0.1]);
    assert_eq!(fig.panels[1].domain, [0.11, 1.0]);

    // 3 merges for 4 leaves
    assert_eq!(fig.panels[0].traces.len(), 3);

    let heatmap_panel = &fig.panels[1];
    assert_eq!(heatmap_panel.y_axis.tick_vals, Some(vec![5.0, 15.0, 25.0, 35.0]));
    assert_eq!(heatmap_panel.y_axis.tick_text.as_ref(), Some(&view.matrix.row_labels));
    let Trace::Heatmap(h) = &heatmap_panel.traces[0] else {
        panic!("expected a heatmap trace");
    };
    assert_eq!(h.y, AxisCoords::Positions(vec![5.0, 15.0, 25.0, 35.0]));

    let pos = |label: &str| view.matrix.row_labels.iter().position(|l| l == label).unwrap();
    assert_eq!(pos("S1").abs_diff(pos("S2")), 1);
    assert_eq!(pos("S3").abs_diff(pos("S4")), 1);
}

#[test]
fn clustered_correlation_keeps_rows_and_columns_aligned() {
    let view = grouped_session()
        .heatmap(&request("peakArea", &["transposed", "corr", "clustered"]))
        .unwrap();
    assert_eq!(view.figure.title, "Correlation of transposed,clustered peakArea");
    assert_eq!(view.matrix.row_labels, view.matrix.col_labels);
    for i in 0..view.matrix.n_rows() {
        assert_eq!(view.matrix.get(i, i), 1.0);
    }
}

#[test]
fn cluster_limit_is_enforced() {
    let mut req = request("peakArea", &["clustered"]);
    req.max_cluster_rows = 3;
    let err = grouped_session().heatmap(&req).unwrap_err();
    assert!(matches!(err, AnalysisError::ClusterLimitExceeded { rows: 4, limit: 3 }));
}

#[test]
fn trace_grid_has_one_panel_per_target_and_one_legend_entry_per_file() {
    let mut projection = RtProjection::new();
    for label in ["L1", "L2", "L3", "L4", "L5"] {
        projection.insert(label, "/d/a.mzXML", vec![(1.0, 1.0), (2.0, 4.0)]);
    }
    projection.insert("L3", "/d/b.mzXML", vec![(1.0, 2.0), (2.0, 3.0)]);
    let session = Session::new(Vec::new(), Some(projection));

    let fig = session.trace_grid(2, &TraceOptions::default()).unwrap();
    assert_eq!(fig.arrangement, Arrangement::Grid { rows: 3, cols: 2 });
    assert_eq!(fig.panels.len(), 5);
    assert_eq!(fig.height, 1000);

    let legend_entries: Vec<&str> = fig
        .traces()
        .filter_map(|t| match t {
            Trace::Line(l) if l.show_legend => Some(l.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(legend_entries, vec!["a.mzXML", "b.mzXML"]);

    let ribbon = session.ribbon_3d(Some("L3"), &TraceOptions::default()).unwrap();
    assert_eq!(ribbon.traces().count(), 2);
    assert!(session.ribbon_3d(None, &TraceOptions::default()).is_none());
    assert!(session.ribbon_3d(Some("missing"), &TraceOptions::default()).is_none());
}

#[test]
fn export_writes_reloadable_results() {
    let session = grouped_session();
    let summary = session
        .table_view(0, &PivotSpec::samples_by_targets("peakArea"))
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let paths = export_all(dir.path(), session.results(), summary.matrix().unwrap()).unwrap();
    assert_eq!(paths.len(), 3);
    for name in [RESULTS_FILE, SUMMARY_FILE, METADATA_FILE] {
        assert!(dir.path().join(name).exists(), "{name} missing");
    }

    let reloaded = load_results(&dir.path().join(RESULTS_FILE)).unwrap();
    assert_eq!(reloaded, session.results());

    let summary_text = std::fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
    assert!(summary_text.starts_with("Label,A,B,C\nS1,1,10,100\n"));
}
