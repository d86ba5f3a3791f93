use proptest::prelude::*;
use rusty_mint::analysis::cluster::cluster_rows;
use rusty_mint::analysis::matrix::PivotMatrix;
use rusty_mint::analysis::pivot::{pivot, PivotSpec};
use rusty_mint::analysis::prepare_matrix;
use rusty_mint::analysis::transform::{correlate, normalize, transpose};
use rusty_mint::data::labels::derive_label;
use rusty_mint::data::model::{IntensityStats, ResultRow};
use rusty_mint::data::table::build_wide_table;
use rusty_mint::options::MatrixOptions;

fn matrix(values: Vec<Vec<f64>>) -> PivotMatrix {
    let rows = (0..values.len()).map(|i| format!("r{i}")).collect();
    let cols = (0..values[0].len()).map(|j| format!("c{j}")).collect();
    PivotMatrix::new("Label", "peakLabel", rows, cols, values)
}

fn values(lo: f64, hi: f64) -> impl Strategy<Value = Vec<Vec<f64>>> {
    (2usize..9, 3usize..6).prop_flat_map(move |(r, c)| {
        prop::collection::vec(prop::collection::vec(lo..hi, c), r)
    })
}

proptest! {
    #[test]
    fn prop_single_measurements_pivot_to_themselves(areas in values(0.0, 1e6)) {
        let mut results = Vec::new();
        for (i, row) in areas.iter().enumerate() {
            for (j, &area) in row.iter().enumerate() {
                results.push(ResultRow {
                    ms_file: format!("s{i:02}_run.mzXML"),
                    peak_label: format!("t{j:02}"),
                    peak_area: area,
                    rt_max_intensity: 0.0,
                    intensity: IntensityStats::default(),
                    file_size_mb: 0.0,
                    peak_list_file: String::new(),
                    peak_mz: 0.0,
                    peak_mz_width_ppm: 0.0,
                    rt_window: (0.0, 0.0),
                });
            }
        }
        let table = build_wide_table(&results, 0).unwrap();
        let outcome = pivot(&table, &PivotSpec::samples_by_targets("peakArea")).unwrap();
        let m = outcome.matrix().unwrap();
        prop_assert_eq!(m.n_rows(), areas.len());
        for (i, row) in areas.iter().enumerate() {
            for (j, &area) in row.iter().enumerate() {
                prop_assert_eq!(m.get(i, j), area.round_ties_even());
            }
        }
    }

    #[test]
    fn prop_duplicate_measurements_pivot_to_their_mean(
        pairs in prop::collection::vec((0.0..60.0f64, 0.0..60.0f64), 1..8)
    ) {
        let results: Vec<ResultRow> = pairs
            .iter()
            .enumerate()
            .flat_map(|(j, &(a, b))| {
                [("X_1.mzXML", a), ("X_2.mzXML", b)].map(|(file, rt)| ResultRow {
                    ms_file: file.to_string(),
                    peak_label: format!("t{j:02}"),
                    peak_area: 0.0,
                    rt_max_intensity: rt,
                    intensity: IntensityStats::default(),
                    file_size_mb: 0.0,
                    peak_list_file: String::new(),
                    peak_mz: 0.0,
                    peak_mz_width_ppm: 0.0,
                    rt_window: (0.0, 0.0),
                })
            })
            .collect();
        let table = build_wide_table(&results, 0).unwrap();
        let outcome = pivot(&table, &PivotSpec::samples_by_targets("rt_max_intensity")).unwrap();
        let m = outcome.matrix().unwrap();
        prop_assert_eq!(m.n_rows(), 1);
        for (j, &(a, b)) in pairs.iter().enumerate() {
            prop_assert!((m.get(0, j) * 2.0 - (a + b)).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_normalized_columns_peak_at_one(v in values(0.1, 1e4)) {
        let n = normalize(&matrix(v));
        for j in 0..n.n_cols() {
            let max = n.column(j).into_iter().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!((max - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn prop_transpose_is_an_involution(v in values(-1e3, 1e3)) {
        let m = matrix(v);
        prop_assert_eq!(transpose(&transpose(&m)), m);
    }

    #[test]
    fn prop_correlation_is_symmetric_and_bounded(v in values(-1e3, 1e3)) {
        let c = correlate(&matrix(v));
        for i in 0..c.n_rows() {
            let d = c.get(i, i);
            prop_assert!(d == 1.0 || d == 0.0);
            for j in 0..c.n_cols() {
                prop_assert_eq!(c.get(i, j), c.get(j, i));
                prop_assert!((-1.0..=1.0).contains(&c.get(i, j)));
            }
        }
    }

    #[test]
    fn prop_clustering_orders_every_row_once(v in values(-1e3, 1e3)) {
        let m = matrix(v);
        let Ok(first) = cluster_rows(&m) else { return Ok(()) };
        let second = cluster_rows(&m).unwrap();
        prop_assert_eq!(&first, &second);

        let mut order = first.order.clone();
        order.sort_unstable();
        prop_assert_eq!(order, (0..m.n_rows()).collect::<Vec<_>>());
        prop_assert_eq!(first.linkage.merges.len(), m.n_rows() - 1);
    }

    #[test]
    fn prop_clustered_correlation_stays_square(v in values(-1e3, 1e3)) {
        let opts = MatrixOptions { correlated: true, clustered: true, ..Default::default() };
        let Ok(prepared) = prepare_matrix(&matrix(v), &opts, 2000) else { return Ok(()) };
        prop_assert_eq!(&prepared.matrix.row_labels, &prepared.matrix.col_labels);
    }

    #[test]
    fn prop_negative_index_counts_from_the_end(tokens in prop::collection::vec("[a-z0-9]{1,6}", 1..6)) {
        let name = format!("{}.mzML", tokens.join("_"));
        prop_assert_eq!(derive_label(&name, -1), tokens.last().cloned());
        prop_assert_eq!(derive_label(&name, 0), tokens.first().cloned());
        prop_assert_eq!(derive_label(&name, tokens.len() as i64), None);
    }
}
