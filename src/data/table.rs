use std::collections::HashMap;

use super::labels::derive_labels;
use super::model::{ResultRow, WideRow, WideTable};
use crate::error::AnalysisError;

/// Last path component, accepting both `/` and `\` separators.
pub fn basename(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(path)
}

/// Build the analyst table from the measurement engine's results.
///
/// * If any basename occurs on more than one row, every `ms_file` is shortened
///   to its basename.
/// * `Label` is derived from `ms_file` with `split_index` (see
///   [`derive_labels`]); derivation is all-or-nothing for the table.
pub fn build_wide_table(results: &[ResultRow], split_index: i64) -> Result<WideTable, AnalysisError> {
    if results.is_empty() {
        return Err(AnalysisError::NoData);
    }

    let mut basename_counts: HashMap<&str, usize> = HashMap::new();
    for r in results {
        *basename_counts.entry(basename(&r.ms_file)).or_default() += 1;
    }
    let use_basename = basename_counts.values().any(|&n| n > 1);

    let files: Vec<String> = results
        .iter()
        .map(|r| {
            if use_basename {
                basename(&r.ms_file).to_string()
            } else {
                r.ms_file.clone()
            }
        })
        .collect();

    let (labels, label_scheme) = derive_labels(&files, split_index);
    log::debug!(
        "built table of {} rows, basenames={use_basename}, labels={label_scheme:?}",
        results.len()
    );

    let rows = results
        .iter()
        .zip(files)
        .zip(labels)
        .map(|((r, ms_file), label)| WideRow {
            label,
            ms_path: r.ms_file.clone(),
            result: ResultRow {
                ms_file,
                ..r.clone()
            },
        })
        .collect();

    Ok(WideTable { rows, label_scheme })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{IntensityStats, LabelScheme};

    fn row(file: &str, label: &str, area: f64) -> ResultRow {
        ResultRow {
            ms_file: file.to_string(),
            peak_label: label.to_string(),
            peak_area: area,
            rt_max_intensity: 1.0,
            intensity: IntensityStats::default(),
            file_size_mb: 1.0,
            peak_list_file: "targets.csv".to_string(),
            peak_mz: 100.0,
            peak_mz_width_ppm: 10.0,
            rt_window: (0.5, 1.5),
        }
    }

    #[test]
    fn empty_results_signal_no_data() {
        assert!(matches!(build_wide_table(&[], 0), Err(AnalysisError::NoData)));
    }

    #[test]
    fn repeated_basenames_shorten_every_file() {
        let results = vec![
            row("/data/set_A_1.mzXML", "X", 1.0),
            row("/data/set_A_1.mzXML", "Y", 2.0),
            row("/other/set_B_2.mzXML", "X", 3.0),
        ];
        let table = build_wide_table(&results, 1).unwrap();
        assert_eq!(table.label_scheme, LabelScheme::Derived);
        let files: Vec<&str> = table.rows.iter().map(|r| r.result.ms_file.as_str()).collect();
        assert_eq!(files, vec!["set_A_1.mzXML", "set_A_1.mzXML", "set_B_2.mzXML"]);
        assert_eq!(table.rows[2].ms_path, "/other/set_B_2.mzXML");
        let labels: Vec<&str> = table.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "A", "B"]);
    }

    #[test]
    fn distinct_basenames_keep_full_paths() {
        let results = vec![row("C:\\runs\\a_1.mzXML", "X", 1.0), row("/runs/b_2.mzXML", "X", 2.0)];
        let table = build_wide_table(&results, 9).unwrap();
        assert_eq!(table.rows[0].result.ms_file, "C:\\runs\\a_1.mzXML");
        assert_eq!(table.label_scheme, LabelScheme::FileName);
        assert_eq!(table.rows[1].label, "/runs/b_2.mzXML");
    }
}
