use std::collections::HashSet;

use super::{Arrangement, Axis, Figure, GridCell, Legend, Line3dTrace, LineTrace, Orientation, Panel, Trace};
use crate::color::{cyclic, PAIRED, PLOTLY};
use crate::data::model::RtProjection;
use crate::data::table::basename;
use crate::options::TraceOptions;

/// Figure height per target label in the peak-shape grid.
pub const TRACE_ROW_HEIGHT: u32 = 200;
pub const RIBBON_HEIGHT: u32 = 800;

/// `(rows, cols)` of a grid holding `n_panels` panels in `n_cols` columns.
pub fn grid_shape(n_panels: usize, n_cols: usize) -> (usize, usize) {
    let cols = n_cols.max(1);
    (n_panels.div_ceil(cols), cols)
}

/// Peak shapes of every target: one panel per target label, one line per
/// sample file.
///
/// Files are coloured by their position among all files of the projection and
/// appear in the legend once, on the first panel that shows them. Returns
/// `None` while there is nothing to show.
pub fn compose_trace_grid(
    projection: Option<&RtProjection>,
    n_cols: usize,
    opts: &TraceOptions,
) -> Option<Figure> {
    let projection = projection.filter(|p| !p.is_empty())?;
    let labels = projection.labels();
    let files = projection.files();
    let (rows, cols) = grid_shape(labels.len(), n_cols);

    let mut in_legend: HashSet<&str> = HashSet::new();
    let panels = labels
        .iter()
        .enumerate()
        .map(|(label_i, label)| {
            let traces = files
                .iter()
                .enumerate()
                .filter_map(|(file_i, file)| {
                    let trace = projection.get(label, file)?;
                    Some(Trace::Line(LineTrace {
                        name: basename(file).to_string(),
                        x: trace.iter().map(|(rt, _)| *rt).collect(),
                        y: trace.iter().map(|(_, i)| *i).collect(),
                        color: cyclic(&PAIRED, file_i),
                        legend_group: Some(file.clone()),
                        show_legend: in_legend.insert(file.as_str()),
                        hover_text: Some(file.clone()),
                    }))
                })
                .collect();
            Panel {
                title: Some(label.clone()),
                domain: [0.0, 1.0],
                cell: Some(GridCell {
                    row: label_i / cols,
                    col: label_i % cols,
                }),
                x_axis: Axis::titled("Retention Time"),
                y_axis: Axis::titled("Intensity"),
                traces,
            }
        })
        .collect();

    log::info!(
        "composed peak-shape grid: {} targets x {} files in {rows}x{cols}",
        labels.len(),
        files.len()
    );
    Some(Figure {
        title: "Peak Shapes".to_string(),
        height: TRACE_ROW_HEIGHT * labels.len() as u32,
        arrangement: Arrangement::Grid { rows, cols },
        panels,
        legend: Legend {
            visible: opts.show_legend,
            orientation: Orientation::horizontal_if(opts.legend_horizontal),
        },
        hover_closest: false,
    })
}

/// 3D view of one target: for every file a line through
/// (retention time, peak area, intensity), where peak area is the file's
/// summed intensity and so constant along its line.
///
/// Returns `None` without a selection or without traces for it.
pub fn compose_ribbon_3d(
    projection: Option<&RtProjection>,
    label: Option<&str>,
    opts: &TraceOptions,
) -> Option<Figure> {
    let label = label?;
    let Some(per_file) = projection.and_then(|p| p.for_label(label)) else {
        log::warn!("no retention-time projection for '{label}'");
        return None;
    };
    if per_file.is_empty() {
        return None;
    }

    let traces = per_file
        .iter()
        .enumerate()
        .map(|(i, (file, trace))| {
            let area: f64 = trace.iter().map(|(_, intensity)| intensity).sum();
            Trace::Line3d(Line3dTrace {
                name: basename(file).to_string(),
                x: trace.iter().map(|(rt, _)| *rt).collect(),
                y: vec![area; trace.len()],
                z: trace.iter().map(|(_, intensity)| *intensity).collect(),
                color: cyclic(&PLOTLY, i),
            })
        })
        .collect();

    Some(Figure {
        title: label.to_string(),
        height: RIBBON_HEIGHT,
        arrangement: Arrangement::Single,
        panels: vec![Panel {
            x_axis: Axis::titled("retentionTime"),
            y_axis: Axis::titled("peakArea"),
            ..Panel::full_width(traces)
        }],
        legend: Legend {
            visible: opts.show_legend,
            orientation: Orientation::horizontal_if(opts.legend_horizontal),
        },
        hover_closest: false,
    })
}
