use super::{Arrangement, Axis, AxisCoords, Figure, HeatmapTrace, Legend, LineTrace, Orientation, Panel, Trace};
use crate::analysis::cluster::RowClustering;
use crate::analysis::matrix::PivotMatrix;
use crate::color::{Colorscale, DENDROGRAM_LINK};
use crate::error::AnalysisError;
use crate::options::HeatmapOptions;

pub const HEATMAP_HEIGHT: u32 = 800;

/// Horizontal extent of the side dendrogram in the fused layout.
pub const DENDROGRAM_DOMAIN: [f64; 2] = [0.0, 0.1];
/// Horizontal extent of the heatmap in the fused layout.
pub const HEATMAP_DOMAIN: [f64; 2] = [0.11, 1.0];

/// "Heatmap of normalized,clustered peakArea", "Correlation of rt_max_intensity", ...
pub fn heatmap_title(opts: &HeatmapOptions, value_column: &str) -> String {
    let kind = if opts.matrix.correlated {
        "Correlation"
    } else {
        "Heatmap"
    };
    let attributes: Vec<&str> = [
        (opts.matrix.normalized, "normalized"),
        (opts.matrix.transposed, "transposed"),
        (opts.matrix.clustered, "clustered"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();

    if attributes.is_empty() {
        format!("{kind} of {value_column}")
    } else {
        format!("{kind} of {} {value_column}", attributes.join(","))
    }
}

/// Build the heatmap figure for an already transformed (and, if clustering was
/// requested, already reordered) matrix.
///
/// With `opts.fuse_dendrogram()` the figure gets a dendrogram panel left of the
/// heatmap; `clustering` must then be the clustering that produced the row
/// order of `matrix`.
pub fn compose_heatmap(
    matrix: &PivotMatrix,
    clustering: Option<&RowClustering>,
    opts: &HeatmapOptions,
    value_column: &str,
) -> Result<Figure, AnalysisError> {
    if matrix.n_rows() == 0 {
        return Err(AnalysisError::NoData);
    }

    let colorscale = if opts.matrix.correlated {
        Colorscale::correlation()
    } else {
        Colorscale::blues()
    };
    let title = heatmap_title(opts, value_column);
    let heatmap = HeatmapTrace {
        z: matrix.rows().to_vec(),
        x: matrix.col_labels.clone(),
        y: AxisCoords::Categories(matrix.row_labels.clone()),
        colorscale,
    };
    let legend = Legend {
        visible: opts.show_legend,
        orientation: Orientation::horizontal_if(opts.legend_horizontal),
    };

    let clustering = match clustering {
        Some(c) if opts.fuse_dendrogram() => c,
        _ => {
            log::info!("composed heatmap '{title}' ({}x{})", matrix.n_rows(), matrix.n_cols());
            let mut panel = Panel::full_width(vec![Trace::Heatmap(heatmap)]);
            panel.y_axis.title = Some(String::new());
            return Ok(Figure {
                title,
                height: HEATMAP_HEIGHT,
                arrangement: Arrangement::Single,
                panels: vec![panel],
                legend,
                hover_closest: true,
            });
        }
    };

    if clustering.order.len() != matrix.n_rows() {
        return Err(AnalysisError::degenerate(format!(
            "clustering covers {} rows but the matrix has {}",
            clustering.order.len(),
            matrix.n_rows()
        )));
    }

    let dendrogram = clustering.dendrogram();
    let links = dendrogram
        .links
        .iter()
        .map(|link| {
            Trace::Line(LineTrace {
                name: String::new(),
                // leaves face the heatmap on the right
                x: link.heights.iter().map(|h| -h).collect(),
                y: link.positions.to_vec(),
                color: DENDROGRAM_LINK,
                legend_group: None,
                show_legend: false,
                hover_text: None,
            })
        })
        .collect();

    let bare_axis = Axis {
        show_grid: false,
        ..Default::default()
    };
    let dendrogram_panel = Panel {
        title: None,
        domain: DENDROGRAM_DOMAIN,
        cell: None,
        x_axis: Axis {
            show_tick_labels: false,
            show_grid: true,
            ..Default::default()
        },
        y_axis: Axis {
            show_tick_labels: false,
            ..bare_axis.clone()
        },
        traces: links,
    };

    let heatmap = HeatmapTrace {
        y: AxisCoords::Positions(dendrogram.tick_vals.clone()),
        ..heatmap
    };
    let heatmap_panel = Panel {
        title: None,
        domain: HEATMAP_DOMAIN,
        cell: None,
        x_axis: bare_axis.clone(),
        y_axis: Axis {
            tick_vals: Some(dendrogram.tick_vals),
            tick_text: Some(matrix.row_labels.clone()),
            ..bare_axis
        },
        traces: vec![Trace::Heatmap(heatmap)],
    };

    log::info!(
        "composed heatmap '{title}' with dendrogram ({}x{})",
        matrix.n_rows(),
        matrix.n_cols()
    );
    Ok(Figure {
        title,
        height: HEATMAP_HEIGHT,
        arrangement: Arrangement::SharedY,
        panels: vec![dendrogram_panel, heatmap_panel],
        legend: Legend {
            visible: false,
            ..legend
        },
        hover_closest: true,
    })
}
