use eframe::egui::{self, Color32, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Corner, Legend, Line, Plot, PlotPoint, PlotPoints, PlotUi, Polygon, Text};
use rusty_mint::color::Rgb;
use rusty_mint::figure::{Arrangement, AxisCoords, Figure, HeatmapTrace, LineTrace, Panel, Trace};

use crate::state::{AppState, View};

const NO_DATA: &str = "no data available for this view";

fn color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c.0, c.1, c.2)
}

fn notice(ui: &mut Ui, text: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading(text);
    });
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the active view in the central panel.
pub fn central_view(ui: &mut Ui, state: &AppState) {
    if !state.has_results() && state.session.projections().is_none() {
        notice(ui, "Open a results file to start  (File → Open results…)");
        return;
    }

    match state.view {
        View::Table => table_view(ui, state),
        View::Heatmap => match &state.heatmap {
            Some(view) => figure_view(ui, &view.figure),
            None => notice(ui, NO_DATA),
        },
        View::PeakShapes => match &state.trace_grid {
            Some(fig) => figure_view(ui, fig),
            None => notice(ui, NO_DATA),
        },
        View::Ribbon3d => match &state.ribbon {
            Some(fig) => ribbon_view(ui, fig),
            None => notice(ui, NO_DATA),
        },
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

fn table_view(ui: &mut Ui, state: &AppState) {
    let Some(table) = state.table_view() else {
        notice(ui, NO_DATA);
        return;
    };
    let headers = table.headers();
    let records = table.records();

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(Column::auto().at_least(60.0), headers.len())
            .header(20.0, |mut header| {
                for h in &headers {
                    header.col(|ui: &mut Ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, records.len(), |mut row| {
                    let record = &records[row.index()];
                    for cell in record {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            });
    });
}

// ---------------------------------------------------------------------------
// 2D figures
// ---------------------------------------------------------------------------

fn figure_view(ui: &mut Ui, fig: &Figure) {
    ui.heading(&fig.title);
    match fig.arrangement {
        Arrangement::Single => {
            if let Some(panel) = fig.panels.first() {
                panel_plot(ui, fig, panel, "single", None);
            }
        }
        Arrangement::SharedY => {
            // panels sit side by side according to their x domains
            let width = ui.available_width();
            let height = ui.available_height();
            let link = egui::Id::new("shared_y");
            ui.horizontal(|ui: &mut Ui| {
                ui.spacing_mut().item_spacing.x = 0.0;
                for (i, panel) in fig.panels.iter().enumerate() {
                    let w = width * (panel.domain[1] - panel.domain[0]) as f32;
                    ui.allocate_ui(egui::vec2(w, height), |ui: &mut Ui| {
                        panel_plot(ui, fig, panel, &format!("shared_{i}"), Some(link));
                    });
                }
            });
        }
        Arrangement::Grid { rows, cols } => {
            let row_height = (fig.height as f32 / rows.max(1) as f32).max(150.0);
            egui::ScrollArea::vertical().show(ui, |ui: &mut Ui| {
                for (r, chunk) in fig.panels.chunks(cols.max(1)).enumerate() {
                    ui.columns(cols.max(1), |columns| {
                        for (c, panel) in chunk.iter().enumerate() {
                            let ui = &mut columns[c];
                            ui.label(panel.title.as_deref().unwrap_or_default());
                            ui.allocate_ui(egui::vec2(ui.available_width(), row_height), |ui: &mut Ui| {
                                panel_plot(ui, fig, panel, &format!("grid_{r}_{c}"), None);
                            });
                        }
                    });
                }
            });
        }
    }
}

/// Label of the category at integer position `value`, if any.
fn category_at(labels: &[String], value: f64) -> Option<&str> {
    let i = value.round();
    if (value - i).abs() > 1e-6 || i < 0.0 {
        return None;
    }
    labels.get(i as usize).map(String::as_str)
}

/// Tick text for an explicit tick position.
fn tick_at<'a>(vals: &[f64], text: &'a [String], value: f64) -> Option<&'a str> {
    vals.iter()
        .position(|v| (v - value).abs() < 1e-6)
        .and_then(|i| text.get(i))
        .map(String::as_str)
}

fn panel_plot(ui: &mut Ui, fig: &Figure, panel: &Panel, id: &str, link_y: Option<egui::Id>) {
    let heatmap = panel.traces.iter().find_map(|t| match t {
        Trace::Heatmap(h) => Some(h),
        _ => None,
    });

    let mut plot = Plot::new(id)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show_grid([panel.x_axis.show_grid, panel.y_axis.show_grid]);

    if fig.legend.visible {
        let corner = match fig.legend.orientation {
            rusty_mint::figure::Orientation::Horizontal => Corner::LeftBottom,
            rusty_mint::figure::Orientation::Vertical => Corner::RightTop,
        };
        plot = plot.legend(Legend::default().position(corner));
    }
    if let Some(title) = &panel.x_axis.title {
        plot = plot.x_axis_label(title.clone());
    }
    if let Some(title) = &panel.y_axis.title {
        plot = plot.y_axis_label(title.clone());
    }
    if !panel.x_axis.show_tick_labels {
        plot = plot.show_axes([false, true]);
    }
    if !panel.y_axis.show_tick_labels {
        plot = plot.y_axis_formatter(|_, _| String::new());
    }
    if let Some(group) = link_y {
        plot = plot.link_axis(group, [false, true]).link_cursor(group, [false, true]);
    }

    // Categorical axes of a heatmap show their labels at the cell centres.
    if let Some(h) = heatmap {
        let x_labels = h.x.clone();
        plot = plot.x_axis_formatter(move |mark, _| {
            category_at(&x_labels, mark.value).unwrap_or_default().to_string()
        });
        match (&panel.y_axis.tick_vals, &panel.y_axis.tick_text, &h.y) {
            (Some(vals), Some(text), _) => {
                let (vals, text) = (vals.clone(), text.clone());
                plot = plot.y_axis_formatter(move |mark, _| {
                    tick_at(&vals, &text, mark.value).unwrap_or_default().to_string()
                });
            }
            (_, _, AxisCoords::Categories(labels)) => {
                let labels = labels.clone();
                plot = plot.y_axis_formatter(move |mark, _| {
                    category_at(&labels, mark.value).unwrap_or_default().to_string()
                });
            }
            _ => {}
        }
        let h = h.clone();
        let row_text = panel.y_axis.tick_text.clone();
        plot = plot.label_formatter(move |_, point| heatmap_hover(&h, row_text.as_deref(), point));
    }

    plot.show(ui, |plot_ui| {
        for trace in &panel.traces {
            match trace {
                Trace::Heatmap(h) => draw_heatmap(plot_ui, h),
                Trace::Line(l) => {
                    let points: PlotPoints = l.x.iter().zip(&l.y).map(|(&x, &y)| [x, y]).collect();
                    let mut line = Line::new(points).color(color32(l.color)).width(1.5);
                    if let Some(name) = legend_name(l) {
                        line = line.name(name);
                    }
                    plot_ui.line(line);
                }
                Trace::Line3d(_) => {}
            }
        }
    });
}

/// Only the first trace of a legend group is named, so each group enters the
/// legend once.
fn legend_name(l: &LineTrace) -> Option<&str> {
    l.show_legend.then_some(l.name.as_str())
}

// ---------------------------------------------------------------------------
// Heatmap cells
// ---------------------------------------------------------------------------

/// Centre and height of every heatmap row.
fn row_geometry(h: &HeatmapTrace) -> Vec<(f64, f64)> {
    match &h.y {
        AxisCoords::Categories(labels) => (0..labels.len()).map(|i| (i as f64, 1.0)).collect(),
        AxisCoords::Positions(pos) => {
            let step = if pos.len() > 1 { (pos[1] - pos[0]).abs() } else { 1.0 };
            pos.iter().map(|&p| (p, step)).collect()
        }
    }
}

fn value_range(h: &HeatmapTrace) -> (f64, f64) {
    h.z.iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

fn draw_heatmap(plot_ui: &mut PlotUi, h: &HeatmapTrace) {
    let (lo, hi) = value_range(h);
    let span = if hi > lo { hi - lo } else { 1.0 };

    for ((y, height), row) in row_geometry(h).into_iter().zip(&h.z) {
        for (x, &v) in row.iter().enumerate() {
            let t = if v.is_finite() { (v - lo) / span } else { 0.0 };
            let (x0, x1) = (x as f64 - 0.5, x as f64 + 0.5);
            let (y0, y1) = (y - height / 2.0, y + height / 2.0);
            let cell = Polygon::new(PlotPoints::from(vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]]))
                .fill_color(color32(h.colorscale.sample(t)))
                .stroke(Stroke::NONE);
            plot_ui.polygon(cell);
        }
    }
}

/// Hover text for the cell under `point`. Rows placed by position are named
/// by the axis tick text at the same index.
fn heatmap_hover(h: &HeatmapTrace, row_text: Option<&[String]>, point: &PlotPoint) -> String {
    let col = point.x.round();
    if col < 0.0 || col as usize >= h.x.len() {
        return String::new();
    }
    let col = col as usize;
    let rows = row_geometry(h);
    let Some(row) = rows
        .iter()
        .position(|&(y, height)| (point.y - y).abs() <= height / 2.0)
    else {
        return String::new();
    };
    let row_name = match &h.y {
        AxisCoords::Categories(labels) => labels[row].clone(),
        AxisCoords::Positions(pos) => row_text
            .and_then(|text| text.get(row))
            .cloned()
            .unwrap_or_else(|| format!("{}", pos[row])),
    };
    format!("{row_name} / {}\n{:.4}", h.x[col], h.z[row][col])
}

// ---------------------------------------------------------------------------
// 3D peak view
// ---------------------------------------------------------------------------

/// Oblique projection of (x, y, z) onto the plot plane; every axis is first
/// scaled to [0, 1].
fn project(x: f64, y: f64, z: f64) -> [f64; 2] {
    [x + 0.45 * y, z + 0.3 * y]
}

fn ribbon_view(ui: &mut Ui, fig: &Figure) {
    ui.heading(&fig.title);
    let Some(panel) = fig.panels.first() else {
        notice(ui, NO_DATA);
        return;
    };
    let lines: Vec<_> = panel
        .traces
        .iter()
        .filter_map(|t| match t {
            Trace::Line3d(l) => Some(l),
            _ => None,
        })
        .collect();

    let extent = |values: &mut dyn Iterator<Item = f64>| {
        let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let span = if hi > lo { hi - lo } else { 1.0 };
        (lo, span)
    };
    let (x0, xs) = extent(&mut lines.iter().flat_map(|l| l.x.iter().copied()));
    let (y0, ys) = extent(&mut lines.iter().flat_map(|l| l.y.iter().copied()));
    let (z0, zs) = extent(&mut lines.iter().flat_map(|l| l.z.iter().copied()));

    let x_title = panel.x_axis.title.clone().unwrap_or_default();
    let y_title = panel.y_axis.title.clone().unwrap_or_default();

    let mut plot = Plot::new("ribbon_3d")
        .data_aspect(1.0)
        .show_axes([false, false])
        .show_grid([false, false]);
    if fig.legend.visible {
        plot = plot.legend(Legend::default());
    }

    plot.show(ui, |plot_ui| {
        let axis = |from: [f64; 3], to: [f64; 3]| {
            Line::new(PlotPoints::from(vec![
                project(from[0], from[1], from[2]),
                project(to[0], to[1], to[2]),
            ]))
            .color(Color32::GRAY)
            .width(1.0)
        };
        plot_ui.line(axis([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]));
        plot_ui.line(axis([0.0, 0.0, 0.0], [0.0, 1.0, 0.0]));
        plot_ui.line(axis([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]));
        let [tx, ty] = project(1.05, 0.0, 0.0);
        plot_ui.text(Text::new(PlotPoint::new(tx, ty), x_title.as_str()));
        let [tx, ty] = project(0.0, 1.1, 0.0);
        plot_ui.text(Text::new(PlotPoint::new(tx, ty), y_title.as_str()));
        let [tx, ty] = project(0.0, 0.0, 1.05);
        plot_ui.text(Text::new(PlotPoint::new(tx, ty), "intensity"));

        for l in &lines {
            let points: PlotPoints = l
                .x
                .iter()
                .zip(&l.y)
                .zip(&l.z)
                .map(|((&x, &y), &z)| project((x - x0) / xs, (y - y0) / ys, (z - z0) / zs))
                .collect();
            plot_ui.line(Line::new(points).name(&l.name).color(color32(l.color)).width(1.5));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_mint::color::Colorscale;

    fn line(name: &str, show_legend: bool) -> LineTrace {
        LineTrace {
            name: name.to_string(),
            x: vec![0.0, 1.0],
            y: vec![0.0, 1.0],
            color: Rgb(0, 0, 0),
            legend_group: Some(name.to_string()),
            show_legend,
            hover_text: None,
        }
    }

    fn fused_heatmap() -> HeatmapTrace {
        HeatmapTrace {
            z: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            x: vec!["A".to_string(), "B".to_string()],
            y: AxisCoords::Positions(vec![5.0, 15.0]),
            colorscale: Colorscale::blues(),
        }
    }

    #[test]
    fn grouped_traces_are_named_once() {
        assert_eq!(legend_name(&line("a.mzXML", true)), Some("a.mzXML"));
        assert_eq!(legend_name(&line("a.mzXML", false)), None);
    }

    #[test]
    fn hover_names_positioned_rows_by_tick_text() {
        let h = fused_heatmap();
        let text = vec!["S2".to_string(), "S1".to_string()];
        assert_eq!(heatmap_hover(&h, Some(text.as_slice()), &PlotPoint::new(1.0, 5.0)), "S2 / B\n2.0000");
        assert_eq!(heatmap_hover(&h, Some(text.as_slice()), &PlotPoint::new(0.2, 16.0)), "S1 / A\n3.0000");
        assert_eq!(heatmap_hover(&h, None, &PlotPoint::new(0.0, 15.0)), "15 / A\n3.0000");
        assert_eq!(heatmap_hover(&h, Some(text.as_slice()), &PlotPoint::new(0.0, 40.0)), "");
    }

    #[test]
    fn hover_names_categorical_rows_by_label() {
        let h = HeatmapTrace {
            y: AxisCoords::Categories(vec!["X".to_string(), "Y".to_string()]),
            ..fused_heatmap()
        };
        assert_eq!(heatmap_hover(&h, None, &PlotPoint::new(0.0, 1.0)), "Y / A\n3.0000");
    }
}
