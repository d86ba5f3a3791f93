/// Declarative figure descriptions handed to the rendering layer.
///
/// ```text
///   PivotMatrix ──▶ heatmap::compose_heatmap ──┐
///                                             ├──▶ Figure { panels, traces, axis domains }
///   RtProjection ─▶ traces::compose_* ─────────┘
/// ```
///
/// A [`Figure`] is plain data (serializable to JSON); nothing here draws.
pub mod heatmap;
pub mod traces;

use serde::Serialize;

use crate::color::{Colorscale, Rgb};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub title: String,
    /// Pixel height requested from the renderer.
    pub height: u32,
    pub arrangement: Arrangement,
    pub panels: Vec<Panel>,
    pub legend: Legend,
    /// Hover picks the closest point rather than a whole x column.
    pub hover_closest: bool,
}

/// How panels share the figure area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Arrangement {
    Single,
    /// Panels sit side by side in their x domains and share one y axis.
    SharedY,
    Grid { rows: usize, cols: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Legend {
    pub visible: bool,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Orientation {
    #[default]
    #[serde(rename = "v")]
    Vertical,
    #[serde(rename = "h")]
    Horizontal,
}

impl Orientation {
    pub fn horizontal_if(flag: bool) -> Self {
        if flag {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridCell {
    /// 0-based.
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: Option<String>,
    /// Horizontal extent as fractions of the figure width.
    pub domain: [f64; 2],
    pub cell: Option<GridCell>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub traces: Vec<Trace>,
}

impl Panel {
    pub fn full_width(traces: Vec<Trace>) -> Self {
        Panel {
            title: None,
            domain: [0.0, 1.0],
            cell: None,
            x_axis: Axis::default(),
            y_axis: Axis::default(),
            traces,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Option<String>,
    pub tick_vals: Option<Vec<f64>>,
    pub tick_text: Option<Vec<String>>,
    pub show_tick_labels: bool,
    pub show_grid: bool,
}

impl Default for Axis {
    fn default() -> Self {
        Axis {
            title: None,
            tick_vals: None,
            tick_text: None,
            show_tick_labels: true,
            show_grid: true,
        }
    }
}

impl Axis {
    pub fn titled(title: &str) -> Self {
        Axis {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trace {
    Heatmap(HeatmapTrace),
    Line(LineTrace),
    Line3d(Line3dTrace),
}

/// Row coordinates of a heatmap: category labels, or explicit positions when
/// the rows must line up with another panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AxisCoords {
    Categories(Vec<String>),
    Positions(Vec<f64>),
}

impl AxisCoords {
    pub fn len(&self) -> usize {
        match self {
            AxisCoords::Categories(c) => c.len(),
            AxisCoords::Positions(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapTrace {
    /// `z[row][col]`.
    pub z: Vec<Vec<f64>>,
    pub x: Vec<String>,
    pub y: AxisCoords,
    pub colorscale: Colorscale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTrace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub color: Rgb,
    pub legend_group: Option<String>,
    pub show_legend: bool,
    pub hover_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line3dTrace {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub color: Rgb,
}

impl Figure {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn traces(&self) -> impl Iterator<Item = &Trace> {
        self.panels.iter().flat_map(|p| p.traces.iter())
    }
}
