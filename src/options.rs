//! Typed view options.
//!
//! The analyst selects options as a list of checkbox flags. They are parsed
//! once here; everything downstream consumes the named fields.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Matrix transforms and the clustering request, applied in the order
/// normalize → transpose → correlate → cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixOptions {
    /// Divide each column by its maximum.
    pub normalized: bool,
    pub transposed: bool,
    /// Replace the matrix by the Pearson correlation of its rows.
    pub correlated: bool,
    /// Reorder rows by complete-linkage clustering.
    pub clustered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapOptions {
    pub matrix: MatrixOptions,
    /// Draw the dendrogram beside the heatmap (only with `matrix.clustered`).
    pub show_dendrogram: bool,
    pub show_legend: bool,
    pub legend_horizontal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceOptions {
    pub show_legend: bool,
    pub legend_horizontal: bool,
}

impl HeatmapOptions {
    pub const FLAGS: [&'static str; 7] = [
        "normed",
        "transposed",
        "corr",
        "clustered",
        "dendrogram",
        "legend",
        "legend_horizontal",
    ];

    pub fn from_flags<'a, I>(flags: I) -> Result<Self, AnalysisError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut opts = HeatmapOptions::default();
        for flag in flags {
            match flag {
                "normed" => opts.matrix.normalized = true,
                "transposed" => opts.matrix.transposed = true,
                "corr" => opts.matrix.correlated = true,
                "clustered" => opts.matrix.clustered = true,
                "dendrogram" => opts.show_dendrogram = true,
                "legend" => opts.show_legend = true,
                "legend_horizontal" => opts.legend_horizontal = true,
                other => return Err(AnalysisError::UnknownOption(other.to_string())),
            }
        }
        Ok(opts)
    }

    /// The dendrogram panel needs a clustering to draw.
    pub fn fuse_dendrogram(&self) -> bool {
        self.show_dendrogram && self.matrix.clustered
    }
}

impl TraceOptions {
    pub fn from_flags<'a, I>(flags: I) -> Result<Self, AnalysisError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut opts = TraceOptions::default();
        for flag in flags {
            match flag {
                "legend" => opts.show_legend = true,
                "legend_horizontal" => opts.legend_horizontal = true,
                other => return Err(AnalysisError::UnknownOption(other.to_string())),
            }
        }
        Ok(opts)
    }
}
