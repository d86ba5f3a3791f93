//! Viewer configuration file support.
//!
//! Settings are read from the TOML file named by `RUSTY_MINT_CONFIG`; every
//! field is optional and falls back to its default.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "RUSTY_MINT_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Column shown in the table / heatmap (`peakArea`, `rt_max_intensity` or `full`).
    pub value_column: String,
    /// Aggregation for duplicate (sample, target) cells.
    pub aggregation: String,
    /// Token of the file name used as sample label.
    pub label_split_index: i64,
    /// Columns of the peak-shape grid.
    pub trace_columns: usize,
    /// Largest matrix the viewer will cluster.
    pub max_cluster_rows: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            value_column: "peakArea".to_string(),
            aggregation: "mean".to_string(),
            label_split_index: 0,
            trace_columns: 4,
            max_cluster_rows: 2000,
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Defaults unless `RUSTY_MINT_CONFIG` names a file.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let config = Self::load(Path::new(&path))?;
                log::info!("Using configuration from {}", Path::new(&path).display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }
}
