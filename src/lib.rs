//! Rusty Mint: turns targeted metabolomics results into analyst tables,
//! clustered heatmaps and peak-shape figures.

pub mod analysis;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod figure;
pub mod options;
pub mod session;
