/// Numeric core: pivot, transforms, clustering.
///
/// ```text
///   WideTable
///       │ pivot
///       ▼
///   PivotMatrix ── normalize ─▶ transpose ─▶ correlate ─▶ cluster + reorder
///                                                             │
///                                                             ▼
///                                                   matrix for the heatmap
/// ```
pub mod cluster;
pub mod matrix;
pub mod pivot;
pub mod transform;

use cluster::RowClustering;
use matrix::PivotMatrix;

use crate::error::AnalysisError;
use crate::options::MatrixOptions;

/// Matrix ready for display, with the clustering that ordered its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedMatrix {
    pub matrix: PivotMatrix,
    pub clustering: Option<RowClustering>,
}

/// Run the transform pipeline and, if requested, the clustering reorder.
///
/// `max_cluster_rows` bounds the clustering cost; larger matrices are refused.
pub fn prepare_matrix(
    m: &PivotMatrix,
    opts: &MatrixOptions,
    max_cluster_rows: usize,
) -> Result<PreparedMatrix, AnalysisError> {
    if m.n_rows() == 0 {
        return Err(AnalysisError::NoData);
    }
    let transformed = transform::apply_transforms(m, opts);
    if !opts.clustered {
        return Ok(PreparedMatrix {
            matrix: transformed,
            clustering: None,
        });
    }

    if transformed.n_rows() > max_cluster_rows {
        return Err(AnalysisError::ClusterLimitExceeded {
            rows: transformed.n_rows(),
            limit: max_cluster_rows,
        });
    }
    let clustering = cluster::cluster_rows(&transformed)?;
    let matrix = cluster::reorder(&transformed, &clustering, opts.correlated);
    Ok(PreparedMatrix {
        matrix,
        clustering: Some(clustering),
    })
}
