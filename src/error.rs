use thiserror::Error;

/// Failures of the analysis core.
///
/// Only [`AnalysisError::NoData`] is an expected state; views translate it into
/// the "no data available for this view" notice.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no data available for this view")]
    NoData,

    #[error("cannot cluster: {reason}")]
    DegenerateClusterInput { reason: String },

    #[error("clustering {rows} rows exceeds the configured limit of {limit}")]
    ClusterLimitExceeded { rows: usize, limit: usize },

    #[error("unknown option '{0}'")]
    UnknownOption(String),
}

impl AnalysisError {
    pub fn degenerate(reason: impl Into<String>) -> Self {
        AnalysisError::DegenerateClusterInput {
            reason: reason.into(),
        }
    }
}
