use thiserror::Error;

/// Failures raised by the aggregation and smoothing pipeline. None of these are recovered from,
/// they abort the run.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("column `{column}` is missing from the table")]
    MissingColumn { column: String },

    #[error("column `{column}` is not part of the combined series")]
    UnexpectedColumn { column: String },

    #[error("no data was loaded for experiment `{experiment}`")]
    MissingExperiment { experiment: String },

    #[error(
        "invalid smoothing window {window} (polynomial order {order}, series length {len}): \
         window must be odd, larger than the order and no longer than the series"
    )]
    InvalidWindow {
        window: usize,
        order: usize,
        len: usize,
    },

    #[error("catalogue lists {experiments} experiments but {titles} titles")]
    ConfigMismatch { experiments: usize, titles: usize },

    #[error("malformed table: {reason}")]
    MalformedTable { reason: String },
}

impl AnalysisError {
    pub fn missing_column(column: &str) -> Self {
        AnalysisError::MissingColumn {
            column: column.to_string(),
        }
    }

    pub fn missing_experiment(experiment: &str) -> Self {
        AnalysisError::MissingExperiment {
            experiment: experiment.to_string(),
        }
    }
}
