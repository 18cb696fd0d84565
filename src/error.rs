//! Error and per-event status types

use thiserror::Error;

/// Errors raised by the analysis controllers and output sinks
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Truth record '{node}' not found in event")]
    MissingTruthRecord { node: String },

    #[error("No hit sources registered")]
    NoRegisteredSources,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Lifecycle violation: expected {expected}, found {found}")]
    InvalidState {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Failed to serialize output: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of processing a single event
///
/// The two failure variants skip accumulation for the event but never
/// abort the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventStatus {
    /// All resolved sources were drained and the event total committed
    Processed { hits: usize, total_energy: f64 },
    /// The truth gate was absent
    MissingTruthRecord,
    /// The source registry is empty
    NoRegisteredSources,
}

impl EventStatus {
    pub fn is_processed(&self) -> bool {
        matches!(self, EventStatus::Processed { .. })
    }

    /// Convert a skipped event into the matching error, for callers that
    /// prefer `?`
    pub fn into_result(self, truth_node: &str) -> Result<(usize, f64), AnalysisError> {
        match self {
            EventStatus::Processed { hits, total_energy } => Ok((hits, total_energy)),
            EventStatus::MissingTruthRecord => Err(AnalysisError::MissingTruthRecord {
                node: truth_node.to_string(),
            }),
            EventStatus::NoRegisteredSources => Err(AnalysisError::NoRegisteredSources),
        }
    }
}
