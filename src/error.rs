//! Typed error kinds for the bet pipeline.
//!
//! Most of this crate propagates errors with `anyhow::Result` + `.context(..)`
//! the way the rest of the codebase does. `PipelineError` exists only where a
//! caller must branch on *which* failure occurred (see executor.rs phase
//! handling), since `anyhow::Error` alone doesn't give that without downcasting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fewer than 2 prediction sources available for race {race_id}")]
    InsufficientSources { race_id: String },

    #[error("odds feed unavailable for race {race_id} after {attempts} attempts: {source}")]
    OddsUnavailable {
        race_id: String,
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("bet submission failed for race {race_id}: {message}")]
    SubmissionFailed { race_id: String, message: String },

    #[error("bet submission outcome unknown for race {race_id}, order left SUBMITTED: {message}")]
    SubmissionAmbiguous { race_id: String, message: String },

    #[error("persistence error: {0}")]
    PersistenceError(#[from] anyhow::Error),
}
