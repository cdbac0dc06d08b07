use thiserror::Error;

use crate::llm::LlmError;

#[derive(Error, Debug)]
pub enum EcoSortError {
    /// Input rejected before an algorithm was run.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// CSV writer failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialisation failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local model query failure.
    #[error("llm error: {0}")]
    Llm(#[from] LlmError),

    /// Propagated I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch all for unexpected internal problems.
    #[error("internal error: {0}")]
    Internal(String),
}
