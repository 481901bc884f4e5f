use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    /// The grade code is not one of `LN`, `VG`, `G`, `AC`, `SA`.
    #[error("Invalid grade: {0} (expected one of LN, VG, G, AC, SA)")]
    InvalidGrade(String),

    /// Input rejected before any state was touched.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The persisted batch state violates its invariants.
    #[error("Invalid batch state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    #[error("State serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
