//! Error types for the extraction engine.

use thiserror::Error;
use vitalgrid_sheet::SheetError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Structural failures of an extraction run.
///
/// These never leave the engine: [`crate::extract`] turns them into a
/// fallback result carrying the message.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The upload could not be decoded into sheets.
    #[error("Failed to read workbook: {0}")]
    Load(#[from] SheetError),

    /// The blocking worker task failed to complete.
    #[error("Extraction worker failed: {0}")]
    Worker(String),

    /// Extraction panicked.
    #[error("Extraction panicked: {0}")]
    Panic(String),
}

impl ExtractError {
    /// Build a panic error from a `catch_unwind` payload.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Self::Panic(message)
    }
}
