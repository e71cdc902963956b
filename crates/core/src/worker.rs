//! Running an extraction off the async runtime.

use crate::error::ExtractError;
use crate::extract::{extract, fallback, UploadMeta};
use crate::options::ExtractOptions;
use crate::result::ExtractionResult;
use chrono::Utc;

/// Extract on tokio's blocking pool so parsing never stalls the runtime.
///
/// A worker that fails to complete yields the fallback result.
pub async fn extract_in_worker(
    bytes: Vec<u8>,
    meta: UploadMeta,
    options: ExtractOptions,
) -> ExtractionResult {
    let task_meta = meta.clone();
    tokio::task::spawn_blocking(move || extract(&bytes, &task_meta, &options))
        .await
        .unwrap_or_else(|e| fallback(&meta, Utc::now(), &ExtractError::Worker(e.to_string())))
}
