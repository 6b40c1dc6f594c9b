//! services/bot/src/adapters/pdf_text.rs
//!
//! This module contains the adapter for PDF text extraction.
//! It implements the `TextExtractionService` port from the `core` crate.

use async_trait::async_trait;
use quizbot_core::ports::{PortError, PortResult, TextExtractionService};
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextExtractionService` with the `pdf-extract`
/// library.
///
/// Uploads are staged to a single on-disk file which is overwritten on each
/// ingestion. The staging area is guarded by a private mutex so the file is
/// owned exclusively by the in-flight call; only one session exists per
/// process, so one slot is enough.
pub struct PdfTextAdapter {
    staging_path: PathBuf,
    staging_guard: Mutex<()>,
}

impl PdfTextAdapter {
    /// Creates a new `PdfTextAdapter` staging to the given path.
    pub fn new(staging_path: PathBuf) -> Self {
        Self {
            staging_path,
            staging_guard: Mutex::new(()),
        }
    }
}

//=========================================================================================
// `TextExtractionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextExtractionService for PdfTextAdapter {
    /// Extracts the text of every page in document order from the uploaded
    /// bytes. Corrupt or encrypted files surface as port errors; nothing is
    /// partially returned.
    ///
    /// The bytes are also staged to disk so the last upload survives for
    /// inspection, but extraction reads the in-memory copy, so a staging
    /// failure is logged without failing the ingestion.
    async fn extract_text(&self, file_bytes: &[u8]) -> PortResult<String> {
        let _staged = self.staging_guard.lock().await;

        if let Err(e) = tokio::fs::write(&self.staging_path, file_bytes).await {
            warn!(
                path = %self.staging_path.display(),
                error = %e,
                "failed to stage upload; extracting from memory anyway"
            );
        }

        // Extraction walks the whole document; keep it off the async runtime.
        let bytes = file_bytes.to_vec();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| PortError::Unexpected(format!("Extraction task failed: {}", e)))?
            .map_err(|e| PortError::Unexpected(format!("Failed to extract PDF text: {}", e)))?;

        Ok(text)
    }
}
