//! crates/quizbot_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the concrete collaborators: the PDF text
//! extractor, the language-model API, and whatever surface carries notices
//! back to users.

use async_trait::async_trait;

use crate::domain::Question;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., the
/// extraction library or the LLM client).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Extracts the linearized text of a document: the textual content of
    /// every page, concatenated in document order. Staging the raw bytes to
    /// disk (and serializing access to that staging area) is the adapter's
    /// concern.
    async fn extract_text(&self, file_bytes: &[u8]) -> PortResult<String>;
}

#[async_trait]
pub trait QuizGenerationService: Send + Sync {
    /// Generates the fixed-size question set from a source text. The
    /// `QUIZ_SIZE` cardinality and the shape of each question are enforced by
    /// the request schema handed to the collaborator, not re-validated here.
    async fn generate_quiz(
        &self,
        system_prompt: &str,
        source_text: &str,
    ) -> PortResult<Vec<Question>>;
}

#[async_trait]
pub trait SessionNotifier: Send + Sync {
    /// Delivers an out-of-band, human-readable notice (e.g. "session expired
    /// after 30 minutes of inactivity"). Best effort; failures are the
    /// adapter's to swallow.
    async fn notify(&self, message: &str);
}
