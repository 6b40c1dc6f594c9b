//! services/bot/src/quiz/service.rs
//!
//! The transport-agnostic quiz service: document ingestion, quiz generation
//! and quiz navigation over the single shared `Session`. Every command
//! surface (and the idle reaper) goes through this type; it owns the only
//! lock in the system.

use chrono::{DateTime, Duration, Utc};
use quizbot_core::{
    domain::{CursorState, Grading, Question, Session, SessionError},
    ports::{QuizGenerationService, TextExtractionService},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// The user-facing failure taxonomy for quiz operations. Precondition
/// failures carry enough context for the command surface to name the
/// remedial command.
#[derive(Debug, thiserror::Error)]
pub enum QuizServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("unsupported document format '{0}'; attach a PDF file")]
    UnsupportedFormat(String),

    #[error("failed to extract text from the document: {0}")]
    ExtractionFailed(String),

    #[error("quiz generation failed: {0}")]
    GenerationFailed(String),

    /// The session was ended, re-uploaded or re-generated while the
    /// language-model call was in flight; the completed result was discarded
    /// rather than clobbering the newer state.
    #[error("the session changed while the quiz was being generated; try again")]
    StaleGeneration,
}

pub type QuizResult<T> = Result<T, QuizServiceError>;

/// Orchestrates the collaborator ports around the shared session.
///
/// The session is an explicit constructor parameter: whoever builds the
/// service decides where the one-per-process record lives, and tests can
/// hand in their own.
pub struct QuizService {
    session: Arc<Mutex<Session>>,
    extractor: Arc<dyn TextExtractionService>,
    generator: Arc<dyn QuizGenerationService>,
    default_prompt: String,
}

impl QuizService {
    pub fn new(
        session: Arc<Mutex<Session>>,
        extractor: Arc<dyn TextExtractionService>,
        generator: Arc<dyn QuizGenerationService>,
        default_prompt: String,
    ) -> Self {
        Self {
            session,
            extractor,
            generator,
            default_prompt,
        }
    }

    /// Ingests an uploaded document: format check, text extraction, session
    /// activation. Either fully succeeds or leaves the session untouched.
    pub async fn ingest(&self, file_bytes: &[u8], filename: &str) -> QuizResult<()> {
        if !is_supported_document(filename) {
            return Err(QuizServiceError::UnsupportedFormat(filename.to_string()));
        }

        // Precondition check before paying for extraction. The lock is not
        // held across the extraction await, so activation re-checks below.
        {
            let session = self.session.lock().await;
            if session.is_active() {
                return Err(SessionError::AlreadyActive.into());
            }
        }

        let text = self
            .extractor
            .extract_text(file_bytes)
            .await
            .map_err(|e| QuizServiceError::ExtractionFailed(e.to_string()))?;

        let mut session = self.session.lock().await;
        session.activate(text, Utc::now())?;
        info!(chars = session.source_text().len(), "document ingested, session active");
        Ok(())
    }

    /// Generates the question bank from the session's source text and
    /// installs it, rewinding the cursor.
    ///
    /// The session lock is released for the duration of the language-model
    /// call. The epoch captured before the call is re-checked before the
    /// result is committed; if the session changed in the meantime (ended,
    /// re-uploaded, or another generation finished first) the result is
    /// discarded as stale. A collaborator failure leaves the pre-call state
    /// intact so the caller may retry without re-uploading.
    pub async fn generate(&self, prompt_override: Option<&str>) -> QuizResult<usize> {
        let (epoch, source_text) = {
            let session = self.session.lock().await;
            if !session.is_active() {
                return Err(SessionError::NotActive.into());
            }
            (session.epoch(), session.source_text().to_string())
        };

        let prompt = prompt_override.unwrap_or(&self.default_prompt);
        debug!(epoch, "requesting quiz generation");
        let questions = self
            .generator
            .generate_quiz(prompt, &source_text)
            .await
            .map_err(|e| QuizServiceError::GenerationFailed(e.to_string()))?;

        let mut session = self.session.lock().await;
        if session.epoch() != epoch {
            info!(
                captured = epoch,
                current = session.epoch(),
                "discarding stale quiz generation result"
            );
            return Err(QuizServiceError::StaleGeneration);
        }
        let count = questions.len();
        session.install_questions(questions, Utc::now())?;
        info!(count, "quiz installed");
        Ok(count)
    }

    /// Returns the cursor position together with the question it points at,
    /// read under one lock so the displayed number always matches the
    /// question. Does not advance.
    pub async fn current_question(&self) -> QuizResult<(usize, Question)> {
        let mut session = self.session.lock().await;
        let question = session.current_question(Utc::now())?.clone();
        Ok((session.cursor(), question))
    }

    /// Advances the cursor and reports where it landed.
    pub async fn advance(&self) -> QuizResult<CursorState> {
        let mut session = self.session.lock().await;
        Ok(session.advance(Utc::now())?)
    }

    /// Advances the cursor and returns the question it now points at.
    pub async fn advance_and_show(&self) -> QuizResult<(usize, Question)> {
        let mut session = self.session.lock().await;
        let question = session.advance_and_show(Utc::now())?.clone();
        Ok((session.cursor(), question))
    }

    /// Grades a submitted choice against the current question.
    pub async fn submit_answer(&self, choice: &str) -> QuizResult<Grading> {
        let mut session = self.session.lock().await;
        Ok(session.submit_answer(choice, Utc::now())?)
    }

    /// The 0-based cursor position, for display alongside a question.
    pub async fn cursor(&self) -> usize {
        self.session.lock().await.cursor()
    }

    /// Force-resets the session to inactive. Valid in any state.
    pub async fn end(&self) {
        let mut session = self.session.lock().await;
        session.reset();
        info!("session ended");
    }

    /// One idle-reaper tick: resets the session if it has been inactive past
    /// `threshold` as of `now`. Returns whether a reset happened so the
    /// caller can send a notice.
    pub async fn sweep_idle(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        let mut session = self.session.lock().await;
        if session.is_idle(now, threshold) {
            session.reset();
            info!("session ended due to inactivity");
            true
        } else {
            false
        }
    }
}

fn is_supported_document(filename: &str) -> bool {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
