//! crates/quizbot_core/src/domain.rs
//!
//! Defines the pure, core data structures for the quiz bot, chief among
//! them the single shared `Session` and its state machine. Everything
//! here is synchronous and side-effect free; the current time is always
//! passed in so the rules stay testable.

use chrono::{DateTime, Duration, Utc};

/// The number of questions a generation run must produce. This is a hard
/// contract with the language-model collaborator, enforced by the request
/// schema rather than by local validation.
pub const QUIZ_SIZE: usize = 50;

/// One labeled answer choice within a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub text: String,
}

/// A single multiple-choice question.
///
/// `correct_answer` is the label of the correct choice and must be a
/// member of this question's own choice-label set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub choices: Vec<Choice>,
    pub correct_answer: String,
    pub explanation: String,
}

impl Question {
    /// Whether `label` (already normalized) names one of this question's choices.
    pub fn has_choice(&self, label: &str) -> bool {
        self.choices.iter().any(|c| c.label == label)
    }
}

/// The outcome of grading a submitted answer. The explanation is returned
/// whether or not the answer was correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grading {
    pub correct: bool,
    pub correct_answer: String,
    pub explanation: String,
}

/// Where the cursor landed after an `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// The cursor points at a real question (0-based index).
    InRange(usize),
    /// The cursor has reached or passed the end of the question list.
    Exhausted,
}

/// Errors raised by the session state machine itself. `Exhausted` is a
/// terminal display state rather than a true failure; it is modeled as an
/// error so callers cannot silently fall through to a default question.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a session is already active; end it before uploading a new document")]
    AlreadyActive,
    #[error("no session is active; upload a document first")]
    NotActive,
    #[error("no quiz has been generated for this session")]
    NoQuiz,
    #[error("the quiz is finished; generate a new one or end the session")]
    Exhausted,
}

/// The single shared mutable record for the whole process.
///
/// The five reset fields (`active`, `source_text`, `questions`, `cursor`,
/// `last_activity`) only ever transition together: either all inactive or
/// all consistent with an active session. The `epoch` counter bumps on
/// every mutation that would invalidate an in-flight generation call, so
/// a caller that suspended mid-generation can detect that its result has
/// gone stale and must be discarded.
#[derive(Debug, Clone)]
pub struct Session {
    active: bool,
    source_text: String,
    questions: Vec<Question>,
    cursor: usize,
    last_activity: Option<DateTime<Utc>>,
    epoch: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates the session in its inactive state.
    pub fn new() -> Self {
        Self {
            active: false,
            source_text: String::new(),
            questions: Vec::new(),
            cursor: 0,
            last_activity: None,
            epoch: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Loads extracted document text and activates the session. Fails
    /// without mutation if a session is already running.
    pub fn activate(&mut self, source_text: String, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.active {
            return Err(SessionError::AlreadyActive);
        }
        self.active = true;
        self.source_text = source_text;
        self.questions = Vec::new();
        self.cursor = 0;
        self.last_activity = Some(now);
        self.epoch += 1;
        Ok(())
    }

    /// Replaces the question list wholesale and rewinds the cursor.
    pub fn install_questions(
        &mut self,
        questions: Vec<Question>,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if !self.active {
            return Err(SessionError::NotActive);
        }
        self.questions = questions;
        self.cursor = 0;
        self.last_activity = Some(now);
        self.epoch += 1;
        Ok(())
    }

    /// Returns the session to its inactive state. All five reset fields
    /// transition together; a partial reset is a bug class this method
    /// exists to prevent.
    pub fn reset(&mut self) {
        self.active = false;
        self.source_text.clear();
        self.questions.clear();
        self.cursor = 0;
        self.last_activity = None;
        self.epoch += 1;
    }

    /// Whether the session has been inactive past `threshold` as of `now`.
    pub fn is_idle(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        match (self.active, self.last_activity) {
            (true, Some(last)) => now - last > threshold,
            _ => false,
        }
    }

    fn require_quiz(&self) -> Result<(), SessionError> {
        if !self.active {
            return Err(SessionError::NotActive);
        }
        if self.questions.is_empty() {
            return Err(SessionError::NoQuiz);
        }
        Ok(())
    }

    /// Returns the question at the cursor. Refreshes `last_activity` on
    /// success only; an exhausted read leaves the timestamp alone.
    pub fn current_question(&mut self, now: DateTime<Utc>) -> Result<&Question, SessionError> {
        self.require_quiz()?;
        if self.cursor >= self.questions.len() {
            return Err(SessionError::Exhausted);
        }
        self.last_activity = Some(now);
        Ok(&self.questions[self.cursor])
    }

    /// Increments the cursor unconditionally and reports where it landed.
    /// Refreshes `last_activity` regardless of outcome.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<CursorState, SessionError> {
        self.require_quiz()?;
        self.cursor += 1;
        self.last_activity = Some(now);
        if self.cursor >= self.questions.len() {
            Ok(CursorState::Exhausted)
        } else {
            Ok(CursorState::InRange(self.cursor))
        }
    }

    /// Advances the cursor and returns the question it now points at, or
    /// `Exhausted` if the advance ran off the end. This must never return
    /// the question at the pre-advance cursor.
    pub fn advance_and_show(&mut self, now: DateTime<Utc>) -> Result<&Question, SessionError> {
        self.require_quiz()?;
        self.cursor += 1;
        self.last_activity = Some(now);
        if self.cursor >= self.questions.len() {
            return Err(SessionError::Exhausted);
        }
        Ok(&self.questions[self.cursor])
    }

    /// Grades `choice` against the current question. The comparison is
    /// case-insensitive; an unrecognized label simply grades as wrong.
    /// Does not advance the cursor.
    pub fn submit_answer(
        &mut self,
        choice: &str,
        now: DateTime<Utc>,
    ) -> Result<Grading, SessionError> {
        self.require_quiz()?;
        if self.cursor >= self.questions.len() {
            return Err(SessionError::Exhausted);
        }
        let question = &self.questions[self.cursor];
        let normalized = choice.trim().to_ascii_uppercase();
        let grading = Grading {
            correct: normalized == question.correct_answer,
            correct_answer: question.correct_answer.clone(),
            explanation: question.explanation.clone(),
        };
        self.last_activity = Some(now);
        Ok(grading)
    }
}
