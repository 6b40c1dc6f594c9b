//! services/bot/src/commands/router.rs
//!
//! Pure routing layer: maps each parsed command onto the quiz service and
//! renders every outcome, success or failure, as one human-readable reply.
//! Holds no state of its own; no error escapes to the transport.

use crate::commands::{Command, CommandDescriptions};
use crate::quiz::{QuizService, QuizServiceError};
use bytes::Bytes;
use quizbot_core::domain::{CursorState, Question, SessionError};
use std::sync::Arc;

/// An uploaded file accompanying a command.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Bytes,
}

pub struct CommandRouter {
    service: Arc<QuizService>,
    descriptions: CommandDescriptions,
}

impl CommandRouter {
    pub fn new(service: Arc<QuizService>, descriptions: CommandDescriptions) -> Self {
        Self {
            service,
            descriptions,
        }
    }

    /// Executes one command and produces the reply text.
    pub async fn dispatch(&self, command: Command, attachment: Option<Attachment>) -> String {
        match command {
            Command::Upload => self.upload(attachment).await,
            Command::Generate { prompt } => self.generate(prompt.as_deref()).await,
            Command::Question => self.question().await,
            Command::Answer { choice } => self.answer(&choice).await,
            Command::NextQuestion => self.next_question().await,
            Command::ShowNextQuestion => self.show_next_question().await,
            Command::End => {
                self.service.end().await;
                "🛑 Session ended.".to_string()
            }
            Command::Help => self.descriptions.help_text(),
        }
    }

    async fn upload(&self, attachment: Option<Attachment>) -> String {
        let Some(attachment) = attachment else {
            return "❌ Please attach a PDF file.".to_string();
        };
        match self
            .service
            .ingest(&attachment.bytes, &attachment.filename)
            .await
        {
            Ok(()) => "✅ PDF loaded! Use `/generate` to create a question bank.".to_string(),
            Err(e) => render_error(e),
        }
    }

    async fn generate(&self, prompt: Option<&str>) -> String {
        match self.service.generate(prompt).await {
            Ok(count) => format!("Generated {} questions! Use /question to get one.", count),
            Err(e) => render_error(e),
        }
    }

    async fn question(&self) -> String {
        match self.service.current_question().await {
            Ok((cursor, question)) => format_question(cursor, &question),
            Err(QuizServiceError::Session(SessionError::Exhausted)) => {
                "🎉 Quiz finished! Use `/generate` to make new questions or `/end` to close session."
                    .to_string()
            }
            Err(e) => render_error(e),
        }
    }

    async fn answer(&self, choice: &str) -> String {
        match self.service.submit_answer(choice).await {
            Ok(grading) if grading.correct => format!("✅ Correct! {}", grading.explanation),
            Ok(grading) => format!(
                "❌ Wrong. Correct answer is {} — {}",
                grading.correct_answer, grading.explanation
            ),
            Err(QuizServiceError::Session(SessionError::Exhausted)) => {
                "🎉 Quiz finished! No more questions.".to_string()
            }
            Err(e) => render_error(e),
        }
    }

    async fn next_question(&self) -> String {
        match self.service.advance().await {
            Ok(CursorState::InRange(cursor)) => format!(
                "➡️ Moving to Question {}. Use `/question` to view it.",
                cursor + 1
            ),
            Ok(CursorState::Exhausted) => {
                "🎉 All questions answered! Use `/generate` to create more or `/end` to close session."
                    .to_string()
            }
            Err(e) => render_error(e),
        }
    }

    async fn show_next_question(&self) -> String {
        match self.service.advance_and_show().await {
            Ok((cursor, question)) => format_question(cursor, &question),
            Err(QuizServiceError::Session(SessionError::Exhausted)) => {
                "🎉 Quiz finished! Use `/generate` to make new questions or `/end` to close session."
                    .to_string()
            }
            Err(e) => render_error(e),
        }
    }
}

/// Renders a question as numbered prompt plus lettered choices.
fn format_question(cursor: usize, question: &Question) -> String {
    let mut lines = vec![format!("**Q{}**: {}", cursor + 1, question.prompt), String::new()];
    for choice in &question.choices {
        lines.push(format!("{}) {}", choice.label, choice.text));
    }
    lines.join("\n")
}

/// Every failure becomes one reply naming the missing precondition and the
/// remedial command.
fn render_error(error: QuizServiceError) -> String {
    match error {
        QuizServiceError::Session(SessionError::AlreadyActive) => {
            "❌ A session is already running! End it with `/end` before uploading a new PDF."
                .to_string()
        }
        QuizServiceError::Session(SessionError::NotActive) => {
            "❌ No session active. Upload a PDF first with `/upload`.".to_string()
        }
        QuizServiceError::Session(SessionError::NoQuiz) => {
            "❌ No active quiz. Use `/upload` and `/generate` first.".to_string()
        }
        QuizServiceError::Session(SessionError::Exhausted) => {
            "🎉 Quiz finished! Use `/generate` to make new questions or `/end` to close session."
                .to_string()
        }
        QuizServiceError::UnsupportedFormat(filename) => {
            format!("❌ '{}' is not a supported document. Please attach a PDF file.", filename)
        }
        QuizServiceError::ExtractionFailed(reason) => {
            format!("❌ Could not read that PDF ({}). Try another file.", reason)
        }
        QuizServiceError::GenerationFailed(reason) => {
            format!("❌ Quiz generation failed ({}). Try `/generate` again.", reason)
        }
        QuizServiceError::StaleGeneration => {
            "⚠️ The session changed while the quiz was being generated, so the result was discarded."
                .to_string()
        }
    }
}
