//! services/bot/src/adapters/quiz_llm.rs
//!
//! This module contains the adapter for the quiz-generating LLM.
//! It implements the `QuizGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client, error::OpenAIError,
};
use async_trait::async_trait;
use quizbot_core::{
    domain::{Choice, Question, QUIZ_SIZE},
    ports::{PortError, PortResult, QuizGenerationService},
};
use serde::Deserialize;

/// The system prompt used when no override is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are making 50 multiple-choice test questions. \
Each question has 4 answer choices (A, B, C, D). Provide the correct answer letter \
and an explanation for each question. The questions should be challenging and thorough.";

//=========================================================================================
// Wire Format
//=========================================================================================

// The shape the model is asked to produce. Kept separate from the domain
// `Question` so the schema can stay flat (fixed choice fields, letter enum)
// the way structured-output mode expects.
#[derive(Debug, Deserialize)]
struct QuizPayload {
    questions: Vec<QuestionPayload>,
}

#[derive(Debug, Deserialize)]
struct QuestionPayload {
    question: String,
    choice_a: String,
    choice_b: String,
    choice_c: String,
    choice_d: String,
    correct_answer: String,
    explanation: String,
}

impl From<QuestionPayload> for Question {
    fn from(payload: QuestionPayload) -> Self {
        let choices = [
            ("A", payload.choice_a),
            ("B", payload.choice_b),
            ("C", payload.choice_c),
            ("D", payload.choice_d),
        ]
        .into_iter()
        .map(|(label, text)| Choice {
            label: label.to_string(),
            text,
        })
        .collect();

        Question {
            prompt: payload.question,
            choices,
            correct_answer: payload.correct_answer,
            explanation: payload.explanation,
        }
    }
}

/// The JSON schema handed to the model. This is where the exactly-`QUIZ_SIZE`
/// cardinality and the A-D correct-answer constraint are enforced; the
/// adapter does not re-validate them locally.
fn quiz_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "questions": {
                "type": "array",
                "minItems": QUIZ_SIZE,
                "maxItems": QUIZ_SIZE,
                "items": {
                    "type": "object",
                    "properties": {
                        "question": { "type": "string" },
                        "choice_a": { "type": "string" },
                        "choice_b": { "type": "string" },
                        "choice_c": { "type": "string" },
                        "choice_d": { "type": "string" },
                        "correct_answer": { "type": "string", "enum": ["A", "B", "C", "D"] },
                        "explanation": { "type": "string" }
                    },
                    "required": [
                        "question", "choice_a", "choice_b", "choice_c", "choice_d",
                        "correct_answer", "explanation"
                    ],
                    "additionalProperties": false
                }
            }
        },
        "required": ["questions"],
        "additionalProperties": false
    })
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `QuizGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiQuizAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiQuizAdapter {
    /// Creates a new `OpenAiQuizAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `QuizGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuizGenerationService for OpenAiQuizAdapter {
    /// Sends the full source text plus the instructional prompt and parses
    /// the schema-constrained response into domain questions.
    ///
    /// The source text is passed through whole, with no chunking or
    /// truncation; whatever context limits the model imposes apply directly.
    async fn generate_quiz(
        &self,
        system_prompt: &str,
        source_text: &str,
    ) -> PortResult<Vec<Question>> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!(
                    "Base the questions strictly on this text: {}",
                    source_text
                ))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: Some("A fixed-size bank of multiple-choice questions.".to_string()),
                name: "quiz".to_string(),
                schema: Some(quiz_schema()),
                strict: Some(true),
            },
        };

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .response_format(response_format)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected(
                    "Quiz generation LLM response contained no text content.".to_string(),
                )
            })?;

        let payload: QuizPayload = serde_json::from_str(&content).map_err(|e| {
            PortError::Unexpected(format!(
                "Quiz generation LLM returned non-conforming output: {}",
                e
            ))
        })?;

        Ok(payload.questions.into_iter().map(Question::from).collect())
    }
}
