pub mod reaper;
pub mod service;

pub use service::{QuizResult, QuizService, QuizServiceError};
