pub mod domain;
pub mod ports;

pub use domain::{Choice, CursorState, Grading, Question, Session, SessionError, QUIZ_SIZE};
pub use ports::{
    PortError, PortResult, QuizGenerationService, SessionNotifier, TextExtractionService,
};
