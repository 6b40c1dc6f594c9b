pub mod notify;
pub mod pdf_text;
pub mod quiz_llm;

pub use notify::TracingNotifier;
pub use pdf_text::PdfTextAdapter;
pub use quiz_llm::{OpenAiQuizAdapter, DEFAULT_SYSTEM_PROMPT};
