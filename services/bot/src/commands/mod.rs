//! services/bot/src/commands/mod.rs
//!
//! The transport-agnostic command surface: parsing inbound command names and
//! the per-command description strings shown by `help`. The actual mapping
//! from commands onto the quiz service lives in [`router`].

pub mod router;

pub use router::{Attachment, CommandRouter};

/// One inbound chat command, parsed from its name and optional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload,
    /// `generate`, optionally with a caller-supplied instructional prompt.
    /// Without one the configured (or built-in default) prompt is used.
    Generate { prompt: Option<String> },
    Question,
    Answer { choice: String },
    NextQuestion,
    ShowNextQuestion,
    End,
    Help,
}

impl Command {
    /// Parses a command name plus optional argument. Returns `None` for
    /// unknown names or for `answer` without a choice.
    pub fn parse(name: &str, argument: Option<&str>) -> Option<Self> {
        let argument = argument.map(str::trim).filter(|a| !a.is_empty());
        match name.trim().trim_start_matches('/').to_ascii_lowercase().as_str() {
            "upload" => Some(Self::Upload),
            "generate" => Some(Self::Generate {
                prompt: argument.map(str::to_string),
            }),
            "question" => Some(Self::Question),
            "answer" => argument.map(|choice| Self::Answer {
                choice: choice.to_string(),
            }),
            "nextquestion" => Some(Self::NextQuestion),
            "shownextquestion" => Some(Self::ShowNextQuestion),
            "end" => Some(Self::End),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

/// The command names and their displayed descriptions, in help order.
/// Defaults can be overridden one by one at startup via
/// `QUIZBOT_DESC_<COMMAND>` environment variables.
#[derive(Debug, Clone)]
pub struct CommandDescriptions {
    entries: Vec<(&'static str, String)>,
}

const DEFAULT_DESCRIPTIONS: &[(&str, &str)] = &[
    ("upload", "Upload a PDF and start a quiz session"),
    ("generate", "Generate a 50-question bank from the uploaded document"),
    ("question", "Show the current question"),
    ("answer", "Answer the current question, e.g. `answer B`"),
    ("nextquestion", "Move on to the next question"),
    ("shownextquestion", "Move on and show the next question"),
    ("end", "End the session"),
    ("help", "List the available commands"),
];

impl Default for CommandDescriptions {
    fn default() -> Self {
        Self {
            entries: DEFAULT_DESCRIPTIONS
                .iter()
                .map(|(name, desc)| (*name, desc.to_string()))
                .collect(),
        }
    }
}

impl CommandDescriptions {
    /// Builds the description table, applying any `QUIZBOT_DESC_<COMMAND>`
    /// overrides present in the environment.
    pub fn from_env() -> Self {
        let mut descriptions = Self::default();
        for (name, description) in &mut descriptions.entries {
            let var = format!("QUIZBOT_DESC_{}", name.to_ascii_uppercase());
            if let Ok(value) = std::env::var(&var) {
                *description = value;
            }
        }
        descriptions
    }

    pub fn describe(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, desc)| desc.as_str())
    }

    /// The full help listing, one command per line.
    pub fn help_text(&self) -> String {
        self.entries
            .iter()
            .map(|(name, desc)| format!("/{} - {}", name, desc))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
