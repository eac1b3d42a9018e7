// error.rs - Bot Error Taxonomy
// Classifies every failure a command can hit and renders it into the text a
// Discord user sees. Handlers return BotError; only the command layer turns it
// into a message.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    /// The URL carried no `v` query parameter.
    #[error("invalid YouTube URL: {0}")]
    InvalidUrl(String),

    /// Captions are disabled or the video has none.
    #[error("transcript not available: {0}")]
    TranscriptUnavailable(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("transcript fetch failed: {0}")]
    Transcript(String),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Discord error: {0}")]
    Platform(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl BotError {
    /// Text shown to the user in the channel the command came from.
    pub fn user_message(&self) -> String {
        match self {
            BotError::InvalidUrl(_) => "Invalid YouTube URL!".to_string(),
            BotError::TranscriptUnavailable(_) => {
                "Transcript not available for this video.".to_string()
            }
            other => format!("Error: {}", other),
        }
    }
}

impl From<serenity::Error> for BotError {
    fn from(error: serenity::Error) -> Self {
        BotError::Platform(error.to_string())
    }
}

pub type BotResult<T> = std::result::Result<T, BotError>;
