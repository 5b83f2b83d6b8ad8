use thiserror::Error;

pub type AssistResult<T> = Result<T, AssistError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistError {
    #[error("Invalid launch parameters: {0}")]
    Launch(String),

    #[error("Login failed: {0}")]
    Auth(String),

    #[error("Failed to fetch {what}: {message}")]
    Fetch { what: &'static str, message: String },

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Failed to send reply: {0}")]
    Send(String),

    #[error("Substitution failed: {0}")]
    Substitution(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Assist service unavailable: {0}")]
    Service(String),
}

impl AssistError {
    pub fn fetch(what: &'static str, message: impl Into<String>) -> Self {
        Self::Fetch {
            what,
            message: message.into(),
        }
    }

    /// Errors that leave the panel unusable until the agent retries.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Launch(_) | Self::Auth(_) | Self::Service(_))
    }
}
