use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat is disabled: no GEMINI_API_KEY configured")]
    Disabled,

    #[error("chat session {0} not found")]
    SessionNotFound(Uuid),

    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("you have reached the maximum of {0} questions for this session")]
    QuotaExceeded(u32),

    #[error("chat service error: {0}")]
    ExternalService(String),
}
