use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::services::ChatMessage;

/// Request body for a follow-up question.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub reply: String,
    pub remaining_questions: u32,
}

/// Current state of a chat session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub food_name: String,
    pub messages: Vec<ChatMessage>,
    pub remaining_questions: u32,
}
