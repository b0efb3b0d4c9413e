use serde::Serialize;
use uuid::Uuid;

use crate::nutrition::{label::LabelFacts, NutritionRecord};

#[derive(Debug, Serialize)]
pub struct ChatSessionSummary {
    pub id: Uuid,
    pub remaining_questions: u32,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub record: NutritionRecord,
    /// Present only when chat is enabled.
    pub chat_session: Option<ChatSessionSummary>,
}

#[derive(Debug, Serialize)]
pub struct LabelItem {
    pub index: usize,
    pub label: String,
    pub parsed: bool,
    pub facts: LabelFacts,
}
