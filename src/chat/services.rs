use std::collections::HashMap;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::ChatError;
use crate::nutrition::NutritionRecord;
use crate::state::AppState;

// Oldest sessions are dropped beyond this many.
const MAX_SESSIONS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ChatMessage {
    fn new(role: Role, content: String) -> Self {
        Self {
            role,
            content,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    pub record: NutritionRecord,
    pub messages: Vec<ChatMessage>,
    pub questions_asked: u32,
    pub created_at: OffsetDateTime,
}

#[derive(Default)]
pub struct ChatSessions {
    inner: Mutex<HashMap<Uuid, ChatSession>>,
}

impl ChatSessions {
    pub async fn open(&self, record: NutritionRecord) -> Uuid {
        let id = Uuid::new_v4();
        let mut map = self.inner.lock().await;
        if map.len() >= MAX_SESSIONS {
            if let Some(oldest) = map.iter().min_by_key(|(_, s)| s.created_at).map(|(k, _)| *k) {
                map.remove(&oldest);
            }
        }
        map.insert(
            id,
            ChatSession {
                record,
                messages: Vec::new(),
                questions_asked: 0,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<ChatSession> {
        self.inner.lock().await.get(&id).cloned()
    }

    /// Count a question against the session's quota and record it in history.
    async fn begin_question(&self, id: Uuid, question: &str, max: u32) -> Result<(NutritionRecord, u32), ChatError> {
        let mut map = self.inner.lock().await;
        let session = map.get_mut(&id).ok_or(ChatError::SessionNotFound(id))?;
        if session.questions_asked >= max {
            return Err(ChatError::QuotaExceeded(max));
        }
        session.questions_asked += 1;
        session
            .messages
            .push(ChatMessage::new(Role::User, question.to_string()));
        Ok((session.record.clone(), max - session.questions_asked))
    }

    async fn push_reply(&self, id: Uuid, reply: &str) {
        if let Some(session) = self.inner.lock().await.get_mut(&id) {
            session
                .messages
                .push(ChatMessage::new(Role::Assistant, reply.to_string()));
        }
    }

    /// Empties the history; the question counter is kept.
    pub async fn clear(&self, id: Uuid) -> Result<(), ChatError> {
        let mut map = self.inner.lock().await;
        let session = map.get_mut(&id).ok_or(ChatError::SessionNotFound(id))?;
        session.messages.clear();
        Ok(())
    }
}

pub fn remaining(session: &ChatSession, max: u32) -> u32 {
    max.saturating_sub(session.questions_asked)
}

pub fn compose_prompt(record: &NutritionRecord, question: &str) -> String {
    format!(
        "Peran: Kamu adalah AI Ahli Gizi yang ramah dan berwawasan luas. \
         Tugasmu adalah membimbing pengguna memahami nutrisi makanan mereka.\n\n\
         ### Data Makanan\n\
         Nama: **{name}**\n\
         - Kalori: {kcal} kkal\n\
         - Komposisi Makro: Lemak {fat}%, Karbo {carb}%, Protein {prot}%\n\
         - Kontribusi Harian: {daily:.1}% dari kebutuhan energi harian rata-rata\n\n\
         ### Pertanyaan Pengguna\n\
         \"{question}\"\n\n\
         ### Instruksi Jawaban\n\
         1. Jawab pertanyaan pengguna secara langsung dan ringkas.\n\
         2. Berikan analisis singkat mengenai keseimbangan nutrisi makanan ini (apakah tinggi lemak/gula/protein?).\n\
         3. Berikan saran praktis (misal: 'cocok dimakan setelah olahraga' atau 'batasi porsinya').\n\
         4. Gunakan format markdown (bold, bullet points) agar mudah dibaca.\n\
         5. Hindari bahasa medis yang terlalu rumit.",
        name = record.food_name,
        kcal = record.calories,
        fat = record.fat_pct,
        carb = record.carb_pct,
        prot = record.protein_pct,
        daily = record.daily_pct,
        question = question,
    )
}

/// Opens a chat session for `record` when chat is enabled.
pub async fn open_session(st: &AppState, record: &NutritionRecord) -> Option<(Uuid, u32)> {
    if st.chat.is_none() {
        return None;
    }
    let id = st.sessions.open(record.clone()).await;
    info!(session_id = %id, food = %record.food_name, "chat session opened");
    Some((id, st.config.max_chat_questions))
}

#[derive(Debug)]
pub struct Answer {
    pub reply: String,
    pub remaining_questions: u32,
}

pub async fn ask(st: &AppState, id: Uuid, question: &str) -> Result<Answer, ChatError> {
    let client = st.chat.as_ref().ok_or(ChatError::Disabled)?;
    let question = question.trim();
    if question.is_empty() {
        return Err(ChatError::EmptyQuestion);
    }

    let (record, remaining_questions) = st
        .sessions
        .begin_question(id, question, st.config.max_chat_questions)
        .await?;

    let prompt = compose_prompt(&record, question);
    let reply = client.complete(&prompt).await.map_err(|e| {
        warn!(error = %e, session_id = %id, "chat completion failed");
        ChatError::ExternalService(format!("{:#}", e))
    })?;

    st.sessions.push_reply(id, &reply).await;
    Ok(Answer {
        reply,
        remaining_questions,
    })
}
