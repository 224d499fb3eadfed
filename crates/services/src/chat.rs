//! Transcripts of the AI maintenance assistant, one per client session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::notice::Notice;

const GREETING: &str = "Hello! I'm your AI maintenance assistant. I can help you with equipment status, maintenance history, scheduling recommendations, and predictive insights. What would you like to know?";
const EMPTY_REPLY: &str = "I apologize, but I couldn't process your request.";
const CONNECTION_TROUBLE: &str =
    "Sorry, I'm having trouble connecting to the server right now. Please try again later.";

/// Messages kept per transcript, greeting included.
pub const DEFAULT_TRANSCRIPT_LIMIT: usize = 100;
/// Sessions kept at once before the least recently used is dropped.
pub const DEFAULT_SESSION_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub speaker: Speaker,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<String>,
}

impl ChatMessage {
    fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker,
            content: content.into(),
            timestamp: Utc::now(),
            suggested_actions: Vec::new(),
        }
    }
}

/// Outcome of one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub reply: ChatMessage,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    #[serde(skip)]
    limit: usize,
}

impl Default for ChatSession {
    fn default() -> Self {
        let mut greeting = ChatMessage::new(Speaker::Ai, GREETING);
        greeting.suggested_actions = vec![
            "Check equipment status".into(),
            "View maintenance schedule".into(),
            "Analyze failure patterns".into(),
        ];
        Self {
            messages: vec![greeting],
            limit: DEFAULT_TRANSCRIPT_LIMIT,
        }
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the transcript at `limit` messages. The greeting always stays;
    /// the oldest exchange after it goes first.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(2);
        self.trim();
        self
    }

    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.trim();
    }

    fn trim(&mut self) {
        if self.messages.len() > self.limit {
            let excess = self.messages.len() - self.limit;
            self.messages.drain(1..=excess);
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Records the operator's question. Returns the question to send,
    /// or `None` for blank input, which is ignored.
    pub fn push_question(&mut self, input: &str) -> Option<String> {
        if input.trim().is_empty() {
            return None;
        }
        self.push(ChatMessage::new(Speaker::User, input));
        Some(input.to_string())
    }

    /// Records the outcome of a question sent to the backend.
    pub fn push_answer(&mut self, answer: domains::Result<Option<String>>) -> ChatTurn {
        let (content, notice) = match answer {
            Ok(Some(message)) => (message, None),
            Ok(None) => (EMPTY_REPLY.to_string(), None),
            Err(err) => {
                warn!(error = %err, "assistant request failed");
                (
                    CONNECTION_TROUBLE.to_string(),
                    Some(Notice::from_error("Error", &err)),
                )
            }
        };
        let reply = ChatMessage::new(Speaker::Ai, content);
        self.push(reply.clone());
        ChatTurn { reply, notice }
    }
}

struct SessionSlot {
    session: Arc<Mutex<ChatSession>>,
    /// Recency rank; larger is more recent.
    touched: u64,
}

/// Per-client transcripts keyed by an opaque session id.
pub struct ChatSessions {
    sessions: DashMap<Uuid, SessionSlot>,
    capacity: usize,
    transcript_limit: usize,
    clock: AtomicU64,
}

impl Default for ChatSessions {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_CAPACITY, DEFAULT_TRANSCRIPT_LIMIT)
    }
}

impl ChatSessions {
    pub fn new(capacity: usize, transcript_limit: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            capacity: capacity.max(1),
            transcript_limit,
            clock: AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Existing session for `id`, if any.
    pub fn get(&self, id: Uuid) -> Option<Arc<Mutex<ChatSession>>> {
        let tick = self.tick();
        let mut slot = self.sessions.get_mut(&id)?;
        slot.touched = tick;
        Some(Arc::clone(&slot.session))
    }

    /// The session for `id`, or a new one under a fresh id when `id` is
    /// missing or unknown.
    pub fn open(&self, id: Option<Uuid>) -> (Uuid, Arc<Mutex<ChatSession>>) {
        if let Some(id) = id {
            if let Some(session) = self.get(id) {
                return (id, session);
            }
        }

        self.make_room();
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(ChatSession::new().with_limit(self.transcript_limit)));
        self.sessions.insert(
            id,
            SessionSlot {
                session: Arc::clone(&session),
                touched: self.tick(),
            },
        );
        debug!(session = %id, "chat session opened");
        (id, session)
    }

    fn make_room(&self) {
        while self.sessions.len() >= self.capacity {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|slot| slot.value().touched)
                .map(|slot| *slot.key());
            let Some(oldest) = oldest else { break };
            self.sessions.remove(&oldest);
            debug!(session = %oldest, "chat session evicted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MaintenanceBackend, MockMaintenanceBackend, MonitorError, Operation};

    #[test]
    fn starts_with_greeting() {
        let session = ChatSession::new();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].speaker, Speaker::Ai);
        assert_eq!(session.messages()[0].suggested_actions.len(), 3);
    }

    #[test]
    fn blank_questions_are_ignored() {
        let mut session = ChatSession::new();
        assert_eq!(session.push_question("   "), None);
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn round_trip_through_backend() {
        let mut backend = MockMaintenanceBackend::new();
        backend
            .expect_chat()
            .withf(|q| q == "status of pump 3?")
            .returning(|_| Ok(Some("Pump 3 is operational.".into())));

        let mut session = ChatSession::new();
        let question = session.push_question("status of pump 3?").unwrap();
        let turn = session.push_answer(backend.chat(&question).await);

        assert_eq!(turn.reply.content, "Pump 3 is operational.");
        assert!(turn.notice.is_none());
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[1].speaker, Speaker::User);
    }

    #[test]
    fn missing_message_gets_apology() {
        let mut session = ChatSession::new();
        session.push_question("hi");
        let turn = session.push_answer(Ok(None));
        assert_eq!(turn.reply.content, EMPTY_REPLY);
    }

    #[test]
    fn failure_appends_error_reply_and_notice() {
        let mut session = ChatSession::new();
        session.push_question("hi");
        let turn = session.push_answer(Err(MonitorError::network(Operation::Chat, Some(500))));
        assert_eq!(turn.reply.content, CONNECTION_TROUBLE);
        let notice = turn.notice.unwrap();
        assert_eq!(notice.description, "Failed to communicate with AI Assistant");
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn transcript_drops_oldest_exchange_past_the_limit() {
        let mut session = ChatSession::new().with_limit(5);
        for n in 0..4 {
            session.push_question(&format!("question {n}"));
            session.push_answer(Ok(Some(format!("answer {n}"))));
        }

        let contents: Vec<&str> = session.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents.len(), 5);
        assert_eq!(contents[0], GREETING);
        assert_eq!(&contents[1..], ["question 2", "answer 2", "question 3", "answer 3"]);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let sessions = ChatSessions::default();
        let (first, transcript) = sessions.open(None);
        transcript.lock().await.push_question("only mine");

        let (second, other) = sessions.open(None);
        assert_ne!(first, second);
        assert_eq!(other.lock().await.messages().len(), 1);

        let (again, same) = sessions.open(Some(first));
        assert_eq!(again, first);
        assert_eq!(same.lock().await.messages().len(), 2);
    }

    #[test]
    fn unknown_id_opens_a_fresh_session() {
        let sessions = ChatSessions::default();
        let stray = Uuid::new_v4();
        let (id, _) = sessions.open(Some(stray));
        assert_ne!(id, stray);
        assert!(sessions.get(stray).is_none());
    }

    #[test]
    fn session_count_is_capped() {
        let sessions = ChatSessions::new(2, DEFAULT_TRANSCRIPT_LIMIT);
        let (first, _) = sessions.open(None);
        for _ in 0..5 {
            sessions.open(None);
        }
        assert_eq!(sessions.len(), 2);
        assert!(sessions.get(first).is_none());
    }
}
