use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub sender: Sender,
    pub text: String,
}

/// The active chat conversation. The session id and the transcript are reset
/// together: a transcript without a session id (or the reverse) never exists.
#[derive(Debug, Default)]
pub struct ChatSession {
    session_id: Option<String>,
    transcript: Vec<ConversationTurn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    pub fn reset(&mut self) {
        self.session_id = None;
        self.transcript.clear();
    }

    /// Discards any previous conversation and begins a fresh one with a new
    /// correlation id.
    pub fn start(&mut self) -> String {
        self.reset();
        let id = Uuid::new_v4().to_string();
        self.session_id = Some(id.clone());
        id
    }

    /// Returns the current session id, generating one first if the chat was
    /// opened without a session.
    pub fn ensure_started(&mut self) -> String {
        match &self.session_id {
            Some(id) => id.clone(),
            None => self.start(),
        }
    }

    /// True when `id` belongs to the conversation currently on screen.
    /// Responses carrying a stale id are dropped by the caller.
    pub fn matches(&self, id: &str) -> bool {
        self.session_id.as_deref() == Some(id)
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Sender::User, text.into());
    }

    pub fn push_ai(&mut self, text: impl Into<String>) {
        self.push(Sender::Ai, text.into());
    }

    fn push(&mut self, sender: Sender, text: String) {
        if self.session_id.is_none() {
            return;
        }
        self.transcript.push(ConversationTurn { sender, text });
    }
}
