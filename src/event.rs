use crate::scenario::{Scenario, ScenarioDraft};

/// Everything that can drive the state machine: user intents raised by the
/// UI, and request completions reported by the backend tasks over the
/// channel.
#[derive(Debug, Clone)]
pub enum AppEvent {
    // User intents.
    LoginSubmitted { accepted: bool },
    LogoutRequested,
    ScenarioSelected(String),
    ChatStartRequested,
    ChatClosed,
    MessageSubmitted(String),
    FeedbackRequested,
    FeedbackClosed,
    AddScenarioOpened,
    CatalogViewOpened,
    ScenarioSubmitted(ScenarioDraft),

    // Request completions.
    CatalogLoaded(Vec<Scenario>),
    CatalogFailed(String),
    ChatStarted { session_id: String, text: String },
    ChatStartFailed { session_id: String, message: String },
    ReplyReceived { session_id: String, text: String },
    ChatFailed { session_id: String, message: String },
    FeedbackReady(String),
    FeedbackFailed(String),
    ScenarioAccepted(String),
    ScenarioRejected(String),
}
