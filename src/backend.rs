use crate::event::AppEvent;
use crate::scenario::{Scenario, ScenarioDraft};
use crate::session::ConversationTurn;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use thiserror::Error;
use tokio::runtime::Handle;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("tokio runtime unavailable: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
}

/// HTTP client for the simulator backend. Every call is fire-and-forget:
/// spawned on the runtime, no retry, completion reported as one `AppEvent`
/// on the channel.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
}

impl BackendClient {
    pub fn new(
        base_url: impl Into<String>,
        tx: mpsc::Sender<AppEvent>,
    ) -> Result<Self, BackendError> {
        let runtime_handle = Handle::try_current()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            tx,
            runtime_handle,
        })
    }

    pub fn fetch_catalog(&self) {
        let http = self.http.clone();
        let url = format!("{}/static/scenarios.json", self.base_url);
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            let result = get_json::<Vec<Scenario>>(&http, &url).await;
            match result {
                Ok(list) => {
                    let _ = tx.send(AppEvent::CatalogLoaded(list));
                }
                Err(err) => {
                    tracing::warn!("scenario catalog load failed: {err}");
                    let _ = tx.send(AppEvent::CatalogFailed(err.to_string()));
                }
            }
        });
    }

    pub fn start_chat(&self, session_id: String, scenario_id: String) {
        let http = self.http.clone();
        let url = format!("{}/start_chat", self.base_url);
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            let result = post_json::<ChatReply>(
                &http,
                &url,
                &StartChatRequest {
                    session_id: &session_id,
                    scenario_id: &scenario_id,
                },
            )
            .await;
            match result {
                Ok(reply) => {
                    let _ = tx.send(AppEvent::ChatStarted {
                        session_id,
                        text: reply.response,
                    });
                }
                Err(err) => {
                    tracing::warn!("start_chat failed: {err}");
                    let _ = tx.send(AppEvent::ChatStartFailed {
                        session_id,
                        message: err.to_string(),
                    });
                }
            }
        });
    }

    pub fn send_message(&self, session_id: String, scenario_id: String, message: String) {
        let http = self.http.clone();
        let url = format!("{}/chat", self.base_url);
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            let result = post_json::<ChatReply>(
                &http,
                &url,
                &ChatRequest {
                    message: &message,
                    session_id: &session_id,
                    scenario_id: &scenario_id,
                },
            )
            .await;
            match result {
                Ok(reply) => {
                    let _ = tx.send(AppEvent::ReplyReceived {
                        session_id,
                        text: reply.response,
                    });
                }
                Err(err) => {
                    tracing::warn!("chat failed: {err}");
                    let _ = tx.send(AppEvent::ChatFailed {
                        session_id,
                        message: err.to_string(),
                    });
                }
            }
        });
    }

    pub fn request_feedback(&self, scenario_id: String, history: Vec<ConversationTurn>) {
        let http = self.http.clone();
        let url = format!("{}/feedback", self.base_url);
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            let result = post_json::<FeedbackReply>(
                &http,
                &url,
                &FeedbackRequest {
                    history: &history,
                    scenario_id: &scenario_id,
                },
            )
            .await;
            match result {
                Ok(reply) => {
                    let _ = tx.send(AppEvent::FeedbackReady(reply.feedback));
                }
                Err(err) => {
                    tracing::warn!("feedback failed: {err}");
                    let _ = tx.send(AppEvent::FeedbackFailed(err.to_string()));
                }
            }
        });
    }

    pub fn submit_scenario(&self, draft: ScenarioDraft) {
        let http = self.http.clone();
        let url = format!("{}/add_scenario", self.base_url);
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            let result = post_json::<AddScenarioReply>(&http, &url, &draft).await;
            match result {
                Ok(reply) => {
                    let _ = tx.send(AppEvent::ScenarioAccepted(reply.message));
                }
                Err(err) => {
                    tracing::warn!("add_scenario failed: {err}");
                    let _ = tx.send(AppEvent::ScenarioRejected(err.to_string()));
                }
            }
        });
    }
}

async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
) -> Result<T, BackendError> {
    let response = http.get(url).send().await?;
    decode(response).await
}

async fn post_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    body: &impl Serialize,
) -> Result<T, BackendError> {
    let response = http.post(url).json(body).send().await?;
    decode(response).await
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Api(error_detail(status, &body)))
}

// FastAPI-style errors arrive as {"detail": "..."}; anything else falls back
// to the status line.
fn error_detail(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|err| err.detail)
        .unwrap_or_else(|_| format!("backend returned {status}"))
}

#[derive(Serialize)]
struct StartChatRequest<'a> {
    session_id: &'a str,
    scenario_id: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    session_id: &'a str,
    scenario_id: &'a str,
}

#[derive(Serialize)]
struct FeedbackRequest<'a> {
    history: &'a [ConversationTurn],
    scenario_id: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    response: String,
}

#[derive(Deserialize)]
struct FeedbackReply {
    feedback: String,
}

#[derive(Deserialize)]
struct AddScenarioReply {
    message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}
