use serde::{Deserialize, Serialize};

/// A training case served by the backend catalog. Field names follow the
/// backend's camelCase JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub initial_facts: InitialFacts,
    pub customer_name: String,
    pub backstory: String,
    pub tone: String,
    #[serde(default)]
    pub goal_questions: Vec<String>,
}

/// Older catalog entries carry the facts as a plain string; newer ones split
/// them into a heading and content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialFacts {
    Text(String),
    Sectioned { heading: String, content: String },
}

impl InitialFacts {
    pub fn heading(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Sectioned { heading, .. } => Some(heading),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Sectioned { content, .. } => content,
        }
    }
}

/// Wire shape of `POST /add_scenario`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDraft {
    pub id: String,
    pub title: String,
    pub initial_facts: String,
    pub chat_actor: ChatActor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatActor {
    pub customer_name: String,
    pub backstory: String,
    pub tone: String,
    pub goal_questions: Vec<String>,
}
