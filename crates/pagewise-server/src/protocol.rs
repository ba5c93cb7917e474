//! Side-panel wire protocol: one JSON object per text frame each way.
//! Requests are tagged by `action`; replies are plain objects whose shape
//! depends on the action.

use pagewise_ai::SessionStatus;
use serde::{Deserialize, Serialize};

/// Actions the server understands.
pub const ACTIONS: [&str; 6] = [
    "analyzePage",
    "chatMessage",
    "setApiKey",
    "getAgentStatus",
    "clearAgentHistory",
    "test",
];

/// Page data as the content script captures it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    AnalyzePage {
        #[serde(default)]
        data: PageSnapshot,
    },

    #[serde(rename_all = "camelCase")]
    ChatMessage {
        message: String,
        #[serde(default)]
        page_data: PageSnapshot,
        thread_id: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    SetApiKey {
        #[serde(default)]
        api_key: String,
        base_url: Option<String>,
        langsmith_api_key: Option<String>,
        langsmith_project: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    GetAgentStatus { thread_id: Option<String> },

    #[serde(rename_all = "camelCase")]
    ClearAgentHistory { thread_id: Option<String> },

    Test,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Unknown action")]
    UnknownAction,
    #[error("{0}")]
    Malformed(String),
}

/// Parse one text frame into a request.
pub fn parse_request(text: &str) -> Result<Request, RequestError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| RequestError::Malformed(e.to_string()))?;
    let known = value
        .get("action")
        .and_then(|a| a.as_str())
        .is_some_and(|action| ACTIONS.contains(&action));
    if !known {
        return Err(RequestError::UnknownAction);
    }
    serde_json::from_value(value).map_err(|e| RequestError::Malformed(e.to_string()))
}

/// Reply objects. Serialized without a tag; each variant's fields are the
/// whole object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Summary {
        summary: String,
    },

    #[serde(rename_all = "camelCase")]
    Chat {
        response: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        thread_id: Option<String>,
    },

    Status {
        status: SessionStatus,
    },

    Success {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Test {
        success: bool,
        message: String,
        initialized: bool,
        api_key_loaded: bool,
        agent_count: usize,
    },

    Error {
        error: String,
    },
}

impl Response {
    pub fn ok() -> Self {
        Response::Success {
            success: true,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            error: message.into(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }
}
