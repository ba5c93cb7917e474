//! Request dispatch: turns side-panel actions into session manager calls
//! and every failure into a reply the panel can show.

use std::path::PathBuf;

use pagewise_ai::{AssistantSettings, PageContext, SessionManager};
use pagewise_common::ConfigError;
use pagewise_config::schema::mask_secret;
use pagewise_config::{load_from_path, save_config_to_path, validation, PagewiseConfig};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::protocol::{parse_request, PageSnapshot, Request, Response};

pub const MISSING_KEY_REPLY: &str = "Please configure your API key in the extension settings.";
pub const ANALYZE_FAILED_REPLY: &str = "Sorry, I encountered an error while analyzing this page. \
Please check your API key and try again.";
pub const CHAT_FAILED_REPLY: &str =
    "Sorry, I encountered an error processing your message. Please try again.";

pub struct Assistant {
    manager: SessionManager,
    config: Mutex<PagewiseConfig>,
    config_path: PathBuf,
}

impl Assistant {
    pub fn new(manager: SessionManager, config: PagewiseConfig, config_path: PathBuf) -> Self {
        Self {
            manager,
            config: Mutex::new(config),
            config_path,
        }
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    /// Parse and handle one text frame.
    pub async fn handle_text(&self, text: &str) -> Response {
        match parse_request(text) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                warn!(error = %e, "Rejected request");
                Response::error(e.to_string())
            }
        }
    }

    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::AnalyzePage { data } => Response::Summary {
                summary: self.analyze_page(data).await,
            },
            Request::ChatMessage {
                message,
                page_data,
                thread_id,
            } => self.chat_message(&message, page_data, thread_id).await,
            Request::SetApiKey {
                api_key,
                base_url,
                langsmith_api_key,
                langsmith_project,
            } => {
                self.set_api_key(api_key, base_url, langsmith_api_key, langsmith_project)
                    .await
            }
            Request::GetAgentStatus { thread_id } => {
                let Some(thread_id) = non_empty(thread_id) else {
                    return Response::error("Thread ID required");
                };
                match self.manager.status(&thread_id).await {
                    Ok(status) => Response::Status { status },
                    Err(_) => Response::error("Agent not found for thread"),
                }
            }
            Request::ClearAgentHistory { thread_id } => {
                if let Some(thread_id) = non_empty(thread_id) {
                    self.manager.clear_history(&thread_id).await;
                }
                Response::ok()
            }
            Request::Test => Response::Test {
                success: true,
                message: "Background script is working".into(),
                initialized: true,
                api_key_loaded: self.manager.settings().await.model.has_api_key(),
                agent_count: self.manager.session_count().await,
            },
        }
    }

    async fn capture(&self, page: PageSnapshot) -> PageContext {
        let budget = self.manager.settings().await.content_budget;
        PageContext::capture(page.url, page.title, &page.content, budget)
    }

    async fn analyze_page(&self, page: PageSnapshot) -> String {
        if !self.manager.settings().await.model.has_api_key() {
            return MISSING_KEY_REPLY.into();
        }
        let page = self.capture(page).await;
        match self.manager.analyze_page(page).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Page analysis failed");
                ANALYZE_FAILED_REPLY.into()
            }
        }
    }

    async fn chat_message(
        &self,
        message: &str,
        page: PageSnapshot,
        thread_id: Option<String>,
    ) -> Response {
        if !self.manager.settings().await.model.has_api_key() {
            return Response::Chat {
                response: MISSING_KEY_REPLY.into(),
                thread_id,
            };
        }

        let page = self.capture(page).await;
        match self.manager.chat(thread_id.as_deref(), page, message).await {
            Ok((thread_id, reply)) => Response::Chat {
                response: reply.rendered.to_html(),
                thread_id: Some(thread_id),
            },
            Err(e) => {
                warn!(thread_id = ?thread_id, error = %e, "Chat message failed");
                Response::Chat {
                    response: CHAT_FAILED_REPLY.into(),
                    thread_id,
                }
            }
        }
    }

    /// Update credentials, persist them, then apply them to new sessions.
    /// Empty optional fields keep their current values.
    ///
    /// The file receives only the changed fields on top of its own
    /// contents, so values that came from the environment stay out of it.
    async fn set_api_key(
        &self,
        api_key: String,
        base_url: Option<String>,
        tracing_api_key: Option<String>,
        tracing_project: Option<String>,
    ) -> Response {
        let update = CredentialUpdate {
            api_key,
            base_url: non_empty(base_url),
            tracing_api_key: non_empty(tracing_api_key),
            tracing_project: non_empty(tracing_project),
        };

        let mut config = self.config.lock().await;
        let mut updated = config.clone();
        update.apply_to(&mut updated);

        info!(
            api_key = %mask_secret(&updated.model.api_key),
            base_url = %updated.model.base_url,
            tracing_api_key = %updated.model.tracing_api_key.as_deref().map(mask_secret).unwrap_or_else(|| "missing".into()),
            tracing_project = %updated.model.tracing_project,
            "Updating model settings"
        );

        let saved = validation::validate(&updated)
            .and_then(|()| self.file_config())
            .and_then(|mut on_disk| {
                update.apply_to(&mut on_disk);
                save_config_to_path(&on_disk, &self.config_path)
            });
        if let Err(e) = saved {
            warn!(error = %e, path = %self.config_path.display(), "Failed to save settings");
            return Response::Success {
                success: false,
                error: Some(format!("Failed to save API key: {e}")),
            };
        }

        self.manager
            .reconfigure(AssistantSettings::from(&updated))
            .await;
        *config = updated;
        Response::ok()
    }

    /// The config file as written, without environment overrides.
    fn file_config(&self) -> Result<PagewiseConfig, ConfigError> {
        match load_from_path(&self.config_path) {
            Err(ConfigError::FileNotFound(_)) => Ok(PagewiseConfig::default()),
            other => other,
        }
    }
}

/// Credential fields carried by a `setApiKey` request. `None` leaves the
/// current value alone.
struct CredentialUpdate {
    api_key: String,
    base_url: Option<String>,
    tracing_api_key: Option<String>,
    tracing_project: Option<String>,
}

impl CredentialUpdate {
    fn apply_to(&self, config: &mut PagewiseConfig) {
        config.model.api_key = self.api_key.clone();
        if let Some(base_url) = &self.base_url {
            config.model.base_url = base_url.clone();
        }
        if let Some(key) = &self.tracing_api_key {
            config.model.tracing_api_key = Some(key.clone());
        }
        if let Some(project) = &self.tracing_project {
            config.model.tracing_project = project.clone();
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use pagewise_ai::{AiClient, AiError, AiResponse, ClientFactory, Message, TokenUsage};
    use pagewise_config::schema::ModelConfig;
    use tempfile::TempDir;

    use super::*;

    struct CannedClient {
        fail: bool,
    }

    #[async_trait]
    impl AiClient for CannedClient {
        async fn send_message(&self, _messages: &[Message]) -> Result<AiResponse, AiError> {
            if self.fail {
                return Err(AiError::RateLimited);
            }
            Ok(AiResponse {
                content: "Canned reply".into(),
                usage: TokenUsage::default(),
            })
        }
    }

    fn factory(fail: bool) -> ClientFactory {
        Arc::new(
            move |_model: &ModelConfig| -> Result<Arc<dyn AiClient>, AiError> {
                Ok(Arc::new(CannedClient { fail }))
            },
        )
    }

    fn assistant_with(config: PagewiseConfig, path: PathBuf, fail: bool) -> Assistant {
        let manager = SessionManager::new(AssistantSettings::from(&config), factory(fail));
        Assistant::new(manager, config, path)
    }

    fn keyed_config() -> PagewiseConfig {
        let mut config = PagewiseConfig::default();
        config.model.api_key = "sk-test".into();
        config
    }

    async fn send(assistant: &Assistant, json: &str) -> serde_json::Value {
        let reply = assistant.handle_text(json).await.to_json();
        serde_json::from_str(&reply).unwrap()
    }

    const CHAT: &str = r#"{"action":"chatMessage","message":"hi","threadId":"t1",
        "pageData":{"url":"https://a","title":"A","content":"body"}}"#;

    #[tokio::test]
    async fn test_action_reports_state() {
        let dir = TempDir::new().unwrap();
        let assistant = assistant_with(
            PagewiseConfig::default(),
            dir.path().join("config.toml"),
            false,
        );
        let reply = send(&assistant, r#"{"action":"test"}"#).await;
        assert_eq!(reply["success"], true);
        assert_eq!(reply["message"], "Background script is working");
        assert_eq!(reply["apiKeyLoaded"], false);
        assert_eq!(reply["agentCount"], 0);
    }

    #[tokio::test]
    async fn unknown_action_and_bad_json() {
        let dir = TempDir::new().unwrap();
        let assistant = assistant_with(keyed_config(), dir.path().join("config.toml"), false);
        let reply = send(&assistant, r#"{"action":"dance"}"#).await;
        assert_eq!(reply["error"], "Unknown action");
        let reply = send(&assistant, "{oops").await;
        assert!(reply["error"].is_string());
    }

    #[tokio::test]
    async fn chat_without_key_asks_for_configuration() {
        let dir = TempDir::new().unwrap();
        let assistant = assistant_with(
            PagewiseConfig::default(),
            dir.path().join("config.toml"),
            false,
        );
        let reply = send(&assistant, CHAT).await;
        assert_eq!(reply["response"], MISSING_KEY_REPLY);
        assert_eq!(assistant.manager().session_count().await, 0);
    }

    #[tokio::test]
    async fn chat_returns_rendered_reply_and_thread() {
        let dir = TempDir::new().unwrap();
        let assistant = assistant_with(keyed_config(), dir.path().join("config.toml"), false);
        let reply = send(&assistant, CHAT).await;
        assert_eq!(reply["response"], "Canned reply");
        assert_eq!(reply["threadId"], "t1");

        let status = send(&assistant, r#"{"action":"getAgentStatus","threadId":"t1"}"#).await;
        assert_eq!(status["status"]["messageCount"], 2);
        assert_eq!(status["status"]["initialized"], true);
    }

    #[tokio::test]
    async fn chat_failure_uses_apology() {
        let dir = TempDir::new().unwrap();
        let assistant = assistant_with(keyed_config(), dir.path().join("config.toml"), true);
        let reply = send(&assistant, CHAT).await;
        assert_eq!(reply["response"], CHAT_FAILED_REPLY);
    }

    #[tokio::test]
    async fn analyze_page_replies() {
        let dir = TempDir::new().unwrap();
        let ok = assistant_with(keyed_config(), dir.path().join("a.toml"), false);
        let reply = send(&ok, r#"{"action":"analyzePage","data":{"url":"u","title":"t","content":"c"}}"#).await;
        assert_eq!(reply["summary"], "Canned reply");

        let failing = assistant_with(keyed_config(), dir.path().join("b.toml"), true);
        let reply = send(&failing, r#"{"action":"analyzePage","data":{}}"#).await;
        assert_eq!(reply["summary"], ANALYZE_FAILED_REPLY);

        let unkeyed = assistant_with(PagewiseConfig::default(), dir.path().join("c.toml"), false);
        let reply = send(&unkeyed, r#"{"action":"analyzePage","data":{}}"#).await;
        assert_eq!(reply["summary"], MISSING_KEY_REPLY);
    }

    #[tokio::test]
    async fn agent_status_errors() {
        let dir = TempDir::new().unwrap();
        let assistant = assistant_with(keyed_config(), dir.path().join("config.toml"), false);
        let reply = send(&assistant, r#"{"action":"getAgentStatus"}"#).await;
        assert_eq!(reply["error"], "Thread ID required");
        let reply = send(&assistant, r#"{"action":"getAgentStatus","threadId":"ghost"}"#).await;
        assert_eq!(reply["error"], "Agent not found for thread");
    }

    #[tokio::test]
    async fn clear_history_always_succeeds() {
        let dir = TempDir::new().unwrap();
        let assistant = assistant_with(keyed_config(), dir.path().join("config.toml"), false);
        send(&assistant, CHAT).await;

        let reply = send(&assistant, r#"{"action":"clearAgentHistory","threadId":"t1"}"#).await;
        assert_eq!(reply["success"], true);
        let status = send(&assistant, r#"{"action":"getAgentStatus","threadId":"t1"}"#).await;
        assert_eq!(status["status"]["messageCount"], 0);

        let reply = send(&assistant, r#"{"action":"clearAgentHistory"}"#).await;
        assert_eq!(reply["success"], true);
    }

    #[tokio::test]
    async fn set_api_key_persists_and_applies() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let assistant = assistant_with(PagewiseConfig::default(), path.clone(), false);

        let reply = send(
            &assistant,
            r#"{"action":"setApiKey","apiKey":"sk-new","baseUrl":"http://localhost:8000/v1",
                "langsmithApiKey":"ls-key","langsmithProject":""}"#,
        )
        .await;
        assert_eq!(reply, serde_json::json!({ "success": true }));

        let saved = pagewise_config::load_from_path(&path).unwrap();
        assert_eq!(saved.model.api_key, "sk-new");
        assert_eq!(saved.model.base_url, "http://localhost:8000/v1");
        assert_eq!(saved.model.tracing_api_key.as_deref(), Some("ls-key"));
        assert_eq!(saved.model.tracing_project, "browser-assistant");

        let settings = assistant.manager().settings().await;
        assert_eq!(settings.model.api_key, "sk-new");

        let reply = send(&assistant, CHAT).await;
        assert_eq!(reply["response"], "Canned reply");
    }

    #[tokio::test]
    async fn set_api_key_keeps_environment_base_url_out_of_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut on_disk = PagewiseConfig::default();
        on_disk.model.tracing_project = "from-file".into();
        save_config_to_path(&on_disk, &path).unwrap();

        // Effective config after a PAGEWISE_BASE_URL override.
        let mut effective = on_disk.clone();
        effective.model.base_url = "http://env-proxy:9000/v1".into();
        let assistant = assistant_with(effective, path.clone(), false);

        let reply = send(&assistant, r#"{"action":"setApiKey","apiKey":"sk-new"}"#).await;
        assert_eq!(reply["success"], true);

        let saved = pagewise_config::load_from_path(&path).unwrap();
        assert_eq!(saved.model.api_key, "sk-new");
        assert_eq!(saved.model.base_url, PagewiseConfig::default().model.base_url);
        assert_eq!(saved.model.tracing_project, "from-file");

        let settings = assistant.manager().settings().await;
        assert_eq!(settings.model.base_url, "http://env-proxy:9000/v1");
        assert_eq!(settings.model.api_key, "sk-new");
    }

    #[tokio::test]
    async fn set_api_key_reports_save_failure() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be replaced by the config file.
        let assistant = assistant_with(PagewiseConfig::default(), dir.path().to_path_buf(), false);
        let reply = send(&assistant, r#"{"action":"setApiKey","apiKey":"sk-new"}"#).await;
        assert_eq!(reply["success"], false);
        assert!(reply["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to save API key"));
        assert!(!assistant.manager().settings().await.model.has_api_key());
    }

    #[tokio::test]
    async fn set_api_key_rejects_invalid_base_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let assistant = assistant_with(PagewiseConfig::default(), path.clone(), false);
        let reply = send(
            &assistant,
            r#"{"action":"setApiKey","apiKey":"sk-new","baseUrl":"not a url"}"#,
        )
        .await;
        assert_eq!(reply["success"], false);
        assert!(!path.exists());
    }
}
