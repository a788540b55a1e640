//! LLM Client: the single point of entry for calls to the assessment service.
//!
//! Talks to an Ollama-compatible `/api/chat` endpoint, usually hosted on the
//! same machine. One non-streaming request per call, no retry: a failure is
//! reported to the caller and the batch moves on.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::LlmSettings;

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network error calling the assessment service: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Assessment service returned status {status}")]
    Http { status: u16, body: String },

    #[error("Assessment service returned an empty reply")]
    EmptyResponse,

    #[error("Reply is not in the expected JSON format: {0}")]
    ResponseFormat(String),
}

/// Sends one system + user exchange and returns the reply text.
///
/// `AppState` carries an `Arc<dyn ChatBackend>` so tests can swap the remote
/// service for an in-process fake.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl LlmClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    async fn chat(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            stream: false,
            temperature: self.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| LlmError::ResponseFormat(format!("service payload is not JSON ({e})")))?;

        let text = reply_text(&payload).ok_or(LlmError::EmptyResponse)?;
        debug!("Assessment reply received ({} chars)", text.len());
        Ok(text.to_string())
    }
}

/// First non-empty of `message.content`, `response`, `choices[0].message.content`.
/// Covers Ollama chat, Ollama generate and OpenAI-style payloads.
fn reply_text(payload: &Value) -> Option<&str> {
    ["/message/content", "/response", "/choices/0/message/content"]
        .iter()
        .filter_map(|pointer| payload.pointer(pointer).and_then(Value::as_str))
        .find(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn settings_for(base_url: String) -> LlmSettings {
        LlmSettings {
            base_url,
            model: "mistral".to_string(),
            temperature: 0.2,
            max_excerpt_chars: 4000,
            timeout_secs: 5,
        }
    }

    /// Serves `router` on an ephemeral local port and returns its base URL.
    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_reply_text_ollama_chat_shape() {
        let payload = json!({"message": {"role": "assistant", "content": "{}"}});
        assert_eq!(reply_text(&payload), Some("{}"));
    }

    #[test]
    fn test_reply_text_falls_through_empty_fields() {
        let payload = json!({
            "message": {"content": ""},
            "response": "",
            "choices": [{"message": {"content": "from choices"}}]
        });
        assert_eq!(reply_text(&payload), Some("from choices"));
    }

    #[test]
    fn test_reply_text_generate_shape() {
        assert_eq!(reply_text(&json!({"response": "hi"})), Some("hi"));
        assert_eq!(reply_text(&json!({"done": true})), None);
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let client = LlmClient::new(&settings_for("http://localhost:11434/".to_string())).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/api/chat");
        assert_eq!(client.model(), "mistral");
    }

    #[tokio::test]
    async fn test_chat_sends_two_message_exchange() {
        let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&captured);
        let router = Router::new().route(
            "/api/chat",
            post(move |Json(body): Json<Value>| {
                let sink = Arc::clone(&sink);
                async move {
                    *sink.lock().unwrap() = Some(body);
                    Json(json!({"message": {"role": "assistant", "content": "{\"score\": 70}"}}))
                }
            }),
        );
        let base_url = spawn_server(router).await;
        let client = LlmClient::new(&settings_for(base_url)).unwrap();

        let reply = client.chat("system rules", "user prompt").await.unwrap();
        assert_eq!(reply, "{\"score\": 70}");

        let body = captured.lock().unwrap().take().unwrap();
        assert_eq!(body["model"], "mistral");
        assert_eq!(body["stream"], false);
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "system rules");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "user prompt");
    }

    #[tokio::test]
    async fn test_chat_non_success_status_is_http_error() {
        let router = Router::new().route(
            "/api/chat",
            post(|| async { (StatusCode::NOT_FOUND, "model 'mistral' not found") }),
        );
        let client = LlmClient::new(&settings_for(spawn_server(router).await)).unwrap();

        match client.chat("s", "p").await {
            Err(LlmError::Http { status, body }) => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_empty_content_is_empty_response() {
        let router = Router::new().route(
            "/api/chat",
            post(|| async { Json(json!({"message": {"content": ""}, "done": true})) }),
        );
        let client = LlmClient::new(&settings_for(spawn_server(router).await)).unwrap();
        assert!(matches!(
            client.chat("s", "p").await,
            Err(LlmError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_chat_non_json_payload_is_format_error() {
        let router = Router::new().route("/api/chat", post(|| async { "plain text body" }));
        let client = LlmClient::new(&settings_for(spawn_server(router).await)).unwrap();
        assert!(matches!(
            client.chat("s", "p").await,
            Err(LlmError::ResponseFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_chat_unreachable_host_is_network_error() {
        // Bind then drop to get a port with nothing listening on it
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = LlmClient::new(&settings_for(format!("http://{addr}"))).unwrap();
        assert!(matches!(
            client.chat("s", "p").await,
            Err(LlmError::Network(_))
        ));
    }
}
