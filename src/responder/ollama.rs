use super::{Responder, ResponderError, ResponderRequest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Reply used when the model answers without any content
pub const EMPTY_REPLY: &str = "Sorry, I could not generate a response.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatTurn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Responder backed by an Ollama server (`POST {base_url}/api/chat`)
pub struct OllamaResponder {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaResponder {
    /// Create a responder; `timeout` bounds each HTTP exchange
    pub fn new(base_url: String, model: String, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent("factorypulse/0.1")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait]
impl Responder for OllamaResponder {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn respond(&self, request: &ResponderRequest) -> Result<String, ResponderError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatTurn {
                    role: "system",
                    content: &request.system_context,
                },
                ChatTurn {
                    role: "user",
                    content: &request.user_message,
                },
            ],
            stream: false,
        };

        debug!(url = %url, model = %self.model, "Sending chat request");

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ResponderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResponderError::Status(status.as_u16()));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ResponderError::InvalidReply(e.to_string()))?;

        Ok(reply
            .message
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn request() -> ResponderRequest {
        ResponderRequest {
            system_context: "You are a Smart Factory AI Assistant.".to_string(),
            user_message: "What maintenance is needed?".to_string(),
        }
    }

    fn responder(url: String) -> OllamaResponder {
        OllamaResponder::new(url, "llama3".to_string(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_respond_returns_message_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama3",
                "stream": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": {"role": "assistant", "content": "Service Packaging Unit D4."}}"#)
            .create_async()
            .await;

        let reply = responder(server.url()).respond(&request()).await.unwrap();

        assert_eq!(reply, "Service Packaging Unit D4.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_content_uses_empty_reply() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"done": true}"#)
            .create_async()
            .await;

        let reply = responder(server.url()).respond(&request()).await.unwrap();
        assert_eq!(reply, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(500)
            .create_async()
            .await;

        let err = responder(server.url()).respond(&request()).await.unwrap_err();
        assert!(matches!(err, ResponderError::Status(500)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_reply() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = responder(server.url()).respond(&request()).await.unwrap_err();
        assert!(matches!(err, ResponderError::InvalidReply(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) on loopback is not expected to be listening
        let err = responder("http://127.0.0.1:9".to_string())
            .respond(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, ResponderError::Transport(_)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let r = responder("http://localhost:11434/".to_string());
        assert_eq!(r.base_url, "http://localhost:11434");
    }
}
