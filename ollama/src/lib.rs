//! Minimal client for a local Ollama instance.
//!
//! This crate provides a focused client for Ollama's generate and chat
//! endpoints with:
//! - Non-streaming completions with per-request temperature and system prompt
//! - A fast liveness probe and model listing
//! - Structured errors for timeouts and connection failures

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.2";

/// Timeout for the liveness probe.
const STATUS_TIMEOUT: Duration = Duration::from_secs(2);
/// Timeout for listing models.
const LIST_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for generation and chat. Generation latency is high.
const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors that can occur when talking to Ollama.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot connect to Ollama: {0}")]
    Network(String),

    #[error("Request timeout - the model took too long to respond")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl Error {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(e.to_string())
        }
    }
}

/// Result of the liveness probe. A failed probe is a value, not an error.
#[derive(Debug, Clone)]
pub struct ServerStatus {
    /// Whether the server answered the probe.
    pub reachable: bool,

    /// Why it didn't, if it didn't.
    pub error: Option<String>,
}

/// Ollama API client.
#[derive(Clone)]
pub struct Ollama {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl Default for Ollama {
    fn default() -> Self {
        Self::new()
    }
}

impl Ollama {
    /// Create a client pointed at the default local instance.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(GENERATE_TIMEOUT)
                .connect_timeout(Duration::from_secs(5))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create a client honoring the `OLLAMA_HOST` environment variable,
    /// falling back to the default local instance.
    pub fn from_env() -> Self {
        match std::env::var("OLLAMA_HOST") {
            Ok(host) if !host.trim().is_empty() => Self::new().with_base_url(host),
            _ => Self::new(),
        }
    }

    /// Point the client at a different Ollama instance.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Check whether the Ollama server is running and accessible.
    ///
    /// This never returns an error; unreachability is reported in the
    /// returned status so callers can surface it directly.
    pub async fn status(&self) -> ServerStatus {
        let result = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(STATUS_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => ServerStatus {
                reachable: true,
                error: None,
            },
            Ok(response) => ServerStatus {
                reachable: false,
                error: Some(format!("HTTP {}", response.status().as_u16())),
            },
            Err(e) if e.is_timeout() => ServerStatus {
                reachable: false,
                error: Some("Connection timeout".to_string()),
            },
            Err(_) => ServerStatus {
                reachable: false,
                error: Some("Cannot connect to Ollama. Is it running?".to_string()),
            },
        }
    }

    /// List the names of all locally available models.
    pub async fn list_models(&self) -> Result<Vec<String>, Error> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(LIST_TIMEOUT)
            .send()
            .await
            .map_err(Error::from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let tags: ApiTagsResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Send a single-prompt generation request and return the response text.
    pub async fn generate(&self, request: GenerateRequest) -> Result<String, Error> {
        let payload = ApiGenerateRequest {
            model: request.model.unwrap_or_else(|| self.model.clone()),
            prompt: request.prompt,
            stream: false,
            options: ApiOptions {
                temperature: request.temperature,
            },
            system: request.system,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .headers(json_headers())
            .json(&payload)
            .send()
            .await
            .map_err(Error::from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let api_response: ApiGenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(api_response.response)
    }

    /// Send a chat request with conversation history and return the reply text.
    pub async fn chat(&self, request: ChatRequest) -> Result<String, Error> {
        let payload = ApiChatRequest {
            model: request.model.unwrap_or_else(|| self.model.clone()),
            messages: request.messages,
            stream: false,
            options: ApiOptions {
                temperature: request.temperature,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .headers(json_headers())
            .json(&payload)
            .send()
            .await
            .map_err(Error::from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let api_response: ApiChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(api_response.message.content)
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

// ============================================================================
// Public types
// ============================================================================

/// A generation request against a single prompt.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub model: Option<String>,
    pub temperature: f32,
    pub system: Option<String>,
}

impl GenerateRequest {
    /// Create a new request with the given prompt and default settings.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            temperature: 0.8,
            system: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// A chat request with full conversation history.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    pub temperature: f32,
}

impl ChatRequest {
    /// Create a new chat request with the given messages.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: 0.8,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// A message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: ApiOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ApiOptions,
}

#[derive(Debug, Serialize)]
struct ApiOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ApiGenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    #[serde(default)]
    message: ApiChatMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ApiChatMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiTagsResponse {
    #[serde(default)]
    models: Vec<ApiModel>,
}

#[derive(Debug, Deserialize)]
struct ApiModel {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_defaults() {
        let client = Ollama::new();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_client_builders() {
        let client = Ollama::new()
            .with_base_url("http://192.168.1.10:11434")
            .with_model("mistral");
        assert_eq!(client.base_url, "http://192.168.1.10:11434");
        assert_eq!(client.model, "mistral");
    }

    #[test]
    fn test_generate_request_builder() {
        let request = GenerateRequest::new("Describe a castle")
            .with_model("llama3.1")
            .with_temperature(0.2)
            .with_system("You only respond with JSON");

        assert_eq!(request.prompt, "Describe a castle");
        assert_eq!(request.model.as_deref(), Some("llama3.1"));
        assert_eq!(request.temperature, 0.2);
        assert!(request.system.is_some());
    }

    #[test]
    fn test_role_serialization() {
        let msg = ChatMessage::user("hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"user\""));

        let msg = ChatMessage::system("context");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"system\""));
    }

    #[test]
    fn test_tags_response_parsing() {
        let body = r#"{"models":[{"name":"llama3.2","size":123},{"name":"mistral"}]}"#;
        let tags: ApiTagsResponse = serde_json::from_str(body).unwrap();
        let names: Vec<_> = tags.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["llama3.2", "mistral"]);
    }

    #[test]
    fn test_chat_response_parsing() {
        let body = r#"{"message":{"role":"assistant","content":"Once upon a time"}}"#;
        let parsed: ApiChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.content, "Once upon a time");
    }

    #[test]
    fn test_empty_generate_response() {
        let parsed: ApiGenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.response, "");
    }
}
