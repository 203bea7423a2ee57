//! LLM API client for Ollama, OpenAI-compatible and Gemini endpoints

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use serde_json::Value;
use tracing::debug;

use super::ChatMessage;
use super::ChatRole;
use crate::config::AppConfig;
use crate::config::LlmConfig;
use crate::config::ProviderKind;
use crate::errors::HelpdeskError;
use crate::errors::Result;
use crate::rag::AnswerGenerator;
use crate::rag::Prompt;

/// Chat-completion client with model and sampling fixed at construction
#[derive(Clone)]
pub struct LlmService {
    provider: ProviderKind,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: Client,
}

impl LlmService {
    /// Create a new LLM service
    ///
    /// # Errors
    /// - Missing API key for OpenAI or Gemini
    /// - HTTP client build errors
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::from_llm_config(&config.llm)
    }

    /// Create from the `[llm]` config section
    ///
    /// # Errors
    /// - Missing API key for OpenAI or Gemini
    /// - HTTP client build errors
    pub fn from_llm_config(config: &LlmConfig) -> Result<Self> {
        let needs_key = matches!(config.provider, ProviderKind::OpenAI | ProviderKind::Gemini);
        if needs_key && config.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(HelpdeskError::ConfigError(format!(
                "LLM provider {} requires llm.api_key (or HELPDESK__LLM__API_KEY)",
                config.provider
            )));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HelpdeskError::HttpError(e.to_string()))?;

        Ok(Self {
            provider: config.provider,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    /// Send a chat conversation and return the assistant text
    ///
    /// # Errors
    /// - Network errors and timeouts
    /// - Non-success status codes (quota, auth, invalid model)
    /// - Malformed response bodies
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let (url, body) = self.build_request(messages);
        debug!("Calling {} chat API: {}", self.provider, self.model);

        let mut request = self.client.post(&url).json(&body);
        match self.provider {
            ProviderKind::OpenAI => {
                if let Some(key) = &self.api_key {
                    request = request.header("Authorization", format!("Bearer {key}"));
                }
            }
            ProviderKind::Gemini => {
                if let Some(key) = &self.api_key {
                    request = request.header("x-goog-api-key", key);
                }
            }
            ProviderKind::Ollama => {}
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                HelpdeskError::LlmError(format!("Request to {} timed out", self.provider))
            } else {
                HelpdeskError::HttpError(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(HelpdeskError::LlmError(format!(
                "{} API error ({status}): {error_text}",
                self.provider
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| HelpdeskError::LlmError(format!("Failed to parse response: {e}")))?;

        self.extract_text(body)
    }

    fn build_request(&self, messages: &[ChatMessage]) -> (String, Value) {
        match self.provider {
            ProviderKind::Ollama => (
                format!("{}/api/chat", self.endpoint),
                json!({
                    "model": self.model,
                    "messages": messages,
                    "stream": false,
                    "options": {
                        "temperature": self.temperature,
                        "num_predict": self.max_tokens,
                    },
                }),
            ),
            ProviderKind::OpenAI => (
                format!("{}/chat/completions", self.endpoint),
                json!({
                    "model": self.model,
                    "messages": messages,
                    "temperature": self.temperature,
                    "max_tokens": self.max_tokens,
                }),
            ),
            ProviderKind::Gemini => {
                let system: Vec<&str> = messages
                    .iter()
                    .filter(|m| m.role == ChatRole::System)
                    .map(|m| m.content.as_str())
                    .collect();
                let contents: Vec<Value> = messages
                    .iter()
                    .filter(|m| m.role != ChatRole::System)
                    .map(|m| {
                        let role = if m.role == ChatRole::Assistant {
                            "model"
                        } else {
                            "user"
                        };
                        json!({"role": role, "parts": [{"text": m.content}]})
                    })
                    .collect();

                let mut body = json!({
                    "contents": contents,
                    "generationConfig": {
                        "temperature": self.temperature,
                        "maxOutputTokens": self.max_tokens,
                    },
                });
                if !system.is_empty() {
                    body["system_instruction"] = json!({"parts": [{"text": system.join("\n\n")}]});
                }

                (
                    format!("{}/models/{}:generateContent", self.endpoint, self.model),
                    body,
                )
            }
        }
    }

    fn extract_text(&self, body: Value) -> Result<String> {
        #[derive(Deserialize)]
        struct OllamaResponse {
            message: ChatMessage,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            choices: Vec<OpenAIChoice>,
        }

        #[derive(Deserialize)]
        struct OpenAIChoice {
            message: ChatMessage,
        }

        #[derive(Deserialize)]
        struct GeminiResponse {
            #[serde(default)]
            candidates: Vec<GeminiCandidate>,
        }

        #[derive(Deserialize)]
        struct GeminiCandidate {
            content: Option<GeminiContent>,
        }

        #[derive(Deserialize)]
        struct GeminiContent {
            #[serde(default)]
            parts: Vec<GeminiPart>,
        }

        #[derive(Deserialize)]
        struct GeminiPart {
            text: Option<String>,
        }

        let malformed =
            |e: serde_json::Error| HelpdeskError::LlmError(format!("Malformed response: {e}"));

        match self.provider {
            ProviderKind::Ollama => {
                let response: OllamaResponse = serde_json::from_value(body).map_err(malformed)?;
                Ok(response.message.content)
            }
            ProviderKind::OpenAI => {
                let response: OpenAIResponse = serde_json::from_value(body).map_err(malformed)?;
                response
                    .choices
                    .into_iter()
                    .next()
                    .map(|c| c.message.content)
                    .ok_or_else(|| HelpdeskError::LlmError("No choices in response".to_string()))
            }
            ProviderKind::Gemini => {
                let response: GeminiResponse = serde_json::from_value(body).map_err(malformed)?;
                let candidate = response.candidates.into_iter().next().ok_or_else(|| {
                    HelpdeskError::LlmError("No candidates in response".to_string())
                })?;
                let text: String = candidate
                    .content
                    .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
                    .unwrap_or_default();
                Ok(text)
            }
        }
    }
}

#[async_trait]
impl AnswerGenerator for LlmService {
    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let messages = [
            ChatMessage::system(prompt.system.clone()),
            ChatMessage::user(prompt.question.clone()),
        ];
        self.chat(&messages).await
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
