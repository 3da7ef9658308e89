//! Chat completion client for OpenAI-compatible endpoints

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::ChatLensError;
use crate::errors::Result;

/// Sampling parameters for one completion request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    /// Request `response_format: {"type": "json_object"}`
    pub json_mode: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            json_mode: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Thin wrapper around a `/chat/completions` endpoint
#[derive(Debug, Clone)]
pub struct LlmService {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl LlmService {
    /// Create a service from the `[llm]` config section
    ///
    /// # Errors
    /// - Missing API key (neither in the config nor in the environment)
    /// - HTTP client build errors
    pub fn new(config: &AppConfig) -> Result<Self> {
        let api_key = config.llm_key();
        if api_key.is_empty() {
            return Err(ChatLensError::ConfigError(format!(
                "no LLM API key configured; set llm.llm_key or {}",
                crate::config::LLM_KEY_ENV
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm.request_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.llm_endpoint().trim_end_matches('/').to_string(),
            api_key,
            model: config.llm_model().to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Single-turn completion
    ///
    /// # Errors
    /// - Network failures and timeouts
    /// - Non-success HTTP status
    /// - A response without `choices[0].message.content`
    pub async fn generate_with_params(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            response_format: params.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };
        debug!(
            url = %url,
            model = %self.model,
            prompt_len = prompt.len(),
            "Calling chat completions API"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ChatLensError::Llm(format!(
                "API error ({status}): {error_text}"
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ChatLensError::Llm(format!("Failed to parse response: {e}")))?;
        extract_content(body)
    }
}

fn extract_content(body: ChatResponse) -> Result<String> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ChatLensError::Llm("No message content in response".to_string()))
}
