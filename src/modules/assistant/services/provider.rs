use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::core::{AppError, Result};
use crate::modules::assistant::models::ChatMessage;

/// Chat-completion backend behind the assistant
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Complete the conversation and return the assistant's text
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    fn name(&self) -> &str;
}

/// OpenAI-compatible `/chat/completions` client
pub struct OpenAiProvider {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    pub fn new(config: &AiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::Configuration("OPENAI_API_KEY is not set".to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::to_vec(&CompletionRequest {
            model: &self.model,
            messages,
            temperature: 0.2,
        })?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::Ai(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(AppError::Ai(format!(
                "Completion API error {}: {}",
                status, error_body
            )));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Ai(format!("Failed to parse completion response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AppError::Ai("Completion response had no content".to_string()))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_configuration_error() {
        let config = AiConfig {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 5,
            max_retries: 0,
        };
        assert!(matches!(
            OpenAiProvider::new(&config),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = AiConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://localhost:11434/v1/".to_string(),
            model: "local".to_string(),
            timeout_secs: 5,
            max_retries: 1,
        };
        let provider = OpenAiProvider::new(&config).unwrap();
        assert_eq!(provider.base_url, "http://localhost:11434/v1");
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_completion_response_shape() {
        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": " Hello "}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some(" Hello "));
    }
}
