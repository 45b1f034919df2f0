use crate::retry::{with_retries, Retryable, RetryPolicy};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const SYSTEM_PROMPT: &str = "Ты — аналитик Binance. Переведи или кратко перефразируй текст \
    на русский язык, сохранив ключевые факты и числа.";

#[derive(Debug, thiserror::Error)]
pub enum DeepSeekError {
    #[error("DeepSeek API error (status {status}): {body}")]
    ApiStatus { status: u16, body: String },
    #[error("DeepSeek request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("DeepSeek returned no completion choices")]
    EmptyCompletion,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Retryable for DeepSeekError {
    fn is_retryable(&self) -> bool {
        match self {
            DeepSeekError::ApiStatus { status, .. } => *status == 429 || *status >= 500,
            DeepSeekError::Transport(_) => true,
            DeepSeekError::EmptyCompletion | DeepSeekError::Other(_) => false,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct DeepSeekConfig {
    #[serde(rename = "deepseek_api_key")]
    pub api_key: String,
    #[serde(rename = "deepseek_base_url", default = "default_base_url")]
    pub base_url: String,
    #[serde(rename = "deepseek_model", default = "default_model")]
    pub model: String,
}

fn default_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

/// Chat-completion client used to translate or paraphrase announcements
/// into Russian.
pub struct DeepSeekClient {
    base_url: String,
    model: String,
    client: Client,
    retry_policy: RetryPolicy,
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
    content: String,
}

impl DeepSeekClient {
    pub fn new(config: DeepSeekConfig) -> Result<Self, DeepSeekError> {
        Url::parse(&config.base_url).context("Invalid DeepSeek base URL")?;
        let mut headers = HeaderMap::new();
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .context("Invalid DeepSeek API key for Authorization header")?;
        headers.insert(AUTHORIZATION, auth_value);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(20))
            .build()
            .context("Failed to build DeepSeek HTTP client")?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model,
            client,
            retry_policy: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Translates or paraphrases the text into Russian, preserving key
    /// facts and numbers.
    pub async fn localize(&self, text: &str) -> Result<String, DeepSeekError> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": text },
            ],
        });
        with_retries(&self.retry_policy, "DeepSeek chat completion", || {
            self.complete(&payload)
        })
        .await
    }

    async fn complete(&self, payload: &serde_json::Value) -> Result<String, DeepSeekError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self.client.post(&url).json(payload).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DeepSeekError::ApiStatus { status, body });
        }

        let body = response.text().await?;
        let data: CompletionResponse =
            serde_json::from_str(&body).context("DeepSeek completion JSON")?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or(DeepSeekError::EmptyCompletion)?;
        log::info!("received DeepSeek completion (model: {})", self.model);
        Ok(choice.message.content.trim().to_string())
    }
}
