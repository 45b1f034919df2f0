use crate::retry::{with_retries, Retryable, RetryPolicy};
use anyhow::Context;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use url::Url;

const DEFAULT_FETCH_LIMIT: u32 = 50;

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("Telegram API error (status {status}): {body}")]
    ApiStatus { status: u16, body: String },
    #[error("Telegram API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Retryable for TelegramError {
    fn is_retryable(&self) -> bool {
        match self {
            TelegramError::ApiStatus { status, .. } => *status == 429 || *status >= 500,
            TelegramError::Transport(_) => true,
            TelegramError::Other(_) => false,
        }
    }
}

fn deserialize_option_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    if let Some(s) = s {
        s.parse::<u32>().map(Some).map_err(serde::de::Error::custom)
    } else {
        Ok(None)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TelegramConfig {
    #[serde(rename = "telegram_bot_token")]
    pub bot_token: String,
    /// Channel username, with or without the leading `@`.
    #[serde(rename = "telegram_channel")]
    pub channel: String,
    #[serde(rename = "telegram_api_base", default = "default_api_base")]
    pub api_base: String,
    #[serde(
        rename = "telegram_fetch_limit",
        default,
        deserialize_with = "deserialize_option_u32"
    )]
    pub fetch_limit: Option<u32>,
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

/// A text post fetched from the source channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub id: i64,
    pub text: String,
    pub date: String,
}

/// Polls the Bot API for channel posts newer than the watermark.
pub struct TelegramSource {
    bot_token: String,
    channel: String,
    api_base: String,
    fetch_limit: u32,
    client: reqwest::Client,
    retry_policy: RetryPolicy,
}

#[derive(Deserialize, Debug)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Update {
    #[serde(default)]
    channel_post: Option<ChannelPost>,
}

#[derive(Deserialize, Debug)]
struct ChannelPost {
    message_id: i64,
    date: i64,
    #[serde(default)]
    text: Option<String>,
    chat: Chat,
}

#[derive(Deserialize, Debug)]
struct Chat {
    #[serde(default)]
    username: Option<String>,
}

impl TelegramSource {
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        Url::parse(&config.api_base).context("Invalid Telegram API base URL")?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("recaster/0.1")
            .build()
            .context("Failed to build Telegram HTTP client")?;
        Ok(Self {
            bot_token: config.bot_token,
            channel: config.channel.trim_start_matches('@').to_string(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            fetch_limit: config.fetch_limit.unwrap_or(DEFAULT_FETCH_LIMIT),
            client,
            retry_policy: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Returns posts from the configured channel with an id strictly greater
    /// than `last_seen_id`, ordered ascending by id.
    pub async fn fetch_new_messages(
        &self,
        last_seen_id: i64,
    ) -> Result<Vec<ChannelMessage>, TelegramError> {
        log::info!(
            "fetching channel posts for @{} (last_seen_id: {})...",
            self.channel,
            last_seen_id
        );
        let response =
            with_retries(&self.retry_policy, "Telegram getUpdates", || self.fetch_once()).await?;

        let mut messages: Vec<ChannelMessage> = response
            .result
            .into_iter()
            .filter_map(|update| update.channel_post)
            .filter(|post| {
                post.chat
                    .username
                    .as_deref()
                    .map(|name| name.eq_ignore_ascii_case(&self.channel))
                    .unwrap_or(false)
            })
            .filter(|post| post.message_id > last_seen_id)
            .filter_map(|post| {
                let text = post.text?;
                Some(ChannelMessage {
                    id: post.message_id,
                    text,
                    date: format_date(post.date),
                })
            })
            .collect();
        messages.sort_by_key(|message| message.id);

        log::info!("fetched {} new channel posts", messages.len());
        Ok(messages)
    }

    async fn fetch_once(&self) -> Result<UpdatesResponse, TelegramError> {
        let url = format!("{}/bot{}/getUpdates", self.api_base, self.bot_token);
        let limit = self.fetch_limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("allowed_updates", "[\"channel_post\"]"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TelegramError::ApiStatus { status, body });
        }

        let body = response.text().await?;
        let data: UpdatesResponse =
            serde_json::from_str(&body).context("Telegram getUpdates JSON")?;
        if !data.ok {
            return Err(TelegramError::Other(anyhow::anyhow!(
                "Telegram API returned ok=false: {}",
                data.description.unwrap_or_default()
            )));
        }
        Ok(data)
    }
}

fn format_date(epoch_secs: i64) -> String {
    chrono::DateTime::from_timestamp(epoch_secs, 0)
        .map(|date| date.to_rfc3339())
        .unwrap_or_default()
}
