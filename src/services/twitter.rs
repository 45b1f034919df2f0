use crate::retry::{with_retries, Retryable, RetryPolicy};
use anyhow::Context;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use url::Url;

/// Refresh the access token this long before its reported expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum TwitterError {
    #[error("Twitter credentials missing: set RECASTER_TWITTER_CLIENT_ID and RECASTER_TWITTER_REFRESH_TOKEN")]
    MissingCredentials,
    #[error("Twitter API error (status {status}): {body}")]
    ApiStatus { status: u16, body: String },
    #[error("Twitter request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Retryable for TwitterError {
    fn is_retryable(&self) -> bool {
        match self {
            TwitterError::ApiStatus { status, .. } => *status == 429 || *status >= 500,
            TwitterError::Transport(_) => true,
            TwitterError::MissingCredentials | TwitterError::Other(_) => false,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TwitterConfig {
    /// Required unless running with `--dry-run`.
    #[serde(rename = "twitter_client_id")]
    pub client_id: Option<String>,
    /// Required unless running with `--dry-run`.
    #[serde(rename = "twitter_refresh_token")]
    pub refresh_token: Option<String>,
    #[serde(rename = "twitter_redirect_uri", default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(rename = "twitter_api_base", default = "default_api_base")]
    pub api_base: String,
}

fn default_redirect_uri() -> String {
    "https://localhost".to_string()
}

fn default_api_base() -> String {
    "https://api.twitter.com".to_string()
}

struct Credentials {
    client_id: String,
    redirect_uri: String,
}

struct TokenState {
    /// Current refresh token; the token endpoint may rotate it.
    refresh_token: String,
    access_token: Option<String>,
    expires_at: Instant,
}

/// Posts tweet threads via the API v2, refreshing an OAuth2 access token
/// from the stored refresh token as needed.
pub struct TwitterClient {
    dry_run: bool,
    api_base: String,
    credentials: Option<Credentials>,
    token: Mutex<Option<TokenState>>,
    client: reqwest::Client,
    retry_policy: RetryPolicy,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Deserialize)]
struct TweetData {
    id: String,
}

impl TwitterClient {
    pub fn new(config: TwitterConfig, dry_run: bool) -> Result<Self, TwitterError> {
        Url::parse(&config.api_base).context("Invalid Twitter API base URL")?;

        let (credentials, token) = match (config.client_id, config.refresh_token) {
            (Some(client_id), Some(refresh_token)) => (
                Some(Credentials {
                    client_id,
                    redirect_uri: config.redirect_uri,
                }),
                Some(TokenState {
                    refresh_token,
                    access_token: None,
                    expires_at: Instant::now(),
                }),
            ),
            _ if dry_run => (None, None),
            _ => return Err(TwitterError::MissingCredentials),
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("recaster/0.1")
            .build()
            .context("Failed to build Twitter HTTP client")?;

        Ok(Self {
            dry_run,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credentials,
            token: Mutex::new(token),
            client,
            retry_policy: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Posts the segments in order as a reply chain and returns the tweet
    /// ids. Segment k+1 replies to segment k's id, so posting is strictly
    /// sequential.
    pub async fn post_thread(&self, segments: &[String]) -> Result<Vec<String>, TwitterError> {
        let mut tweet_ids = Vec::new();
        let mut previous_id: Option<String> = None;
        for text in segments {
            let mut payload = serde_json::json!({ "text": text });
            if let Some(prev) = &previous_id {
                payload["reply"] = serde_json::json!({ "in_reply_to_tweet_id": prev });
            }
            let tweet_id = self.create_tweet(&payload).await?;
            previous_id = Some(tweet_id.clone());
            tweet_ids.push(tweet_id);
        }
        Ok(tweet_ids)
    }

    async fn create_tweet(&self, payload: &serde_json::Value) -> Result<String, TwitterError> {
        if self.dry_run {
            let preview: String = payload["text"]
                .as_str()
                .unwrap_or_default()
                .chars()
                .take(50)
                .collect();
            log::info!("dry run: tweet not sent ({}...)", preview);
            return Ok("dry-run".to_string());
        }

        let access_token = self.access_token().await?;
        with_retries(&self.retry_policy, "Twitter create tweet", || {
            self.send_tweet(&access_token, payload)
        })
        .await
    }

    async fn send_tweet(
        &self,
        access_token: &str,
        payload: &serde_json::Value,
    ) -> Result<String, TwitterError> {
        let url = format!("{}/2/tweets", self.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TwitterError::ApiStatus { status, body });
        }

        let body = response.text().await?;
        let data: TweetResponse = serde_json::from_str(&body).context("Twitter tweet JSON")?;
        log::info!("tweet published (id: {})", data.data.id);
        Ok(data.data.id)
    }

    /// Returns a valid access token, refreshing it when missing or within
    /// a minute of expiry.
    async fn access_token(&self) -> Result<String, TwitterError> {
        let refresh_token = {
            let guard = self.token.lock().unwrap();
            let state = guard.as_ref().ok_or(TwitterError::MissingCredentials)?;
            match &state.access_token {
                Some(token) if Instant::now() + TOKEN_EXPIRY_MARGIN < state.expires_at => {
                    return Ok(token.clone());
                }
                _ => state.refresh_token.clone(),
            }
        };

        let credentials = self
            .credentials
            .as_ref()
            .ok_or(TwitterError::MissingCredentials)?;
        let response = with_retries(&self.retry_policy, "Twitter token refresh", || {
            self.refresh_access_token(credentials, &refresh_token)
        })
        .await?;

        let access_token = response.access_token.clone();
        let expires_in = response.expires_in.unwrap_or(3600);

        let mut guard = self.token.lock().unwrap();
        if let Some(state) = guard.as_mut() {
            state.access_token = Some(response.access_token);
            state.expires_at = Instant::now() + Duration::from_secs(expires_in);
            if let Some(rotated) = response.refresh_token {
                state.refresh_token = rotated;
            }
        }
        log::info!("refreshed Twitter access token (expires_in: {})", expires_in);
        Ok(access_token)
    }

    async fn refresh_access_token(
        &self,
        credentials: &Credentials,
        refresh_token: &str,
    ) -> Result<TokenResponse, TwitterError> {
        let url = format!("{}/2/oauth2/token", self.api_base);
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", credentials.client_id.as_str()),
            ("redirect_uri", credentials.redirect_uri.as_str()),
        ];
        let response = self.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TwitterError::ApiStatus { status, body });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .context("Twitter token JSON")
            .map_err(TwitterError::Other)
    }
}
