use crate::services::deepseek::DeepSeekConfig;
use crate::services::telegram::TelegramConfig;
use crate::services::twitter::TwitterConfig;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    #[serde(flatten)]
    pub telegram: TelegramConfig,
    #[serde(flatten)]
    pub deepseek: DeepSeekConfig,
    #[serde(flatten)]
    pub twitter: TwitterConfig,

    #[serde(default = "default_state_path")]
    pub state_path: String,
    #[serde(default, deserialize_with = "deserialize_option_usize")]
    pub max_tweet_chars: Option<usize>,
    #[serde(default, deserialize_with = "deserialize_option_usize")]
    pub hashtag_limit: Option<usize>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(envy::prefixed("RECASTER_").from_env::<AppConfig>()?)
    }
}

fn default_state_path() -> String {
    "state.json".to_string()
}

fn deserialize_option_usize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    if let Some(s) = s {
        s.parse::<usize>()
            .map(Some)
            .map_err(serde::de::Error::custom)
    } else {
        Ok(None)
    }
}
