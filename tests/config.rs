mod common;

use common::with_recaster_env;
use recaster::config::AppConfig;

fn required_env_vars() -> Vec<(&'static str, &'static str)> {
    vec![
        ("RECASTER_TELEGRAM_BOT_TOKEN", "bot_token"),
        ("RECASTER_TELEGRAM_CHANNEL", "binance_announcements"),
        ("RECASTER_DEEPSEEK_API_KEY", "ds_key"),
    ]
}

#[test]
fn test_config_loads_valid_config() {
    let _guard = with_recaster_env(required_env_vars());

    let config = AppConfig::from_env().expect("Failed to parse config");

    assert_eq!(config.telegram.bot_token, "bot_token");
    assert_eq!(config.telegram.channel, "binance_announcements");
    assert_eq!(config.deepseek.api_key, "ds_key");
    // Check defaults
    assert_eq!(config.telegram.api_base, "https://api.telegram.org");
    assert_eq!(config.deepseek.base_url, "https://api.deepseek.com");
    assert_eq!(config.deepseek.model, "deepseek-chat");
    assert_eq!(config.twitter.redirect_uri, "https://localhost");
    assert_eq!(config.twitter.api_base, "https://api.twitter.com");
    assert_eq!(config.twitter.client_id, None);
    assert_eq!(config.state_path, "state.json");
    assert_eq!(config.max_tweet_chars, None);
}

#[test]
fn test_config_with_optional_fields() {
    let mut vars = required_env_vars();
    vars.extend([
        ("RECASTER_DEEPSEEK_MODEL", "deepseek-reasoner"),
        ("RECASTER_TELEGRAM_FETCH_LIMIT", "10"),
        ("RECASTER_TWITTER_CLIENT_ID", "client_id"),
        ("RECASTER_TWITTER_REFRESH_TOKEN", "refresh"),
        ("RECASTER_STATE_PATH", "/tmp/recaster-state.json"),
        ("RECASTER_MAX_TWEET_CHARS", "240"),
        ("RECASTER_HASHTAG_LIMIT", "3"),
    ]);
    let _guard = with_recaster_env(vars);

    let config = AppConfig::from_env().expect("Failed to parse config");

    assert_eq!(config.deepseek.model, "deepseek-reasoner");
    assert_eq!(config.telegram.fetch_limit, Some(10));
    assert_eq!(config.twitter.client_id, Some("client_id".to_string()));
    assert_eq!(config.twitter.refresh_token, Some("refresh".to_string()));
    assert_eq!(config.state_path, "/tmp/recaster-state.json");
    assert_eq!(config.max_tweet_chars, Some(240));
    assert_eq!(config.hashtag_limit, Some(3));
}

#[test]
fn test_config_missing_required_fields() {
    let _guard = with_recaster_env(vec![
        ("RECASTER_TELEGRAM_BOT_TOKEN", "bot_token"),
        // Missing TELEGRAM_CHANNEL and DEEPSEEK_API_KEY
    ]);

    let config = AppConfig::from_env();
    assert!(config.is_err());
}
