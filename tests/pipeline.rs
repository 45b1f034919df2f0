use recaster::config::AppConfig;
use recaster::pipeline::Pipeline;
use recaster::services::deepseek::DeepSeekConfig;
use recaster::services::telegram::TelegramConfig;
use recaster::services::twitter::TwitterConfig;
use recaster::state::StateStore;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_config(server: &MockServer, state_path: &Path) -> AppConfig {
    AppConfig {
        telegram: TelegramConfig {
            bot_token: "bot".to_string(),
            channel: "binance_announcements".to_string(),
            api_base: server.uri(),
            fetch_limit: None,
        },
        deepseek: DeepSeekConfig {
            api_key: "ds-key".to_string(),
            base_url: server.uri(),
            model: "deepseek-chat".to_string(),
        },
        twitter: TwitterConfig {
            client_id: Some("client-id".to_string()),
            refresh_token: Some("refresh-token".to_string()),
            redirect_uri: "https://localhost".to_string(),
            api_base: server.uri(),
        },
        state_path: state_path.to_string_lossy().into_owned(),
        max_tweet_chars: None,
        hashtag_limit: None,
    }
}

async fn mount_updates(server: &MockServer, text: &str) {
    Mock::given(method("GET"))
        .and(path("/botbot/getUpdates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": [
                {
                    "update_id": 100,
                    "channel_post": {
                        "message_id": 7,
                        "date": 1_700_000_000,
                        "text": text,
                        "chat": { "id": 1, "type": "channel", "username": "binance_announcements" }
                    }
                }
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/2/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "access-token",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn advances_watermark_after_successful_thread() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let state_path = dir.path().join("state.json");

    mount_updates(&server, "Binance lists XYZ").await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Binance добавляет XYZ" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "data": { "id": "9001" }
        })))
        .mount(&server)
        .await;

    let pipeline =
        Pipeline::new(app_config(&server, &state_path), false).expect("Failed to build pipeline");
    pipeline.run().await.expect("Pipeline run failed");

    let state = StateStore::new(&state_path).read().expect("Failed to read state");
    assert_eq!(state.last_seen_id, 7);
}

#[tokio::test]
async fn keeps_watermark_when_posting_fails() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let state_path = dir.path().join("state.json");

    // Cyrillic text: localization is skipped, no completion mock needed
    mount_updates(&server, "Обновление кошелька BTC").await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let pipeline =
        Pipeline::new(app_config(&server, &state_path), false).expect("Failed to build pipeline");
    let err = pipeline.run().await.expect_err("Expected posting failure");
    assert!(err.to_string().contains("403"));

    let state = StateStore::new(&state_path).read().expect("Failed to read state");
    assert_eq!(state.last_seen_id, 0);
}

#[tokio::test]
async fn dry_run_does_not_persist_watermark() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let state_path = dir.path().join("state.json");

    mount_updates(&server, "Обновление кошелька BTC").await;
    // No token or tweet mocks: dry run must not touch the posting API

    let mut config = app_config(&server, &state_path);
    config.twitter.client_id = None;
    config.twitter.refresh_token = None;

    let pipeline = Pipeline::new(config, true).expect("Failed to build pipeline");
    pipeline.run().await.expect("Pipeline run failed");

    let state = StateStore::new(&state_path).read().expect("Failed to read state");
    assert_eq!(state.last_seen_id, 0);
}
