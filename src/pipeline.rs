use anyhow::Error;

use crate::config::AppConfig;
use crate::services::deepseek::DeepSeekClient;
use crate::services::telegram::TelegramSource;
use crate::services::twitter::TwitterClient;
use crate::state::StateStore;
use crate::text::{
    build_thread, contains_cyrillic, extract_hashtags, ThreadOptions, DEFAULT_HASHTAG_LIMIT,
};

/// One processing cycle: fetch new channel posts, localize, build threads,
/// publish, and advance the watermark. Messages are handled strictly
/// sequentially.
pub struct Pipeline {
    source: TelegramSource,
    localizer: DeepSeekClient,
    publisher: TwitterClient,
    state_store: StateStore,
    thread_options: ThreadOptions,
    hashtag_limit: usize,
    dry_run: bool,
}

impl Pipeline {
    pub fn new(config: AppConfig, dry_run: bool) -> Result<Self, Error> {
        let state_store = StateStore::new(&config.state_path);

        let mut thread_options = ThreadOptions::default();
        if let Some(max) = config.max_tweet_chars {
            thread_options.max_len = max;
        }

        Ok(Self {
            source: TelegramSource::new(config.telegram)?,
            localizer: DeepSeekClient::new(config.deepseek)?,
            publisher: TwitterClient::new(config.twitter, dry_run)?,
            state_store,
            thread_options,
            hashtag_limit: config.hashtag_limit.unwrap_or(DEFAULT_HASHTAG_LIMIT),
            dry_run,
        })
    }

    pub async fn run(&self) -> Result<(), Error> {
        let state = self.state_store.read()?;
        let messages = self.source.fetch_new_messages(state.last_seen_id).await?;
        if messages.is_empty() {
            log::info!("no new messages (last_seen_id: {})", state.last_seen_id);
            return Ok(());
        }

        for message in messages {
            let localized = if contains_cyrillic(&message.text) {
                message.text.clone()
            } else {
                self.localizer.localize(&message.text).await?
            };

            let hashtags = extract_hashtags(&localized, self.hashtag_limit);
            let thread = build_thread(message.id, &localized, &hashtags, &self.thread_options);
            let tweet_ids = self.publisher.post_thread(&thread).await?;

            if !tweet_ids.is_empty() {
                self.state_store.update_last_seen(message.id, self.dry_run)?;
                log::info!(
                    "published message {} as a {}-tweet thread",
                    message.id,
                    tweet_ids.len()
                );
            }
        }
        Ok(())
    }
}
