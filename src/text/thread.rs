use super::emoji;
use super::pack::{pack, truncate_chars};

pub const MAX_SEGMENT_LENGTH: usize = 280;

const FOOTER_LINKS: &str = "Полезные ссылки Binance:\n\
    • Биржа: https://www.binance.com\n\
    • Поддержка: https://www.binance.com/support\n\
    • Академия: https://academy.binance.com";

const SOURCE_URL_BASE: &str = "https://t.me/binance_announcements";

/// Knobs for thread assembly. Defaults match the Binance announcements feed
/// and the Twitter character budget.
#[derive(Debug, Clone)]
pub struct ThreadOptions {
    pub max_len: usize,
    pub source_url_base: String,
    pub footer: String,
}

impl Default for ThreadOptions {
    fn default() -> Self {
        Self {
            max_len: MAX_SEGMENT_LENGTH,
            source_url_base: SOURCE_URL_BASE.to_string(),
            footer: FOOTER_LINKS.to_string(),
        }
    }
}

/// Builds the ordered tweet thread for one channel message: emoji-annotated
/// body, source link, fitted hashtag line, and the fixed links footer, each
/// segment within `opts.max_len` characters.
pub fn build_thread(
    message_id: i64,
    text: &str,
    hashtags: &[String],
    opts: &ThreadOptions,
) -> Vec<String> {
    let annotated = emoji::annotate(text);
    let source_line = format!("Источник: {}/{}", opts.source_url_base, message_id);
    let body = format!("{}\n\n{}", annotated, source_line);
    let body = body.trim();

    let mut segments = pack(body, opts.max_len);
    if segments.is_empty() && !body.is_empty() {
        segments.push(truncate_chars(body, opts.max_len));
    }

    let hashtags_line = fit_hashtags(hashtags, opts.max_len).join(" ");
    if !hashtags_line.is_empty() && !segments.is_empty() {
        let appended_len = segments
            .last()
            .map(|last| last.chars().count() + 2 + hashtags_line.chars().count())
            .unwrap_or(usize::MAX);
        if appended_len <= opts.max_len {
            if let Some(last) = segments.last_mut() {
                *last = format!("{}\n\n{}", last, hashtags_line);
            }
        } else {
            let mut tag_segments = pack(&hashtags_line, opts.max_len);
            if tag_segments.is_empty() {
                tag_segments.push(truncate_chars(&hashtags_line, opts.max_len));
            }
            segments.extend(tag_segments);
        }
    }

    segments.extend(pack(&opts.footer, opts.max_len));

    segments
}

/// Selects the maximal prefix of the tags whose space-joined rendering fits
/// the budget, stopping at the first tag that would overflow.
pub fn fit_hashtags(hashtags: &[String], max_len: usize) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    let mut current_length = 0usize;
    for tag in hashtags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        let tag_len = tag.chars().count();
        let proposed = if result.is_empty() {
            tag_len
        } else {
            current_length + 1 + tag_len
        };
        if proposed > max_len {
            break;
        }
        result.push(tag.to_string());
        current_length = proposed;
    }
    result
}
