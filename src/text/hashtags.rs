use once_cell::sync::Lazy;
use regex::Regex;

static HASHTAG_WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9]{3,}").unwrap());

pub const DEFAULT_HASHTAG_LIMIT: usize = 2;

/// Derives up to `limit` hashtags from the text.
///
/// Candidates are maximal alphanumeric runs of at least 3 characters,
/// lower-cased, with purely numeric words dropped and duplicates removed in
/// first-occurrence order.
pub fn extract_hashtags(text: &str, limit: usize) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for word in HASHTAG_WORD_PATTERN.find_iter(text) {
        let word = word.as_str();
        if word.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let lowered = word.to_lowercase();
        if !unique.contains(&lowered) {
            unique.push(lowered);
        }
    }
    unique
        .into_iter()
        .take(limit)
        // The pattern already excludes these, but keep tags valid should it
        // ever widen.
        .map(|tag| format!("#{}", tag.replace(['/', '-'], "")))
        .collect()
}
