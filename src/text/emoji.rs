/// Keyword table as an ordered slice rather than a map, so the emoji prefix
/// is reproducible run to run.
const EMOJI_KEYWORDS: &[(&str, &str)] = &[
    ("листинг", "🆕"),
    ("listing", "🆕"),
    ("launchpool", "🚀"),
    ("maintenance", "🛠️"),
    ("upgrade", "🔧"),
    ("update", "🔄"),
    ("airdrop", "🎁"),
    ("bonus", "💰"),
    ("binance", "🟡"),
];

const DEFAULT_EMOJI: &str = "📢";

/// Prefixes the text with topic emoji selected by keyword match, falling
/// back to a generic announcement marker.
pub fn annotate(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut emojis: Vec<&str> = Vec::new();
    for &(keyword, emoji) in EMOJI_KEYWORDS {
        if lowered.contains(keyword) && !emojis.contains(&emoji) {
            emojis.push(emoji);
        }
    }
    if emojis.is_empty() {
        emojis.push(DEFAULT_EMOJI);
    }
    format!("{} {}", emojis.join(" "), text).trim().to_string()
}
