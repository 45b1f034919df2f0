use once_cell::sync::Lazy;
use regex::Regex;

static CYRILLIC_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new("[А-Яа-яЁё]").unwrap());

/// Returns true if the text already contains Cyrillic characters, in which
/// case localization can be skipped.
pub fn contains_cyrillic(text: &str) -> bool {
    CYRILLIC_PATTERN.is_match(text)
}
