pub mod emoji;
pub mod hashtags;
pub mod pack;
pub mod script;
pub mod thread;

pub use hashtags::{extract_hashtags, DEFAULT_HASHTAG_LIMIT};
pub use pack::pack;
pub use script::contains_cyrillic;
pub use thread::{build_thread, fit_hashtags, ThreadOptions, MAX_SEGMENT_LENGTH};
