pub mod deepseek;
pub mod telegram;
pub mod twitter;
