pub mod config;
pub mod pipeline;
pub mod retry;
pub mod services;
pub mod state;
pub mod text;
