pub mod action;
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod mode;
pub mod pipeline;
pub mod prompt;
pub mod schema;
pub mod session;
pub mod sql;
pub mod tui;
pub mod utils;
