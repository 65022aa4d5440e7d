//! CLI command implementations.

mod agent;
mod ask;
mod chat;
mod config;
mod tools;

pub use agent::{run_analyze, run_research};
pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use tools::run_tools;
