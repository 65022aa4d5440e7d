//! Configuration module for Parley.
//!
//! Handles loading application settings and the agents' prompt text.

mod prompts;
mod settings;

pub use prompts::{
    ANALYSIS_SAMPLE_QUERIES, ANALYSIS_SYSTEM_PROMPT, RESEARCH_SAMPLE_QUERIES,
    RESEARCH_SYSTEM_PROMPT,
};
pub use settings::{ApiSettings, ChatSettings, DataSettings, Settings, WebSettings};
