//! Parley - tool-calling chat agents
//!
//! Small agents that let an OpenAI-compatible chat model (xAI Grok by default)
//! call local tools and answer with the results.
//!
//! # Overview
//!
//! Parley ships two agents:
//! - A data analysis agent that runs SQL, statistics and reports over a seeded
//!   in-memory sales table
//! - A web research agent that fetches pages, searches the web and profiles
//!   competitor sites
//!
//! Both share one dispatch loop: the model is offered the tool schemas, every
//! requested call is executed in order, and a single follow-up request turns
//! the results into the final answer.
//!
//! # Architecture
//!
//! - `agent` - Conversation model, endpoint abstraction, tool kits and the dispatch loop
//! - `analysis` - Sales database, statistics and reports
//! - `research` - HTTP client, HTML extraction and web search
//! - `config` - Settings and prompts
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use parley::agent::{Agent, OpenAIEndpoint};
//! use parley::analysis::AnalysisToolKit;
//! use parley::config::{Settings, ANALYSIS_SYSTEM_PROMPT};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let endpoint = Arc::new(OpenAIEndpoint::from_settings(&settings.api)?);
//!     let toolkit = AnalysisToolKit::with_sample_data(settings.data.seed)?;
//!     let agent = Agent::new(endpoint, toolkit, &settings.api.model, ANALYSIS_SYSTEM_PROMPT);
//!
//!     let response = agent.run("What is the total revenue by region?").await?;
//!     println!("{}", response.content);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod openai;
pub mod research;

pub use error::{ParleyError, Result};
