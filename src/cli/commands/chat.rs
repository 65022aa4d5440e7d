//! Plain chat without tools.

use crate::agent::{ChatEndpoint, CompletionRequest, Message};
use crate::cli::preflight;
use crate::cli::repl::{PromptLoop, QueryHandler};
use crate::cli::Output;
use crate::config::{ChatSettings, Settings};
use crate::error::Result;
use async_trait::async_trait;
use console::style;
use std::io;
use std::sync::Arc;
use tracing::{debug, info};

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, settings: Settings) -> anyhow::Result<()> {
    let endpoint = preflight::connect(&settings)?;
    let model = model.unwrap_or_else(|| settings.api.model.clone());
    let handler = ChatHandler::new(endpoint, &model, &settings.chat);

    println!("\n{}", style("Parley Chat").bold().cyan());
    println!("{}", style("Type your message, or 'quit' to exit.").dim());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let summary = PromptLoop::new("You:", "Grok:")
        .run(stdin.lock(), &mut stdout, &handler)
        .await?;
    info!("Chat ended after {} message(s)", summary.queries);
    Output::info("Goodbye!");
    Ok(())
}

/// Sends each input as a single user message; no history is kept.
pub(crate) struct ChatHandler {
    endpoint: Arc<dyn ChatEndpoint>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatHandler {
    pub(crate) fn new(endpoint: Arc<dyn ChatEndpoint>, model: &str, chat: &ChatSettings) -> Self {
        Self {
            endpoint,
            model: model.to_string(),
            temperature: chat.temperature,
            max_tokens: chat.max_tokens,
        }
    }

    pub(crate) fn request(&self, input: &str) -> CompletionRequest {
        CompletionRequest::new(&self.model, vec![Message::user(input)])
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }
}

#[async_trait]
impl QueryHandler for ChatHandler {
    async fn handle(&self, input: &str) -> Result<String> {
        debug!("Sending chat message ({} chars)", input.len());
        self.endpoint.complete_text(self.request(input)).await
    }
}
