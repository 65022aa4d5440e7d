//! One-shot prompt command.

use super::chat::ChatHandler;
use crate::cli::preflight;
use crate::cli::repl::QueryHandler;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Send a single prompt without tools and print the reply.
pub async fn run_ask(prompt: &str, model: Option<String>, settings: Settings) -> Result<()> {
    if prompt.trim().is_empty() {
        anyhow::bail!("Prompt must not be empty");
    }

    let endpoint = preflight::connect(&settings)?;
    let model = model.unwrap_or_else(|| settings.api.model.clone());
    let handler = ChatHandler::new(endpoint, &model, &settings.chat);

    let spinner = Output::spinner("Thinking...");
    let reply = handler.handle(prompt.trim()).await;
    spinner.finish_and_clear();

    match reply {
        Ok(text) => {
            println!("\n{}\n", text);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("{}", e));
            Err(e.into())
        }
    }
}
