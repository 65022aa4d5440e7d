//! Interactive agent commands: data analysis and web research.

use crate::agent::{Agent, AgentResponse, ToolKit};
use crate::analysis::AnalysisToolKit;
use crate::cli::output::truncate;
use crate::cli::preflight;
use crate::cli::repl::{PromptLoop, QueryHandler};
use crate::cli::Output;
use crate::config::{
    Settings, ANALYSIS_SAMPLE_QUERIES, ANALYSIS_SYSTEM_PROMPT, RESEARCH_SAMPLE_QUERIES,
    RESEARCH_SYSTEM_PROMPT,
};
use crate::error::Result;
use crate::research::ResearchToolKit;
use anyhow::Context;
use async_trait::async_trait;
use console::style;
use std::io;
use tracing::info;

/// Run the interactive data analysis agent.
pub async fn run_analyze(model: Option<String>, settings: Settings) -> anyhow::Result<()> {
    let endpoint = preflight::connect(&settings)?;
    let model = model.unwrap_or_else(|| settings.api.model.clone());

    let toolkit = AnalysisToolKit::with_sample_data(settings.data.seed)
        .context("Failed to build the sample sales database")?;
    let agent = Agent::new(endpoint, toolkit, &model, ANALYSIS_SYSTEM_PROMPT);

    Output::banner("Parley Data Analysis Agent");
    Output::info("Sample queries:");
    Output::numbered(ANALYSIS_SAMPLE_QUERIES);
    println!("\nEnter your analysis request (or 'quit' to exit):");

    let session = AgentSession::new(agent, "Analyzing...");
    run_loop(&session, "Query:", "Analysis Result:").await
}

/// Run the interactive web research agent.
pub async fn run_research(model: Option<String>, settings: Settings) -> anyhow::Result<()> {
    let endpoint = preflight::connect(&settings)?;
    let model = model.unwrap_or_else(|| settings.api.model.clone());

    let toolkit = ResearchToolKit::from_settings(&settings.web)
        .context("Failed to create the HTTP client")?;
    let agent = Agent::new(endpoint, toolkit, &model, RESEARCH_SYSTEM_PROMPT);

    Output::banner("Parley Web Research Agent");
    Output::info("Sample research queries:");
    Output::numbered(RESEARCH_SAMPLE_QUERIES);
    println!("\nEnter your research request (or 'quit' to exit):");

    let session = AgentSession::new(agent, "Researching...");
    run_loop(&session, "Research Query:", "Research Results:").await
}

async fn run_loop(handler: &dyn QueryHandler, prompt: &str, reply_label: &str) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let summary = PromptLoop::new(prompt, reply_label)
        .run(stdin.lock(), &mut stdout, handler)
        .await?;
    info!(
        "Session ended after {} quer(ies), {} error(s)",
        summary.queries, summary.errors
    );
    Output::info("Goodbye!");
    Ok(())
}

/// Adapts an agent to the prompt loop, showing a spinner and a tool trace.
struct AgentSession<K: ToolKit> {
    agent: Agent<K>,
    spinner_message: &'static str,
}

impl<K: ToolKit> AgentSession<K> {
    fn new(agent: Agent<K>, spinner_message: &'static str) -> Self {
        Self {
            agent,
            spinner_message,
        }
    }
}

#[async_trait]
impl<K: ToolKit> QueryHandler for AgentSession<K> {
    async fn handle(&self, input: &str) -> Result<String> {
        let spinner = Output::spinner(self.spinner_message);
        let result = self.agent.run(input).await;
        spinner.finish_and_clear();
        result.map(|response| format_response(&response))
    }
}

fn format_response(response: &AgentResponse) -> String {
    if response.tool_calls.is_empty() {
        return response.content.clone();
    }

    let trace = response
        .tool_calls
        .iter()
        .map(|call| {
            let mark = if call.success {
                style("✓").green()
            } else {
                style("✗").red()
            };
            format!(
                "  {} {} {}",
                mark,
                style(&call.name).dim(),
                style(truncate(&call.arguments, 60)).dim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n\n{}", trace, response.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ToolCallRecord;

    #[test]
    fn test_format_response_without_tools_is_plain() {
        let response = AgentResponse {
            content: "Total revenue was 3.6M".to_string(),
            tool_calls: Vec::new(),
            round_trips: 1,
        };
        assert_eq!(format_response(&response), "Total revenue was 3.6M");
    }

    #[test]
    fn test_format_response_lists_tools_before_answer() {
        let response = AgentResponse {
            content: "Done".to_string(),
            tool_calls: vec![ToolCallRecord {
                id: "call_1".to_string(),
                name: "query_database".to_string(),
                arguments: r#"{"sql_query":"SELECT 1"}"#.to_string(),
                result: r#"{"success":true}"#.to_string(),
                success: true,
            }],
            round_trips: 2,
        };
        let text = format_response(&response);
        assert!(text.contains("query_database"));
        assert!(text.ends_with("Done"));
    }
}
