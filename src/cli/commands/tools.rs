//! Print the tool schemas an agent advertises.

use crate::agent::ToolSchema;
use crate::analysis;
use crate::cli::AgentKind;
use crate::research;
use anyhow::Result;
use serde_json::Value;

/// Print the tool definitions for an agent as pretty JSON.
pub fn run_tools(agent: AgentKind) -> Result<()> {
    println!("{}", render(agent)?);
    Ok(())
}

fn render(agent: AgentKind) -> Result<String> {
    let tools: Vec<Value> = schemas(agent)
        .iter()
        .map(|schema| {
            serde_json::json!({
                "type": "function",
                "function": {
                    "name": schema.name,
                    "description": schema.description,
                    "parameters": schema.parameters,
                }
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&tools)?)
}

fn schemas(agent: AgentKind) -> Vec<ToolSchema> {
    match agent {
        AgentKind::Analysis => analysis::tool_definitions(),
        AgentKind::Research => research::tool_definitions(),
    }
}
