//! CLI module for Parley.

pub mod commands;
mod output;
pub mod preflight;
pub mod repl;

pub use output::Output;

use clap::{Parser, Subcommand, ValueEnum};

/// Parley - tool-calling chat agents
///
/// Talks to an OpenAI-compatible chat API (xAI Grok by default) and lets the
/// model call local tools: SQL analysis over sample sales data, or web research.
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive data analysis agent over sample sales data
    Analyze {
        /// Model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Interactive web research agent
    Research {
        /// Model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Interactive plain chat without tools
    Chat {
        /// Model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Send a single prompt and print the reply
    Ask {
        /// The prompt to send
        prompt: String,

        /// Model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Print the tool schemas an agent offers to the model
    Tools {
        /// Which agent's tools to print
        #[arg(value_enum)]
        agent: AgentKind,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// The built-in tool-calling agents.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentKind {
    Analysis,
    Research,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_with_model() {
        let cli = Cli::parse_from(["parley", "-vv", "analyze", "--model", "grok-3"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Analyze { model } => assert_eq!(model.as_deref(), Some("grok-3")),
            other => panic!("Expected Analyze, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_tools_kind() {
        let cli = Cli::parse_from(["parley", "tools", "research"]);
        assert!(matches!(
            cli.command,
            Commands::Tools {
                agent: AgentKind::Research
            }
        ));
    }
}
