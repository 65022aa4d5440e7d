//! Interactive read-eval-print loop shared by the chat and agent commands.

use crate::error::Result;
use async_trait::async_trait;
use console::style;
use std::io::{BufRead, Write};
use tracing::debug;

/// Something that turns one line of user input into a reply.
#[async_trait]
pub trait QueryHandler: Send + Sync {
    async fn handle(&self, input: &str) -> Result<String>;
}

/// Inputs that end the loop: `quit`, `exit`, `q`, in any case.
pub fn is_exit_command(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "quit" | "exit" | "q")
}

/// Counters reported when a loop ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub queries: usize,
    pub errors: usize,
}

/// Labels used when prompting and printing replies.
#[derive(Debug, Clone)]
pub struct PromptLoop {
    prompt: String,
    reply_label: String,
}

impl PromptLoop {
    pub fn new(prompt: &str, reply_label: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            reply_label: reply_label.to_string(),
        }
    }

    /// Read lines until an exit command or EOF, passing each query to the handler.
    ///
    /// Handler errors are printed and the loop carries on.
    pub async fn run<R: BufRead, W: Write>(
        &self,
        mut input: R,
        output: &mut W,
        handler: &dyn QueryHandler,
    ) -> Result<LoopSummary> {
        let mut summary = LoopSummary::default();

        loop {
            write!(output, "\n{} ", style(&self.prompt).green().bold())?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                debug!("Input closed");
                writeln!(output)?;
                break;
            }

            let query = line.trim();
            if query.is_empty() {
                continue;
            }
            if is_exit_command(query) {
                break;
            }

            summary.queries += 1;
            match handler.handle(query).await {
                Ok(reply) => {
                    writeln!(output, "\n{}\n{}", style(&self.reply_label).cyan().bold(), reply)?;
                }
                Err(e) => {
                    summary.errors += 1;
                    writeln!(output, "{} Error: {}", style(">>").red().bold(), e)?;
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParleyError;
    use std::io::Cursor;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHandler {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl QueryHandler for RecordingHandler {
        async fn handle(&self, input: &str) -> Result<String> {
            self.seen.lock().unwrap().push(input.to_string());
            if input == "boom" {
                Err(ParleyError::Endpoint("HTTP 500".to_string()))
            } else {
                Ok(format!("echo: {}", input))
            }
        }
    }

    async fn run_with(input: &str) -> (LoopSummary, Vec<String>, String) {
        let handler = RecordingHandler::default();
        let mut output = Vec::new();
        let summary = PromptLoop::new("Query:", "Result:")
            .run(Cursor::new(input.to_string()), &mut output, &handler)
            .await
            .unwrap();
        let seen = handler.seen.lock().unwrap().clone();
        (summary, seen, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_exit_commands() {
        for input in ["quit", "QUIT", "q", "Q", "exit", "  Exit  "] {
            assert!(is_exit_command(input), "{} should exit", input);
        }
        for input in ["quite", "", "question", "exit now"] {
            assert!(!is_exit_command(input), "{} should not exit", input);
        }
    }

    #[tokio::test]
    async fn test_sentinel_stops_without_dispatch() {
        for sentinel in ["quit\n", "QUIT\n", "q\n"] {
            let input = format!("{}never reached\n", sentinel);
            let (summary, seen, _) = run_with(&input).await;
            assert_eq!(summary.queries, 0);
            assert!(seen.is_empty());
        }
    }

    #[tokio::test]
    async fn test_queries_are_dispatched_in_order() {
        let (summary, seen, output) = run_with("first\n\n  second  \nexit\nthird\n").await;
        assert_eq!(seen, vec!["first", "second"]);
        assert_eq!(summary, LoopSummary { queries: 2, errors: 0 });
        assert!(output.contains("echo: first"));
        assert!(output.contains("echo: second"));
    }

    #[tokio::test]
    async fn test_errors_are_reported_and_loop_continues() {
        let (summary, seen, output) = run_with("boom\nafter\n").await;
        assert_eq!(seen, vec!["boom", "after"]);
        assert_eq!(summary, LoopSummary { queries: 2, errors: 1 });
        assert!(output.contains("Error: Chat endpoint error: HTTP 500"));
        assert!(output.contains("echo: after"));
    }

    #[tokio::test]
    async fn test_eof_ends_loop() {
        let (summary, seen, _) = run_with("only\n").await;
        assert_eq!(summary.queries, 1);
        assert_eq!(seen, vec!["only"]);
    }
}
