//! Agent runner: one round of tool calling per user query.

use super::conversation::{Conversation, Message, ToolCallRequest};
use super::endpoint::{ChatEndpoint, CompletionRequest, ToolChoice};
use super::tools::{Resolved, ToolKit, ToolOutcome};
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Agent that answers queries with the help of a toolkit.
///
/// Each query makes at most two endpoint calls: the first offers the tools
/// with automatic selection, the second (only when tools were requested)
/// carries the tool results back and yields the final answer.
pub struct Agent<K: ToolKit> {
    endpoint: Arc<dyn ChatEndpoint>,
    toolkit: K,
    model: String,
    system_prompt: String,
}

impl<K: ToolKit> Agent<K> {
    /// Create a new agent.
    pub fn new(endpoint: Arc<dyn ChatEndpoint>, toolkit: K, model: &str, system_prompt: &str) -> Self {
        Self {
            endpoint,
            toolkit,
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
        }
    }

    pub fn toolkit(&self) -> &K {
        &self.toolkit
    }

    /// Run the agent on a single user query.
    #[instrument(skip(self, query), fields(model = %self.model))]
    pub async fn run(&self, query: &str) -> Result<AgentResponse> {
        let mut conversation = Conversation::seed(&self.system_prompt, query);
        let schemas = self.toolkit.schemas();

        let request = CompletionRequest::new(&self.model, conversation.messages().to_vec())
            .with_tools(schemas.clone())
            .with_tool_choice(ToolChoice::Auto);
        let reply = self.endpoint.complete(request).await?;

        if !reply.has_tool_calls() {
            debug!("Model answered without tools");
            return Ok(AgentResponse {
                content: reply.content.unwrap_or_default(),
                tool_calls: Vec::new(),
                round_trips: 1,
            });
        }

        let requests = reply.tool_calls.clone();
        conversation.push(reply.into_message());

        let mut records = Vec::with_capacity(requests.len());
        for call in &requests {
            let record = self.execute_tool_call(call).await;
            conversation.push(Message::tool(&call.id, &record.result));
            records.push(record);
        }

        debug!(
            "Submitting {} tool result(s), {} messages",
            records.len(),
            conversation.len()
        );

        let follow_up = CompletionRequest::new(&self.model, conversation.into_messages())
            .with_tools(schemas);
        let final_reply = self.endpoint.complete(follow_up).await?;

        if final_reply.has_tool_calls() {
            warn!(
                "Final reply requested {} more tool call(s); only one round is supported",
                final_reply.tool_calls.len()
            );
        }

        Ok(AgentResponse {
            content: final_reply.content.unwrap_or_default(),
            tool_calls: records,
            round_trips: 2,
        })
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, call: &ToolCallRequest) -> ToolCallRecord {
        info!("Agent calling tool: {} with args: {}", call.name, call.arguments);

        let outcome = match self.toolkit.resolve(&call.name, &call.arguments) {
            Ok(Resolved::Known(tool)) => self.toolkit.invoke(tool).await,
            Ok(Resolved::Unknown(name)) => {
                warn!("Model requested unknown tool: {}", name);
                ToolOutcome::unknown_function(&name)
            }
            Err(e) => ToolOutcome::failure(format!("Failed to parse tool call: {}", e)),
        };

        ToolCallRecord {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result: outcome.to_json_string(),
            success: outcome.is_success(),
        }
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution, in request order.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of endpoint calls used (1 or 2).
    pub round_trips: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Identifier of the originating request.
    pub id: String,
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Serialized result sent back to the model.
    pub result: String,
    /// Whether the tool reported success.
    pub success: bool,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::conversation::AssistantReply;
    use crate::agent::tools::{decode_arguments, ToolSchema};
    use crate::error::ParleyError;
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Endpoint that replays canned replies and records every request.
    struct ScriptedEndpoint {
        replies: Mutex<VecDeque<Result<AssistantReply>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedEndpoint {
        fn new(replies: Vec<Result<AssistantReply>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatEndpoint for ScriptedEndpoint {
        async fn complete(&self, request: CompletionRequest) -> Result<AssistantReply> {
            self.requests.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ParleyError::Endpoint("script exhausted".to_string())))
        }
    }

    #[derive(Debug)]
    enum EchoTool {
        Echo { text: String },
        Fail,
    }

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
    }

    /// Toolkit with one echoing tool and one failing tool; counts invocations.
    #[derive(Default)]
    struct EchoToolKit {
        invocations: Mutex<Vec<String>>,
    }

    impl EchoToolKit {
        fn invocation_count(&self) -> usize {
            self.invocations.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ToolKit for EchoToolKit {
        type Tool = EchoTool;

        fn schemas(&self) -> Vec<ToolSchema> {
            vec![
                ToolSchema::new("echo", "Echo text", json!({"type": "object"})),
                ToolSchema::new("fail", "Always fails", json!({"type": "object"})),
            ]
        }

        fn resolve(&self, name: &str, arguments: &str) -> Result<Resolved<EchoTool>> {
            match name {
                "echo" => {
                    let args: EchoArgs = decode_arguments(arguments)?;
                    Ok(Resolved::Known(EchoTool::Echo { text: args.text }))
                }
                "fail" => Ok(Resolved::Known(EchoTool::Fail)),
                other => Ok(Resolved::Unknown(other.to_string())),
            }
        }

        async fn invoke(&self, tool: EchoTool) -> ToolOutcome {
            self.invocations.lock().unwrap().push(format!("{:?}", tool));
            match tool {
                EchoTool::Echo { text } => ToolOutcome::success(json!({ "echo": text })),
                EchoTool::Fail => ToolOutcome::failure("deliberate failure"),
            }
        }
    }

    fn agent(endpoint: Arc<ScriptedEndpoint>) -> Agent<EchoToolKit> {
        Agent::new(endpoint, EchoToolKit::default(), "test-model", "system prompt")
    }

    fn tool_messages(request: &CompletionRequest) -> Vec<(String, Value)> {
        request
            .messages
            .iter()
            .filter_map(|m| match m {
                Message::Tool {
                    tool_call_id,
                    content,
                } => Some((tool_call_id.clone(), serde_json::from_str(content).unwrap())),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_plain_answer_skips_tools() {
        let endpoint = ScriptedEndpoint::new(vec![Ok(AssistantReply::text("42"))]);
        let agent = agent(endpoint.clone());

        let response = agent.run("meaning of life?").await.unwrap();

        assert_eq!(response.content, "42");
        assert_eq!(response.round_trips, 1);
        assert!(response.tool_calls.is_empty());
        assert_eq!(agent.toolkit().invocation_count(), 0);

        let requests = endpoint.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tool_choice, Some(ToolChoice::Auto));
        assert_eq!(requests[0].tools.len(), 2);
        assert_eq!(requests[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn test_single_tool_call_round_trip() {
        let endpoint = ScriptedEndpoint::new(vec![
            Ok(AssistantReply::tool_calls(vec![ToolCallRequest::new(
                "call_1",
                "echo",
                r#"{"text": "hello"}"#,
            )])),
            Ok(AssistantReply::text("The tool said hello")),
        ]);
        let agent = agent(endpoint.clone());

        let response = agent.run("say hello").await.unwrap();

        assert_eq!(response.content, "The tool said hello");
        assert_eq!(response.round_trips, 2);
        assert_eq!(agent.toolkit().invocation_count(), 1);
        assert_eq!(response.tool_calls.len(), 1);
        assert!(response.tool_calls[0].success);

        let requests = endpoint.requests();
        assert_eq!(requests.len(), 2);
        let follow_up = &requests[1];
        assert_eq!(follow_up.tool_choice, None);
        assert_eq!(follow_up.tools.len(), 2);
        // system, user, assistant tool-call message, tool result
        assert_eq!(follow_up.messages.len(), 4);
        assert!(matches!(
            &follow_up.messages[2],
            Message::Assistant { tool_calls, .. } if tool_calls[0].id == "call_1"
        ));

        let results = tool_messages(follow_up);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "call_1");
        assert_eq!(results[0].1["success"], json!(true));
        assert_eq!(results[0].1["echo"], json!("hello"));
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_ids() {
        let calls = vec![
            ToolCallRequest::new("a", "echo", r#"{"text": "first"}"#),
            ToolCallRequest::new("b", "launch_rocket", "{}"),
            ToolCallRequest::new("c", "fail", "{}"),
            ToolCallRequest::new("d", "echo", r#"{"text": "last"}"#),
        ];
        let endpoint = ScriptedEndpoint::new(vec![
            Ok(AssistantReply::tool_calls(calls.clone())),
            Ok(AssistantReply::text("done")),
        ]);
        let agent = agent(endpoint.clone());

        let response = agent.run("do things").await.unwrap();
        assert_eq!(response.content, "done");

        let results = tool_messages(&endpoint.requests()[1]);
        assert_eq!(results.len(), calls.len());
        let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);

        assert_eq!(results[0].1["echo"], json!("first"));
        assert_eq!(results[1].1["success"], json!(false));
        assert_eq!(results[1].1["error"], json!("Unknown function: launch_rocket"));
        assert_eq!(results[2].1["error"], json!("deliberate failure"));
        assert_eq!(results[3].1["echo"], json!("last"));

        // Unknown tools are never invoked.
        assert_eq!(agent.toolkit().invocation_count(), 3);
        let names: Vec<&str> = response.tool_calls.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["echo", "launch_rocket", "fail", "echo"]);
    }

    #[tokio::test]
    async fn test_malformed_arguments_become_failure_payload() {
        let endpoint = ScriptedEndpoint::new(vec![
            Ok(AssistantReply::tool_calls(vec![ToolCallRequest::new(
                "call_x",
                "echo",
                "{broken",
            )])),
            Ok(AssistantReply::text("sorry")),
        ]);
        let agent = agent(endpoint.clone());

        let response = agent.run("echo").await.unwrap();
        assert_eq!(response.content, "sorry");
        assert!(!response.tool_calls[0].success);
        assert_eq!(agent.toolkit().invocation_count(), 0);

        let results = tool_messages(&endpoint.requests()[1]);
        assert_eq!(results[0].0, "call_x");
        assert!(results[0].1["error"]
            .as_str()
            .unwrap()
            .starts_with("Failed to parse tool call"));
    }

    #[tokio::test]
    async fn test_second_round_of_tool_calls_is_not_executed() {
        let endpoint = ScriptedEndpoint::new(vec![
            Ok(AssistantReply::tool_calls(vec![ToolCallRequest::new(
                "call_1",
                "echo",
                r#"{"text": "x"}"#,
            )])),
            Ok(AssistantReply::tool_calls(vec![ToolCallRequest::new(
                "call_2",
                "echo",
                r#"{"text": "y"}"#,
            )])),
        ]);
        let agent = agent(endpoint.clone());

        let response = agent.run("loop forever").await.unwrap();
        assert_eq!(response.content, "");
        assert_eq!(response.round_trips, 2);
        assert_eq!(agent.toolkit().invocation_count(), 1);
        assert_eq!(endpoint.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_endpoint_error_propagates() {
        let endpoint = ScriptedEndpoint::new(vec![Err(ParleyError::Endpoint("HTTP 503".to_string()))]);
        let agent = agent(endpoint);

        let err = agent.run("anything").await.unwrap_err();
        assert!(matches!(err, ParleyError::Endpoint(_)));
    }

    #[tokio::test]
    async fn test_follow_up_error_propagates() {
        let endpoint = ScriptedEndpoint::new(vec![
            Ok(AssistantReply::tool_calls(vec![ToolCallRequest::new(
                "call_1",
                "echo",
                r#"{"text": "x"}"#,
            )])),
            Err(ParleyError::Endpoint("timeout".to_string())),
        ]);
        let agent = agent(endpoint);

        assert!(agent.run("anything").await.is_err());
        assert_eq!(agent.toolkit().invocation_count(), 1);
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            id: "call_1".to_string(),
            name: "search_web".to_string(),
            arguments: r#"{"query": "test"}"#.to_string(),
            result: "{}".to_string(),
            success: true,
        };
        assert_eq!(format!("{}", record), r#"search_web({"query": "test"})"#);
    }
}
