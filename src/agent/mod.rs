//! Tool-calling agent.
//!
//! Provides the chat endpoint abstraction, the conversation model, the
//! toolkit trait that concrete tool sets implement, and the agent that
//! mediates one round of tool use per query.

mod conversation;
mod endpoint;
mod runner;
mod tools;

pub use conversation::{AssistantReply, Conversation, Message, Role, ToolCallRequest};
pub use endpoint::{ChatEndpoint, CompletionRequest, OpenAIEndpoint, ToolChoice};
pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use tools::{decode_arguments, Resolved, ToolKit, ToolOutcome, ToolSchema};
