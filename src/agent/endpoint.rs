//! Chat completion endpoint abstraction and its OpenAI-compatible implementation.

use super::conversation::{AssistantReply, Message, ToolCallRequest};
use super::tools::ToolSchema;
use crate::config::ApiSettings;
use crate::error::{ParleyError, Result};
use crate::openai::create_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolChoiceOption, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, FunctionCall, FunctionObject,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// How the endpoint may choose tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChoice {
    Auto,
    None,
    Required,
}

/// A single chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSchema>,
    pub tool_choice: Option<ToolChoice>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(model: &str, messages: Vec<Message>) -> Self {
        Self {
            model: model.to_string(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSchema>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Remote chat completion service.
#[async_trait]
pub trait ChatEndpoint: Send + Sync {
    /// Submit a request and return the first choice's message.
    async fn complete(&self, request: CompletionRequest) -> Result<AssistantReply>;

    /// Submit a request and return only its text content.
    async fn complete_text(&self, request: CompletionRequest) -> Result<String> {
        let reply = self.complete(request).await?;
        Ok(reply.content.unwrap_or_default())
    }
}

/// Endpoint backed by an OpenAI-compatible HTTP API (xAI by default).
pub struct OpenAIEndpoint {
    client: Client<OpenAIConfig>,
}

impl OpenAIEndpoint {
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }

    /// Build an endpoint from settings, reading the API key from the environment.
    pub fn from_settings(api: &ApiSettings) -> Result<Self> {
        let key = crate::config::Settings::api_key_from_env(&api.api_key_env)?;
        Ok(Self::new(create_client(api, &key)?))
    }
}

#[async_trait]
impl ChatEndpoint for OpenAIEndpoint {
    #[instrument(skip_all, fields(model = %request.model, messages = request.messages.len()))]
    async fn complete(&self, request: CompletionRequest) -> Result<AssistantReply> {
        let request = build_request(&request)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ParleyError::Endpoint(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ParleyError::Endpoint("No response from model".to_string()))?;

        let tool_calls: Vec<ToolCallRequest> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCallRequest {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        debug!("Endpoint replied with {} tool call(s)", tool_calls.len());

        Ok(AssistantReply {
            content: choice.message.content,
            tool_calls,
        })
    }
}

#[allow(deprecated)]
fn build_request(
    request: &CompletionRequest,
) -> Result<async_openai::types::CreateChatCompletionRequest> {
    let messages = request
        .messages
        .iter()
        .map(to_request_message)
        .collect::<Result<Vec<_>>>()?;

    let mut builder = CreateChatCompletionRequestArgs::default();
    builder.model(&request.model).messages(messages);

    if !request.tools.is_empty() {
        builder.tools(request.tools.iter().map(to_openai_tool).collect::<Vec<_>>());
    }
    if let Some(choice) = request.tool_choice {
        builder.tool_choice(match choice {
            ToolChoice::Auto => ChatCompletionToolChoiceOption::Auto,
            ToolChoice::None => ChatCompletionToolChoiceOption::None,
            ToolChoice::Required => ChatCompletionToolChoiceOption::Required,
        });
    }
    if let Some(temperature) = request.temperature {
        builder.temperature(temperature);
    }
    if let Some(max_tokens) = request.max_tokens {
        builder.max_tokens(max_tokens);
    }

    builder
        .build()
        .map_err(|e| ParleyError::Agent(format!("Failed to build request: {}", e)))
}

fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message {
        Message::System(content) => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(|e| ParleyError::Agent(e.to_string()))?
            .into(),
        Message::User(content) => ChatCompletionRequestUserMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(|e| ParleyError::Agent(e.to_string()))?
            .into(),
        Message::Assistant {
            content,
            tool_calls,
        } => {
            let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(text) = content {
                builder.content(text.clone());
            }
            if !tool_calls.is_empty() {
                builder.tool_calls(
                    tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            builder
                .build()
                .map_err(|e| ParleyError::Agent(e.to_string()))?
                .into()
        }
        Message::Tool {
            tool_call_id,
            content,
        } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(tool_call_id.clone())
            .content(content.clone())
            .build()
            .map_err(|e| ParleyError::Agent(e.to_string()))?
            .into(),
    };
    Ok(built)
}

fn to_openai_tool(schema: &ToolSchema) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: schema.name.clone(),
            description: Some(schema.description.clone()),
            parameters: Some(schema.parameters.clone()),
            strict: None,
        },
    }
}
