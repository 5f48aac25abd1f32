//! OpenAI chat completions implementation of [`ChatModel`].

use super::{ChatMessage, ChatModel, Role};
use crate::config::{ModelSettings, OpenAISettings};
use crate::error::{JarvisError, Result};
use crate::openai::{api_error, create_client};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat model backed by the OpenAI chat completions API.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChatModel {
    /// Create a chat model from connection and model settings.
    pub fn new(openai: &OpenAISettings, settings: &ModelSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(openai)?,
            model: settings.name.clone(),
            temperature: settings.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = message.content.clone();
    let built: ChatCompletionRequestMessage = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| JarvisError::Agent(e.to_string()))?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| JarvisError::Agent(e.to_string()))?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| JarvisError::Agent(e.to_string()))?
            .into(),
    };
    Ok(built)
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| JarvisError::Agent(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| api_error("Chat API error", e))?;

        let reply = response
            .choices
            .first()
            .ok_or_else(|| JarvisError::OpenAI("No response from model".to_string()))?
            .message
            .content
            .clone()
            .unwrap_or_default();

        debug!("Model replied with {} chars", reply.len());
        Ok(reply.trim().to_string())
    }
}
