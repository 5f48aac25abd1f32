//! Agent runner with the text-marker tool calling loop.

use super::history::{ConversationHistory, HistorySink, Turn};
use super::invoker::{ToolInvoker, TOOL_MARKER};
use super::tools::{format_output, ToolRegistry};
use crate::config::AgentPrompts;
use crate::error::{JarvisError, Result};
use crate::llm::{ChatMessage, ChatModel, Role};
use chrono::Local;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Tool invocations allowed per user message unless configured otherwise.
pub const DEFAULT_MAX_TOOL_HOPS: usize = 10;

/// Whether a model reply asks for a tool.
pub fn needs_tool(reply: &str) -> bool {
    reply.contains(TOOL_MARKER)
}

/// Tool-calling conversational agent.
///
/// Each [`respond`](Agent::respond) sends the system prompt plus the whole
/// history to the model. While the reply contains the tool marker the
/// requested tool is run, its output appended as an assistant turn, and the
/// model asked again.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    invoker: ToolInvoker,
    history: ConversationHistory,
    system_prompt: String,
    max_tool_hops: Option<usize>,
    sink: Option<(String, Arc<dyn HistorySink>)>,
}

impl Agent {
    /// Create an agent over `registry`, rendering the system prompt once.
    pub fn new(model: Arc<dyn ChatModel>, registry: ToolRegistry, prompts: &AgentPrompts) -> Self {
        let mut vars = HashMap::new();
        vars.insert("tools".to_string(), registry.describe());
        vars.insert("tool_marker".to_string(), TOOL_MARKER.to_string());
        vars.insert(
            "today".to_string(),
            Local::now().format("%B %-d, %Y").to_string(),
        );

        Self {
            model,
            system_prompt: prompts.render_system(&vars),
            invoker: ToolInvoker::new(registry),
            history: ConversationHistory::new(),
            max_tool_hops: Some(DEFAULT_MAX_TOOL_HOPS),
            sink: None,
        }
    }

    /// Continue an earlier conversation.
    pub fn with_history(mut self, history: ConversationHistory) -> Self {
        self.history = history;
        self
    }

    /// Mirror every appended turn to durable storage under `thread_id`.
    pub fn with_sink(mut self, thread_id: impl Into<String>, sink: Arc<dyn HistorySink>) -> Self {
        self.sink = Some((thread_id.into(), sink));
        self
    }

    /// Cap tool invocations per call to `respond`. `None` removes the cap.
    pub fn with_max_tool_hops(mut self, max: Option<usize>) -> Self {
        self.max_tool_hops = max;
        self
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Answer `message`, running tools until the model replies without the
    /// tool marker.
    ///
    /// With `None` the model is asked to continue from the existing history.
    /// Errors from the model or a tool end the call; turns appended before
    /// the failure stay in the history.
    #[instrument(skip_all, fields(history = self.history.len()))]
    pub async fn respond(&mut self, message: Option<&str>) -> Result<String> {
        if let Some(message) = message {
            self.append(Turn::user(message)).await;
        }

        let mut reply = self.complete().await?;
        let mut hops = 0;

        while needs_tool(&reply) {
            self.append(Turn::tool_call(reply.as_str())).await;

            if let Some(max) = self.max_tool_hops {
                if hops >= max {
                    warn!("Stopping after {} tool hops", max);
                    return Err(JarvisError::ToolLoopExceeded(max));
                }
            }
            hops += 1;

            let output = self.invoker.invoke(&reply).await?;
            let rendered = format_output(&output);
            debug!("Tool returned {} bytes", rendered.len());
            self.append(Turn::tool_result(&rendered)).await;

            reply = self.complete().await?;
        }

        self.append(Turn::final_answer(reply.as_str())).await;
        info!("Answered after {} tool hops", hops);
        Ok(reply)
    }

    async fn complete(&self) -> Result<String> {
        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(ChatMessage::new(Role::System, self.system_prompt.clone()));
        messages.extend(self.history.messages());

        debug!("Sending {} messages to the model", messages.len());
        self.model.complete(&messages).await
    }

    async fn append(&mut self, turn: Turn) {
        if let Some((thread_id, sink)) = &self.sink {
            if let Err(e) = sink.record_turn(thread_id, turn.role(), turn.content()).await {
                warn!("Failed to persist turn for thread {}: {}", thread_id, e);
            }
        }
        self.history.push(turn);
    }
}
