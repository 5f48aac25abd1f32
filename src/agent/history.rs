//! Conversation history and the durable-storage hook.

use super::invoker::{TOOL_MARKER, TOOL_RESULT_PREFIX};
use crate::error::Result;
use crate::llm::{ChatMessage, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What an entry in the history represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// A user or system message.
    Message,
    /// A model reply asking for a tool.
    ToolCall,
    /// The output of a tool, echoed back to the model.
    ToolResult,
    /// A model reply with no tool request.
    FinalAnswer,
}

/// One immutable entry of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    kind: TurnKind,
    content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            kind: TurnKind::Message,
            content: content.into(),
        }
    }

    pub fn tool_call(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            kind: TurnKind::ToolCall,
            content: content.into(),
        }
    }

    /// A tool result, sent to the model as an assistant message with the
    /// result prefix.
    pub fn tool_result(output: &str) -> Self {
        Self {
            role: Role::Assistant,
            kind: TurnKind::ToolResult,
            content: format!("{} {}", TOOL_RESULT_PREFIX, output),
        }
    }

    pub fn final_answer(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            kind: TurnKind::FinalAnswer,
            content: content.into(),
        }
    }

    /// Rebuild a turn from stored role and content, which carry no kind tag.
    pub fn restore(role: Role, content: impl Into<String>) -> Self {
        let content = content.into();
        let kind = match role {
            Role::System | Role::User => TurnKind::Message,
            Role::Assistant if content.starts_with(TOOL_RESULT_PREFIX) => TurnKind::ToolResult,
            Role::Assistant if content.contains(TOOL_MARKER) => TurnKind::ToolCall,
            Role::Assistant => TurnKind::FinalAnswer,
        };
        Self {
            role,
            kind,
            content,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn kind(&self) -> TurnKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::new(self.role, self.content.clone())
    }
}

/// Append-only, insertion-ordered list of turns for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously persisted turns, oldest first.
    pub fn seeded(turns: impl IntoIterator<Item = Turn>) -> Self {
        Self {
            turns: turns.into_iter().collect(),
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The turns as model messages, in order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.turns.iter().map(Turn::to_message).collect()
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

/// Durable storage for conversation turns.
///
/// The agent calls this once per appended turn. A failed write is logged
/// and does not interrupt the conversation.
#[async_trait]
pub trait HistorySink: Send + Sync {
    async fn record_turn(&self, thread_id: &str, role: Role, content: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_constructors() {
        let result = Turn::tool_result("Taco Palenque");
        assert_eq!(result.role(), Role::Assistant);
        assert_eq!(result.kind(), TurnKind::ToolResult);
        assert_eq!(result.content(), "Tool Result: Taco Palenque");

        let call = Turn::tool_call("Tool: search_food(tacos)");
        assert_eq!(call.role(), Role::Assistant);
        assert_eq!(call.kind(), TurnKind::ToolCall);

        assert_eq!(Turn::user("hi").role(), Role::User);
        assert_eq!(Turn::final_answer("bye").kind(), TurnKind::FinalAnswer);
    }

    #[test]
    fn test_restore_infers_kind() {
        assert_eq!(
            Turn::restore(Role::Assistant, "Tool Result: 42").kind(),
            TurnKind::ToolResult
        );
        assert_eq!(
            Turn::restore(Role::Assistant, "Tool: search_food(tacos)").kind(),
            TurnKind::ToolCall
        );
        assert_eq!(
            Turn::restore(Role::Assistant, "Enjoy!").kind(),
            TurnKind::FinalAnswer
        );
        assert_eq!(
            Turn::restore(Role::User, "Tool: pretend").kind(),
            TurnKind::Message
        );
    }

    #[test]
    fn test_history_preserves_order() {
        let mut history = ConversationHistory::seeded(vec![
            Turn::user("first"),
            Turn::final_answer("second"),
        ]);
        history.push(Turn::user("third"));

        let contents: Vec<&str> = history.iter().map(Turn::content).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(history.len(), 3);
        assert_eq!(history.last().map(Turn::content), Some("third"));

        let messages = history.messages();
        assert_eq!(messages[1], ChatMessage::new(Role::Assistant, "second"));
    }
}
