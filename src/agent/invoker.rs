//! Parsing and dispatch of tool calls embedded in model replies.

use super::tools::{ToolOutput, ToolRegistry};
use crate::error::{JarvisError, Result};
use regex::Regex;
use tracing::{debug, instrument};

/// Prefix the model writes in front of a tool call.
pub const TOOL_MARKER: &str = "Tool:";

/// Prefix of the assistant turn that carries a tool's output.
pub const TOOL_RESULT_PREFIX: &str = "Tool Result:";

const CALL_PATTERN: &str = r"Tool: (\w+)\((.*?)\)";

/// A tool call extracted from a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCall {
    pub name: String,
    pub args: Vec<String>,
}

/// Finds the first `Tool: name(args)` in a reply and runs the matching tool.
pub struct ToolInvoker {
    registry: ToolRegistry,
    call_pattern: Regex,
}

impl ToolInvoker {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            call_pattern: Regex::new(CALL_PATTERN).expect("Invalid tool call pattern"),
        }
    }

    /// Parse the first tool call in `reply`.
    ///
    /// Arguments are split on `", "` and quotes around each one are dropped.
    /// Whitespace is kept as written. An empty argument list yields no
    /// arguments.
    pub fn extract_call(&self, reply: &str) -> Option<ParsedCall> {
        let caps = self.call_pattern.captures(reply)?;
        let name = caps.get(1)?.as_str().to_string();
        let raw = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

        let args = if raw.is_empty() {
            Vec::new()
        } else {
            raw.split(", ")
                .map(|arg| arg.trim_matches(|c| c == '"' || c == '\'').to_string())
                .collect()
        };

        Some(ParsedCall { name, args })
    }

    /// Run the tool requested by `reply`.
    #[instrument(skip_all)]
    pub async fn invoke(&self, reply: &str) -> Result<ToolOutput> {
        let call = self
            .extract_call(reply)
            .ok_or_else(|| JarvisError::MalformedToolCall(reply.to_string()))?;

        let tool = self
            .registry
            .get(&call.name)
            .ok_or_else(|| JarvisError::UnknownTool(call.name.clone()))?;

        debug!("Invoking tool {} with {:?}", call.name, call.args);
        tool.handler().invoke(&call.args).await
    }
}
