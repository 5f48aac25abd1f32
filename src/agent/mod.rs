//! Tool-calling conversational agent.
//!
//! The model requests a tool by writing `Tool: name(args)` in its reply. The
//! agent runs the tool, feeds the result back as a `Tool Result:` turn and
//! asks again until the model answers without the marker.

mod history;
mod invoker;
mod runner;
mod tools;

pub use history::{ConversationHistory, HistorySink, Turn, TurnKind};
pub use invoker::{ParsedCall, ToolInvoker, TOOL_MARKER, TOOL_RESULT_PREFIX};
pub use runner::{needs_tool, Agent, DEFAULT_MAX_TOOL_HOPS};
pub use tools::{format_output, FnTool, SearchTool, Tool, ToolOutput, ToolRegistry, ToolSpec};
