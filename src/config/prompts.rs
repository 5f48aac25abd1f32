//! Prompt templates for the Jarvis agent.
//!
//! Templates use `{{variable}}` placeholders. The agent supplies `tools`,
//! `tool_marker` and `today`; everything else comes from `variables`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// System prompt sections for the tool-calling agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    /// Who the assistant is.
    pub persona: String,
    /// Heading and preamble for the tool list.
    pub tools: String,
    /// Rules for when a tool must be used.
    pub tool_rules: String,
    /// The exact syntax the model must emit to invoke a tool.
    pub invocation: String,
    /// How to present tool results back to the user.
    pub tool_results: String,
    /// Custom variables available in every section as {{variable_name}}.
    pub variables: HashMap<String, String>,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        let mut variables = HashMap::new();
        variables.insert("assistant_name".to_string(), "Jarvis".to_string());
        variables.insert("knowledge_cutoff".to_string(), "September 2021".to_string());

        Self {
            persona: r#"You are a helpful expert restaurant assistant named {{assistant_name}}.

Your knowledge cut-off is: {{knowledge_cutoff}}
Today's date: {{today}}"#
                .to_string(),

            tools: r#"## Tools

You have access to the following tools:
{{tools}}"#
                .to_string(),

            tool_rules: r#"## Tool Rules

When the user asks a question that can be answered by using a tool, you MUST do so. Do not answer from your training data."#
                .to_string(),

            invocation: r#"## Using Tools

To use a tool, reply with the following prefix "{{tool_marker}} " then append the tool call (like a function call), for example: {{tool_marker}} tool_name("argument")

Behind the scenes, your software will pick up that you want to invoke a tool, invoke it for you and provide you the response."#
                .to_string(),

            tool_results: r#"## Using Tool Responses

Answer the user's question using the response from the tool. Feel free to make it conversational."#
                .to_string(),

            variables,
        }
    }
}

impl AgentPrompts {
    /// Render the full system prompt, sections separated by blank lines.
    ///
    /// Provided variables take precedence over configured ones.
    pub fn render_system(&self, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }

        [
            &self.persona,
            &self.tools,
            &self.tool_rules,
            &self.invocation,
            &self.tool_results,
        ]
        .iter()
        .filter(|section| !section.trim().is_empty())
        .map(|section| render(section, &merged))
        .collect::<Vec<_>>()
        .join("\n\n")
    }
}

/// Render a prompt template with the given variables.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
