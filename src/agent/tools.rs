//! Tool definitions and the registry the agent exposes to the model.

use crate::error::{JarvisError, Result};
use crate::vector_store::VectorCollection;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Value produced by a tool. Strings, numbers and structured data are all
/// passed back unchanged.
pub type ToolOutput = serde_json::Value;

/// A capability the model can invoke by name.
///
/// Arguments arrive as the raw strings parsed from the model's reply; any
/// type conversion is the tool's own business.
#[async_trait]
pub trait Tool: Send + Sync {
    async fn invoke(&self, args: &[String]) -> Result<ToolOutput>;
}

/// Adapter turning a synchronous closure into a [`Tool`].
pub struct FnTool<F>(F);

impl<F> FnTool<F>
where
    F: Fn(&[String]) -> Result<ToolOutput> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Tool for FnTool<F>
where
    F: Fn(&[String]) -> Result<ToolOutput> + Send + Sync,
{
    async fn invoke(&self, args: &[String]) -> Result<ToolOutput> {
        (self.0)(args)
    }
}

/// Render a tool output the way it is echoed back to the model.
pub fn format_output(output: &ToolOutput) -> String {
    match output {
        ToolOutput::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Name, signature and handler of one registered tool.
#[derive(Clone)]
pub struct ToolSpec {
    name: String,
    params: Vec<String>,
    description: String,
    handler: Arc<dyn Tool>,
}

impl ToolSpec {
    /// Describe a tool. `params` is used only for the prompt.
    pub fn new(
        name: impl Into<String>,
        params: &[&str],
        description: impl Into<String>,
        handler: impl Tool + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
            description: description.into(),
            handler: Arc::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn handler(&self) -> &Arc<dyn Tool> {
        &self.handler
    }

    /// `name(param, ...)` as shown to the model.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.params.join(", "))
    }
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Registered tools, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Names must be unique.
    pub fn register(&mut self, spec: ToolSpec) -> Result<()> {
        if spec.name.is_empty() || !spec.name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(JarvisError::Config(format!(
                "Tool name must be a bare identifier: '{}'",
                spec.name
            )));
        }
        if self.get(&spec.name).is_some() {
            return Err(JarvisError::Config(format!(
                "Tool already registered: {}",
                spec.name
            )));
        }
        self.tools.push(spec);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, spec: ToolSpec) -> Result<Self> {
        self.register(spec)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ToolSpec> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// One `- name(params): description` line per tool.
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("- {}: {}", t.signature(), t.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Semantic search over one vector collection.
///
/// Arguments: `query` and an optional result count.
pub struct SearchTool {
    collection: VectorCollection,
    limit: usize,
}

impl SearchTool {
    pub fn new(collection: VectorCollection, limit: usize) -> Self {
        Self {
            collection,
            limit: limit.max(1),
        }
    }
}

#[async_trait]
impl Tool for SearchTool {
    async fn invoke(&self, args: &[String]) -> Result<ToolOutput> {
        let query = args
            .first()
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| JarvisError::Tool("Missing 'query' argument".to_string()))?;

        let limit = match args.get(1) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                JarvisError::Tool(format!("Invalid result count '{}'", raw))
            })?,
            None => self.limit,
        };

        debug!(
            "Searching {} for '{}' (limit {})",
            self.collection.name(),
            query,
            limit
        );

        let results = self.collection.search(query, limit).await?;
        Ok(ToolOutput::Array(
            results.into_iter().map(ToolOutput::Object).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo() -> FnTool<impl Fn(&[String]) -> Result<ToolOutput> + Send + Sync> {
        FnTool::new(|args| Ok(json!(args.join("|"))))
    }

    #[test]
    fn test_registry_describe() {
        let registry = ToolRegistry::new()
            .with(ToolSpec::new(
                "search_food",
                &["query"],
                "Tool to lookup food based on the user's query.",
                echo(),
            ))
            .unwrap()
            .with(ToolSpec::new("add", &["a", "b"], "Adds two numbers.", echo()))
            .unwrap();

        assert_eq!(
            registry.describe(),
            "- search_food(query): Tool to lookup food based on the user's query.\n\
             - add(a, b): Adds two numbers."
        );
        assert_eq!(registry.len(), 2);
        assert!(registry.get("add").is_some());
        assert!(registry.get("subtract").is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolSpec::new("lookup", &[], "first", echo()))
            .unwrap();
        let err = registry
            .register(ToolSpec::new("lookup", &[], "second", echo()))
            .unwrap_err();
        assert!(matches!(err, JarvisError::Config(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_non_identifier_names_rejected() {
        let mut registry = ToolRegistry::new();
        assert!(registry
            .register(ToolSpec::new("search food", &[], "bad", echo()))
            .is_err());
        assert!(registry.register(ToolSpec::new("", &[], "bad", echo())).is_err());
    }

    #[test]
    fn test_format_output() {
        assert_eq!(format_output(&json!("Taco Palenque")), "Taco Palenque");
        assert_eq!(format_output(&json!(42)), "42");
        assert_eq!(
            format_output(&json!([{"name": "Taco Palenque"}])),
            r#"[{"name":"Taco Palenque"}]"#
        );
    }

    #[test]
    fn test_fn_tool_invokes_closure() {
        let tool = echo();
        let output = tokio_test::block_on(tool.invoke(&["a".to_string(), "b".to_string()]));
        assert_eq!(output.unwrap(), json!("a|b"));
    }
}
