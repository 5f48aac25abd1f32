//! Jarvis - a tool-using conversational assistant
//!
//! An agent loop over an OpenAI chat model in which the model asks for tools
//! by writing `Tool: name(args)` in its reply, plus a retrying vector store
//! for the documents those tools search.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `llm` - Chat model abstraction and the OpenAI backend
//! - `agent` - Conversation history, tool registry, invoker and agent loop
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector index, collections and the retrying document store
//! - `retry` - Exponential backoff policy
//!
//! # Example
//!
//! ```rust,no_run
//! use jarvis::agent::{Agent, SearchTool, ToolRegistry, ToolSpec};
//! use jarvis::config::Settings;
//! use jarvis::llm::OpenAIChatModel;
//! use jarvis::retry::RetryPolicy;
//! use jarvis::vector_store::{VectorClient, VectorCollection};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let client = VectorClient::open(&settings)?;
//!     let food = VectorCollection::open(&client, "food", RetryPolicy::default()).await?;
//!
//!     let registry = ToolRegistry::new().with(ToolSpec::new(
//!         "search_food",
//!         &["query"],
//!         "Tool to lookup food based on the user's query.",
//!         SearchTool::new(food, 5),
//!     ))?;
//!
//!     let model = Arc::new(OpenAIChatModel::new(&settings.openai, &settings.model)?);
//!     let mut agent = Agent::new(model, registry, &settings.agent.prompts);
//!
//!     let reply = agent.respond(Some("Where can I get good tacos?")).await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod openai;
pub mod retry;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{JarvisError, Result};
