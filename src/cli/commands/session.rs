//! Wiring shared by the commands: collection handle and configured agent.

use crate::agent::{Agent, SearchTool, ToolRegistry, ToolSpec};
use crate::config::Settings;
use crate::error::Result;
use crate::llm::OpenAIChatModel;
use crate::retry::RetryPolicy;
use crate::vector_store::{VectorClient, VectorCollection};
use std::sync::Arc;
use tracing::debug;

const SEARCH_FOOD_DESCRIPTION: &str = "Tool to lookup food based on the user's query.";

/// Open `name`, or the configured collection, with the configured retries.
pub(crate) async fn open_collection(
    settings: &Settings,
    name: Option<&str>,
) -> Result<VectorCollection> {
    let client = VectorClient::open(settings)?;
    let name = name.unwrap_or(&settings.vector_store.collection);
    debug!("Using collection {}", name);
    VectorCollection::open(&client, name, RetryPolicy::from(&settings.retry)).await
}

/// Build the chat agent with `search_food` bound to the collection.
pub(crate) async fn build_agent(
    settings: &Settings,
    model: Option<String>,
    collection: Option<&str>,
) -> Result<Agent> {
    let mut model_settings = settings.model.clone();
    if let Some(model) = model {
        model_settings.name = model;
    }
    let chat_model = Arc::new(OpenAIChatModel::new(&settings.openai, &model_settings)?);

    let collection = open_collection(settings, collection).await?;
    let registry = ToolRegistry::new().with(ToolSpec::new(
        "search_food",
        &["query"],
        SEARCH_FOOD_DESCRIPTION,
        SearchTool::new(collection, settings.agent.search_limit),
    ))?;

    Ok(Agent::new(chat_model, registry, &settings.agent.prompts)
        .with_max_tool_hops(settings.agent.tool_hop_limit()))
}
