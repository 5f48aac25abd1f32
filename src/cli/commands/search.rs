//! Search command implementation.

use super::session::open_collection;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: Option<usize>,
    collection: Option<String>,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Index, &settings)?;

    let collection = open_collection(&settings, collection.as_deref()).await?;
    let limit = limit.unwrap_or(settings.agent.search_limit);

    let spinner = Output::spinner("Searching...");
    let results = collection.search(query, limit).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) => {
            if results.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", results.len()));
                for (rank, attributes) in results.iter().enumerate() {
                    Output::search_result(rank + 1, attributes);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
