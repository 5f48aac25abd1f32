//! Ask command implementation.

use super::session::build_agent;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    message: &str,
    model: Option<String>,
    collection: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let mut agent = build_agent(&settings, model, collection.as_deref()).await?;

    let spinner = Output::spinner("Thinking...");
    let result = agent.respond(Some(message)).await;
    spinner.finish_and_clear();

    match result {
        Ok(reply) => {
            println!("\n{}\n", reply);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to get a reply: {}", e));
            Err(e.into())
        }
    }
}
