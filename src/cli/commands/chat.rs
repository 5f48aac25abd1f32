//! Interactive chat command.

use super::session::build_agent;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(
    model: Option<String>,
    collection: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let mut agent = build_agent(&settings, model, collection.as_deref()).await?;
    let name = settings
        .agent
        .prompts
        .variables
        .get("assistant_name")
        .cloned()
        .unwrap_or_else(|| "Jarvis".to_string());

    println!("\n{}", style(format!("{} Chat", name)).bold().cyan());
    println!("{}\n", style("Type your questions, or 'exit' to quit.").dim());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        let spinner = Output::spinner("Thinking...");
        let result = agent.respond(Some(input)).await;
        spinner.finish_and_clear();

        match result {
            Ok(reply) => Output::reply(&name, &reply),
            Err(e) => Output::error(&format!("Error: {}", e)),
        }
    }

    Ok(())
}
