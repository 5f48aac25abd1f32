//! Add and import commands: index documents into a collection.

use super::session::open_collection;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::{Attributes, Document};
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

/// One line of an import file.
#[derive(Debug, Deserialize)]
struct ImportLine {
    id: Value,
    #[serde(alias = "data")]
    attributes: Attributes,
}

fn parse_attributes(raw: &str) -> Result<Attributes> {
    match serde_json::from_str::<Value>(raw).context("Attributes are not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("Attributes must be a JSON object, got {}", other),
    }
}

fn parse_import_line(line: &str) -> Result<Document> {
    let parsed: ImportLine = serde_json::from_str(line)?;
    let id = match parsed.id {
        Value::String(s) if !s.is_empty() => s,
        Value::Number(n) => n.to_string(),
        other => bail!("Document id must be a string or number, got {}", other),
    };
    Ok(Document::new(id, parsed.attributes))
}

/// Run the add command.
pub async fn run_add(
    id: &str,
    attributes: &str,
    collection: Option<String>,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Index, &settings)?;

    let document = Document::new(id, parse_attributes(attributes)?);
    let collection = open_collection(&settings, collection.as_deref()).await?;

    let spinner = Output::spinner("Indexing...");
    let result = collection.add(&document).await;
    spinner.finish_and_clear();
    result?;

    Output::success(&format!("Added {} to {}", document.id(), collection.name()));
    Ok(())
}

/// Run the import command.
pub async fn run_import(file: &str, collection: Option<String>, settings: Settings) -> Result<()> {
    preflight::check(Operation::Index, &settings)?;

    let content = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))?;
    let documents = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            parse_import_line(line).map_err(|e| anyhow!("{}:{}: {}", file, n + 1, e))
        })
        .collect::<Result<Vec<_>>>()?;

    if documents.is_empty() {
        Output::warning("No documents to import.");
        return Ok(());
    }

    let collection = open_collection(&settings, collection.as_deref()).await?;
    let pb = Output::progress_bar(documents.len() as u64, "Indexing");

    for document in &documents {
        if let Err(e) = collection.add(document).await {
            pb.abandon();
            return Err(anyhow!("Failed to add {}: {}", document.id(), e));
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!("Imported {} documents from {}", documents.len(), file);
    Output::success(&format!(
        "Imported {} documents into {}",
        documents.len(),
        collection.name()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attributes() {
        let attrs = parse_attributes(r#"{"name": "Taco Palenque"}"#).unwrap();
        assert_eq!(attrs["name"], "Taco Palenque");

        assert!(parse_attributes("[1, 2]").is_err());
        assert!(parse_attributes("not json").is_err());
    }

    #[test]
    fn test_parse_import_line() {
        let doc = parse_import_line(r#"{"id": 7, "attributes": {"name": "Sakura"}}"#).unwrap();
        assert_eq!(doc.id(), "7");
        assert_eq!(doc.attributes()["name"], "Sakura");

        let doc = parse_import_line(r#"{"id": "abc", "data": {"name": "Burger Barn"}}"#).unwrap();
        assert_eq!(doc.id(), "abc");
        assert_eq!(doc.to_embed_str(), r#"{"name":"Burger Barn"}"#);
    }

    #[test]
    fn test_parse_import_line_rejects_bad_ids() {
        assert!(parse_import_line(r#"{"id": null, "attributes": {}}"#).is_err());
        assert!(parse_import_line(r#"{"id": "", "attributes": {}}"#).is_err());
        assert!(parse_import_line(r#"{"attributes": {}}"#).is_err());
    }
}
