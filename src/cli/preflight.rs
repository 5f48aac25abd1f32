//! Pre-flight checks before operations that call the API.
//!
//! Catches missing credentials and bad endpoints before the first request
//! instead of after several retries.

use crate::config::Settings;
use crate::error::{JarvisError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Chatting needs the chat API and the embedding API for searches.
    Chat,
    /// Indexing and searching need the embedding API and a writable index.
    Index,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    check_api(settings)?;
    if let Operation::Index = operation {
        check_index_dir(settings)?;
    }
    Ok(())
}

fn check_api(settings: &Settings) -> Result<()> {
    settings.openai.api_base_url()?;
    settings.openai.resolve_api_key().map(|_| ())
}

/// The SQLite file's directory must exist or be creatable.
fn check_index_dir(settings: &Settings) -> Result<()> {
    let Some(path) = settings.sqlite_path() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            JarvisError::Config(format!(
                "Cannot create index directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }
    Ok(())
}
