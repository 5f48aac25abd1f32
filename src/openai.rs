//! OpenAI client construction from explicit connection settings.

use crate::config::OpenAISettings;
use crate::error::{JarvisError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI client for the configured base URL, key and timeout.
pub fn create_client(settings: &OpenAISettings) -> Result<Client<OpenAIConfig>> {
    let api_base = settings.api_base_url()?;
    let api_key = settings.resolve_api_key()?;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base.as_str().trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Map an async-openai error into the crate error type.
pub(crate) fn api_error(context: &str, e: async_openai::error::OpenAIError) -> JarvisError {
    JarvisError::OpenAI(format!("{}: {}", context, e))
}
