//! Error types for Jarvis.

use thiserror::Error;

/// Library-level error type for Jarvis operations.
#[derive(Error, Debug)]
pub enum JarvisError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Reply contains a tool marker but no parsable tool call: {0}")]
    MalformedToolCall(String),

    #[error("Agent exceeded maximum tool hops ({0})")]
    ToolLoopExceeded(usize),

    #[error("Tool failed: {0}")]
    Tool(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

/// Result type alias for Jarvis operations.
pub type Result<T> = std::result::Result<T, JarvisError>;
