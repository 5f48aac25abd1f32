//! Configuration module for Jarvis.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{render, AgentPrompts};
pub use settings::{
    AgentSettings, EmbeddingSettings, GeneralSettings, ModelSettings, OpenAISettings,
    RetrySettings, Settings, VectorStoreSettings,
};
