//! CLI command implementations.

mod add;
mod ask;
mod chat;
mod config;
mod search;
mod session;

pub use add::{run_add, run_import};
pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use search::run_search;
