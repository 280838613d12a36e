pub mod config;
pub mod document;
pub mod error;
pub mod generator;
pub mod index;
pub mod manager;
pub mod progress;
pub mod queue;
pub mod resolve;
pub mod server;
pub mod tags;

pub use config::Settings;
pub use error::{Result, TagsError};
pub use index::{Completion, StorageLayout, SymbolIndex};
pub use manager::{IndexPhase, TagIndexManager};
pub use resolve::Match;
pub use server::TagsLanguageServer;
pub use tags::{TagRecord, parse_line};
