pub(crate) mod commands;
pub(crate) mod handler;
pub(crate) mod state;

pub use commands::{REGENERATE_COMMAND, REINDEX_COMMAND};
pub use state::TagsLanguageServer;
