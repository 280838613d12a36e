mod store;
mod text;

pub use store::DocumentStore;
pub use text::{Document, is_symbol_char};
