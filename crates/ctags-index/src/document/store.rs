use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use super::Document;

/// Open documents keyed by URI, kept in full-text sync with the client.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(
        &self,
        uri: Url,
        text: String,
        version: i32,
    ) {
        self.documents.insert(uri, Document::new(text, version));
    }

    /// Replace the whole text. Unknown URIs are registered as if opened.
    pub fn update(
        &self,
        uri: Url,
        text: String,
        version: i32,
    ) {
        match self.documents.get_mut(&uri) {
            Some(mut doc) => doc.set_content(text, version),
            None => {
                self.documents.insert(uri, Document::new(text, version));
            },
        }
    }

    pub fn close(
        &self,
        uri: &Url,
    ) {
        self.documents.remove(uri);
    }

    pub fn get(
        &self,
        uri: &Url,
    ) -> Option<Document> {
        self.documents.get(uri).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/src/document/store_tests.rs"]
mod tests;
