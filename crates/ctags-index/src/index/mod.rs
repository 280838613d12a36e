//! Name → records index over a tag table.
//!
//! Two backings implement [`TagStore`]: [`ResidentIndex`] keeps every record
//! in an ordered map, [`ByteRangeIndex`] keeps only per-bucket byte spans of
//! the table and re-reads them on demand. [`SymbolIndex`] picks one from a
//! [`StorageLayout`] and adds match resolution on top.

mod builder;
mod byte_range;
mod resident;

use std::{future::Future, ops::Range, path::Path};

pub use builder::build;
pub use byte_range::{ByteRangeIndex, DEFAULT_BUCKET_PREFIX_LEN, bucket_key};
pub use resident::ResidentIndex;
use serde::Serialize;

use crate::{
    resolve::{Match, resolve_all},
    tags::TagRecord,
};

/// Storage capability shared by both index backings.
pub trait TagStore {
    /// Register a record read from `span` of the table.
    fn insert(
        &mut self,
        record: TagRecord,
        span: Range<u64>,
    );

    /// Every record named exactly `name`, in table order.
    fn get(
        &self,
        name: &str,
    ) -> impl Future<Output = Vec<TagRecord>> + Send;

    /// Distinct names starting with `prefix`, in index order.
    fn prefix_search(
        &self,
        prefix: &str,
    ) -> impl Future<Output = Vec<String>> + Send;

    /// Number of records inserted.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which backing to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageLayout {
    #[default]
    Resident,
    ByteRange {
        bucket_prefix_len: usize,
    },
}

/// A completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Completion {
    pub name: String,
}

/// An immutable, fully built index. Rebuilds produce a new instance.
#[derive(Debug, PartialEq, Eq)]
pub enum SymbolIndex {
    Resident(ResidentIndex),
    ByteRange(ByteRangeIndex),
}

impl SymbolIndex {
    pub fn empty(
        table: &Path,
        layout: StorageLayout,
    ) -> Self {
        match layout {
            StorageLayout::Resident => Self::Resident(ResidentIndex::new()),
            StorageLayout::ByteRange {
                bucket_prefix_len,
            } => Self::ByteRange(ByteRangeIndex::new(table, bucket_prefix_len)),
        }
    }

    pub fn layout(&self) -> StorageLayout {
        match self {
            Self::Resident(_) => StorageLayout::Resident,
            Self::ByteRange(index) => StorageLayout::ByteRange {
                bucket_prefix_len: index.bucket_prefix_len(),
            },
        }
    }

    /// Resolve every definition of `symbol`. `None` when the name is unknown.
    pub async fn lookup(
        &self,
        symbol: &str,
        base_dir: &Path,
        concurrency: usize,
    ) -> Option<Vec<Match>> {
        let records = self.get(symbol).await;
        if records.is_empty() {
            return None;
        }
        Some(resolve_all(&records, base_dir, concurrency).await)
    }

    /// Names starting with `prefix`. `None` when nothing matches.
    pub async fn lookup_completions(
        &self,
        prefix: &str,
    ) -> Option<Vec<Completion>> {
        let names = self.prefix_search(prefix).await;
        if names.is_empty() {
            return None;
        }
        Some(
            names
                .into_iter()
                .map(|name| Completion {
                    name,
                })
                .collect(),
        )
    }
}

impl TagStore for SymbolIndex {
    fn insert(
        &mut self,
        record: TagRecord,
        span: Range<u64>,
    ) {
        match self {
            Self::Resident(index) => index.insert(record, span),
            Self::ByteRange(index) => index.insert(record, span),
        }
    }

    async fn get(
        &self,
        name: &str,
    ) -> Vec<TagRecord> {
        match self {
            Self::Resident(index) => index.get(name).await,
            Self::ByteRange(index) => index.get(name).await,
        }
    }

    async fn prefix_search(
        &self,
        prefix: &str,
    ) -> Vec<String> {
        match self {
            Self::Resident(index) => index.prefix_search(prefix).await,
            Self::ByteRange(index) => index.prefix_search(prefix).await,
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Resident(index) => index.len(),
            Self::ByteRange(index) => index.len(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/index/symbol_index_tests.rs"]
mod tests;
