use std::{
    collections::{BTreeMap, HashSet},
    ops::{Bound, Range},
    sync::Arc,
};

use super::TagStore;
use crate::tags::TagRecord;

/// Fully materialized index: every record held in memory, keyed by name in
/// an ordered map so prefix queries are a range scan.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResidentIndex {
    by_name: BTreeMap<String, Vec<TagRecord>>,
    /// Interned defining-file paths; large tables repeat them heavily.
    files: HashSet<Arc<str>>,
    records: usize,
}

impl ResidentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct names.
    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }

    fn intern(
        &mut self,
        file: Arc<str>,
    ) -> Arc<str> {
        if let Some(existing) = self.files.get(&*file) {
            return Arc::clone(existing);
        }
        self.files.insert(Arc::clone(&file));
        file
    }

    fn names_from<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a String> + 'a {
        self.by_name
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .map(|(name, _)| name)
            .take_while(move |name| name.starts_with(prefix))
    }
}

impl TagStore for ResidentIndex {
    fn insert(
        &mut self,
        mut record: TagRecord,
        _span: Range<u64>,
    ) {
        record.file = self.intern(Arc::clone(&record.file));
        self.records += 1;
        self.by_name.entry(record.name.clone()).or_default().push(record);
    }

    async fn get(
        &self,
        name: &str,
    ) -> Vec<TagRecord> {
        self.by_name.get(name).cloned().unwrap_or_default()
    }

    async fn prefix_search(
        &self,
        prefix: &str,
    ) -> Vec<String> {
        self.names_from(prefix).cloned().collect()
    }

    fn len(&self) -> usize {
        self.records
    }
}

#[cfg(test)]
#[path = "../../tests/src/index/resident_tests.rs"]
mod tests;
