use std::{
    collections::{BTreeMap, HashSet},
    io::SeekFrom,
    ops::{Bound, Range},
    path::{Path, PathBuf},
};

use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt},
};
use tracing::{debug, warn};

use super::TagStore;
use crate::tags::{LineStream, TagRecord};

pub const DEFAULT_BUCKET_PREFIX_LEN: usize = 7;

/// Offset-only index over a tag table.
///
/// Names are grouped into buckets by their first `bucket_prefix_len`
/// characters. Each bucket stores the byte span `[start, end)` covering every
/// table line of its members, so a lookup reads only that span and filters
/// for the exact name. Spans are widened to the outermost member lines, which
/// keeps them a superset of the members even if the table is not sorted.
#[derive(Debug, PartialEq, Eq)]
pub struct ByteRangeIndex {
    table: PathBuf,
    bucket_prefix_len: usize,
    buckets: BTreeMap<String, Range<u64>>,
    records: usize,
}

impl ByteRangeIndex {
    pub fn new(
        table: &Path,
        bucket_prefix_len: usize,
    ) -> Self {
        Self {
            table: table.to_path_buf(),
            bucket_prefix_len: bucket_prefix_len.max(1),
            buckets: BTreeMap::new(),
            records: 0,
        }
    }

    pub fn bucket_prefix_len(&self) -> usize {
        self.bucket_prefix_len
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// The span a lookup of `name` will stream, if its bucket exists.
    pub fn span_for(
        &self,
        name: &str,
    ) -> Option<Range<u64>> {
        self.buckets.get(bucket_key(name, self.bucket_prefix_len)).cloned()
    }

    /// Spans of every bucket that may hold a name starting with `prefix`,
    /// merged where they touch or overlap, in file order.
    fn spans_for_prefix(
        &self,
        prefix: &str,
    ) -> Vec<Range<u64>> {
        let mut spans: Vec<Range<u64>> = if prefix.chars().count() >= self.bucket_prefix_len {
            self.span_for(prefix).into_iter().collect()
        } else {
            self.buckets
                .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
                .take_while(|(key, _)| key.starts_with(prefix))
                .map(|(_, span)| span.clone())
                .collect()
        };

        spans.sort_by_key(|span| span.start);
        let mut merged: Vec<Range<u64>> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
                _ => merged.push(span),
            }
        }
        merged
    }

    /// Stream the records stored in `span`, keeping those `keep` accepts.
    async fn scan_span(
        &self,
        span: Range<u64>,
        mut keep: impl FnMut(&TagRecord) -> bool + Send,
    ) -> Vec<TagRecord> {
        let mut file = match File::open(&self.table).await {
            Ok(file) => file,
            Err(error) => {
                warn!("[index] cannot open tag table {}: {error}", self.table.display());
                return Vec::new();
            },
        };
        if let Err(error) = file.seek(SeekFrom::Start(span.start)).await {
            warn!("[index] seek to {} failed in {}: {error}", span.start, self.table.display());
            return Vec::new();
        }

        let mut lines = LineStream::starting_at(file.take(span.end - span.start), span.start);
        let mut found = Vec::new();
        loop {
            match lines.next_record().await {
                Ok(Some((_, record))) => {
                    if keep(&record) {
                        found.push(record);
                    }
                },
                Ok(None) => break,
                Err(error) => {
                    warn!("[index] read failed in {} at {:?}: {error}", self.table.display(), span);
                    break;
                },
            }
        }
        found
    }
}

impl TagStore for ByteRangeIndex {
    fn insert(
        &mut self,
        record: TagRecord,
        span: Range<u64>,
    ) {
        self.records += 1;
        let key = bucket_key(&record.name, self.bucket_prefix_len);
        match self.buckets.get_mut(key) {
            Some(bucket) => {
                bucket.start = bucket.start.min(span.start);
                bucket.end = bucket.end.max(span.end);
            },
            None => {
                self.buckets.insert(key.to_owned(), span);
            },
        }
    }

    async fn get(
        &self,
        name: &str,
    ) -> Vec<TagRecord> {
        let Some(span) = self.span_for(name) else {
            return Vec::new();
        };
        debug!("[index] '{name}' → bytes {}..{} of {}", span.start, span.end, self.table.display());
        self.scan_span(span, |record| record.name == name).await
    }

    async fn prefix_search(
        &self,
        prefix: &str,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for span in self.spans_for_prefix(prefix) {
            for record in self.scan_span(span, |record| record.name.starts_with(prefix)).await {
                if seen.insert(record.name.clone()) {
                    names.push(record.name);
                }
            }
        }
        names
    }

    fn len(&self) -> usize {
        self.records
    }
}

/// First `len` characters of `name` (the whole name if shorter).
pub fn bucket_key(
    name: &str,
    len: usize,
) -> &str {
    match name.char_indices().nth(len) {
        Some((end, _)) => &name[..end],
        None => name,
    }
}

#[cfg(test)]
#[path = "../../tests/src/index/byte_range_tests.rs"]
mod tests;
