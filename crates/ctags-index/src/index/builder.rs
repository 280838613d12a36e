use std::{io::ErrorKind, path::Path, time::Instant};

use tokio::fs::File;
use tracing::{debug, info, warn};

use super::{StorageLayout, SymbolIndex, TagStore};
use crate::tags::LineStream;

/// Build an index by streaming `table` once.
///
/// A missing, unreadable, or truncated-by-error table yields an empty index
/// so the engine stays queryable before the first successful generation.
pub async fn build(
    table: &Path,
    layout: StorageLayout,
) -> SymbolIndex {
    let started = Instant::now();
    let mut index = SymbolIndex::empty(table, layout);

    let file = match File::open(table).await {
        Ok(file) => file,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            debug!("[index] no tag table at {}, starting empty", table.display());
            return index;
        },
        Err(error) => {
            warn!("[index] cannot open tag table {}: {error}", table.display());
            return index;
        },
    };

    let mut lines = LineStream::new(file);
    loop {
        match lines.next_record().await {
            Ok(Some((span, record))) => index.insert(record, span),
            Ok(None) => break,
            Err(error) => {
                warn!("[index] failed reading {}: {error}; discarding partial index", table.display());
                return SymbolIndex::empty(table, layout);
            },
        }
    }

    info!(
        "[index] built {:?} index: {} records from {} in {:.1?}",
        layout,
        index.len(),
        table.display(),
        started.elapsed(),
    );
    index
}

#[cfg(test)]
#[path = "../../tests/src/index/builder_tests.rs"]
mod tests;
