//! Turns tag location hints into concrete 0-based line numbers.
//!
//! Numeric hints are taken as-is. Pattern hints are re-matched against the
//! defining file on disk, since line numbers drift as sources are edited
//! after the table was generated. Resolution never fails: anything that
//! cannot be resolved lands on line 0.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use regex::bytes::Regex;
use tokio::fs::File;
use tracing::{debug, warn};

use crate::tags::{LineStream, LocationHint, TagRecord};

pub const DEFAULT_RESOLVE_CONCURRENCY: usize = 8;

/// A resolved definition site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Match {
    /// `base_dir` joined with the record's file.
    pub path: PathBuf,
    /// 0-based line.
    pub lineno: u32,
}

pub async fn resolve(
    record: &TagRecord,
    base_dir: &Path,
) -> Match {
    let path = base_dir.join(&*record.file);
    let hint = record.location_hint();

    let lineno = match &hint {
        LocationHint::Line(line) => *line,
        LocationHint::Pattern {
            ..
        } => match hint.line_regex() {
            Some(Ok(regex)) => scan_for_line(&path, &regex).await.unwrap_or(0),
            Some(Err(error)) => {
                warn!("[resolve] bad pattern for '{}' ({}): {error}", record.name, record.hint);
                0
            },
            None => 0,
        },
        LocationHint::Unresolvable => {
            debug!("[resolve] '{}' has no usable location ({})", record.name, record.hint);
            0
        },
    };

    Match {
        path,
        lineno,
    }
}

/// Resolve every record, at most `concurrency` at a time, keeping input order.
pub async fn resolve_all(
    records: &[TagRecord],
    base_dir: &Path,
    concurrency: usize,
) -> Vec<Match> {
    // Collect first; a lazy `map` here is not `Send` inside spawned tasks.
    let pending: Vec<_> = records.iter().map(|record| resolve(record, base_dir)).collect();
    stream::iter(pending)
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// First 0-based line of `path` matching `pattern`. Stops reading at the
/// first hit.
async fn scan_for_line(
    path: &Path,
    pattern: &Regex,
) -> Option<u32> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(error) => {
            warn!("[resolve] cannot open {}: {error}", path.display());
            return None;
        },
    };

    let mut lines = LineStream::new(file);
    let mut lineno = 0u32;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if pattern.is_match(line.content()) {
                    return Some(lineno);
                }
                lineno = lineno.saturating_add(1);
            },
            Ok(None) => {
                debug!("[resolve] pattern {} not found in {}", pattern.as_str(), path.display());
                return None;
            },
            Err(error) => {
                warn!("[resolve] read failed for {}: {error}", path.display());
                return None;
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/resolve_tests.rs"]
mod tests;
