use std::sync::Arc;

use super::hint::LocationHint;

/// Lines starting with this marker are tag-table metadata (`!_TAG_FILE_FORMAT`,
/// `!_TAG_PROGRAM_NAME`, ...), never symbols.
pub const PSEUDO_TAG_PREFIX: &str = "!_";

/// Terminator written after an ex-command pattern, before extension fields.
const EX_COMMAND_END: &str = "/;\"";

/// One symbol definition parsed from a tag table line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    /// Symbol name (first field).
    pub name: String,
    /// Defining file, relative to the directory the table was generated in.
    pub file: Arc<str>,
    /// Raw location field: a line number or a `/^...$/;"` search pattern.
    pub hint: String,
}

impl TagRecord {
    pub fn location_hint(&self) -> LocationHint {
        LocationHint::parse(&self.hint)
    }
}

/// Parse one tag table line.
///
/// Returns `None` for pseudo-tag lines and for lines with fewer than three
/// tab-separated fields. Extension fields after the location are dropped.
pub fn parse_line(line: &str) -> Option<TagRecord> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.starts_with(PSEUDO_TAG_PREFIX) {
        return None;
    }

    let (name, rest) = line.split_once('\t')?;
    let (file, rest) = rest.split_once('\t')?;
    let hint = location_field(rest);

    Some(TagRecord {
        name: name.to_owned(),
        file: Arc::from(file),
        hint: hint.to_owned(),
    })
}

/// Cut the location field out of everything after the file field.
///
/// Search patterns copy the source line verbatim, so they may contain
/// literal tabs; those run up to the `/;"` terminator instead of the next tab.
fn location_field(rest: &str) -> &str {
    if rest.starts_with('/')
        && let Some((end, _)) =
            rest.match_indices(EX_COMMAND_END).find(|(idx, _)| *idx > 0 && !rest[..*idx].ends_with('\\'))
    {
        return &rest[..end + EX_COMMAND_END.len()];
    }
    rest.split('\t').next().unwrap_or(rest)
}

#[cfg(test)]
#[path = "../../tests/src/tags/record_tests.rs"]
mod tests;
