use tower_lsp::lsp_types::Position;

/// Snapshot of one open document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub text: String,
    pub version: i32,
    /// Byte offset where each line starts.
    line_starts: Vec<usize>,
}

/// Characters that may appear in a tag name under the cursor.
pub fn is_symbol_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

impl Document {
    pub fn new(
        text: String,
        version: i32,
    ) -> Self {
        let line_starts = line_starts(&text);
        Self {
            text,
            version,
            line_starts,
        }
    }

    pub(crate) fn set_content(
        &mut self,
        text: String,
        version: i32,
    ) {
        self.line_starts = line_starts(&text);
        self.text = text;
        self.version = version;
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 0-based line without its terminator.
    pub fn line_text(
        &self,
        line: usize,
    ) -> Option<&str> {
        let start = *self.line_starts.get(line)?;
        let end = self.line_starts.get(line + 1).copied().unwrap_or(self.text.len());
        Some(self.text[start..end].trim_end_matches('\n').trim_end_matches('\r'))
    }

    /// The symbol touching `pos`: the one the cursor is inside, or the one
    /// ending right before it.
    pub fn word_at(
        &self,
        pos: Position,
    ) -> Option<&str> {
        let line = self.line_text(pos.line as usize)?;
        let cursor = byte_column(line, pos.character);

        let start = line[..cursor].rfind(|ch: char| !is_symbol_char(ch)).map_or(0, |idx| idx + next_len(line, idx));
        let end = line[cursor..].find(|ch: char| !is_symbol_char(ch)).map_or(line.len(), |idx| cursor + idx);

        let word = &line[start..end];
        (!word.is_empty()).then_some(word)
    }

    /// The part of a symbol left of `pos`, as typed so far.
    pub fn word_prefix_at(
        &self,
        pos: Position,
    ) -> Option<&str> {
        let line = self.line_text(pos.line as usize)?;
        let cursor = byte_column(line, pos.character);

        let start = line[..cursor].rfind(|ch: char| !is_symbol_char(ch)).map_or(0, |idx| idx + next_len(line, idx));
        let prefix = &line[start..cursor];
        (!prefix.is_empty()).then_some(prefix)
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0).chain(text.match_indices('\n').map(|(idx, _)| idx + 1)).collect()
}

/// Byte offset in `line` of a UTF-16 column, clamped to the line end.
fn byte_column(
    line: &str,
    character: u32,
) -> usize {
    let mut utf16 = 0u32;
    for (idx, ch) in line.char_indices() {
        if utf16 >= character {
            return idx;
        }
        utf16 += ch.len_utf16() as u32;
    }
    line.len()
}

fn next_len(
    line: &str,
    idx: usize,
) -> usize {
    line[idx..].chars().next().map_or(1, char::len_utf8)
}

#[cfg(test)]
#[path = "../../tests/src/document/text_tests.rs"]
mod tests;
