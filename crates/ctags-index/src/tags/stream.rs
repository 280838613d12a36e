use std::{borrow::Cow, io, ops::Range};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use super::record::{TagRecord, parse_line};

/// One raw line plus the byte span it occupies in the underlying file.
#[derive(Debug)]
pub struct TableLine<'a> {
    pub span: Range<u64>,
    bytes: &'a [u8],
}

impl TableLine<'_> {
    /// Line bytes without the trailing `\n` / `\r\n`.
    pub fn content(&self) -> &[u8] {
        let bytes = self.bytes.strip_suffix(b"\n").unwrap_or(self.bytes);
        bytes.strip_suffix(b"\r").unwrap_or(bytes)
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.content())
    }
}

/// Lazy, non-restartable line reader that tracks absolute byte offsets.
///
/// Used both for whole-table builds and for streaming a single byte range
/// of the table, in which case `starting_at` receives the seek position so
/// spans stay absolute.
pub struct LineStream<R> {
    reader: BufReader<R>,
    offset: u64,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineStream<R> {
    pub fn new(reader: R) -> Self {
        Self::starting_at(reader, 0)
    }

    pub fn starting_at(
        reader: R,
        offset: u64,
    ) -> Self {
        Self {
            reader: BufReader::new(reader),
            offset,
            buf: Vec::with_capacity(256),
        }
    }

    /// Next line, or `None` at end of input.
    pub async fn next_line(&mut self) -> io::Result<Option<TableLine<'_>>> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf).await?;
        if read == 0 {
            return Ok(None);
        }
        let start = self.offset;
        self.offset += read as u64;
        Ok(Some(TableLine {
            span: start..self.offset,
            bytes: &self.buf,
        }))
    }

    /// Next line that parses as a tag record; headers and malformed lines
    /// are skipped.
    pub async fn next_record(&mut self) -> io::Result<Option<(Range<u64>, TagRecord)>> {
        loop {
            let Some(line) = self.next_line().await? else {
                return Ok(None);
            };
            let record = parse_line(&line.text());
            if let Some(record) = record {
                return Ok(Some((line.span, record)));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/tags/stream_tests.rs"]
mod tests;
