//! Framing reader for the line/raw wire protocol.
//!
//! [`LineRawReader`] turns an arbitrarily-chunked byte stream into a sequence
//! of logical data units. It starts every [`LineRawReader::read_unit`] call in
//! line mode; raw mode is entered and exited within a single call and never
//! persists across calls. The reader maintains its own refill buffer because
//! line scanning and exact-count reads interleave on the same stream, and a
//! single physical read may return any number of bytes.

use std::io::{self, Read};

use crate::errors::{LineRawError, ProtocolError};

/// Marker opening a raw block.
const RAW_MARKER: &[u8] = b"RAW";
/// Marker closing a raw block.
const ENDRAW_MARKER: &[u8] = b"ENDRAW";

/// Seam through which dispatch code reads data units.
///
/// Handlers consume `&mut dyn LineRawRead` so the dispatch tree is not
/// generic over the underlying stream type.
pub trait LineRawRead {
    /// Reads the next data unit, blocking until one is complete.
    ///
    /// # Errors
    ///
    /// Returns [`LineRawError::EndOfStream`] when the source is exhausted
    /// before a unit can be completed, [`LineRawError::Io`] on stream
    /// failures, and [`LineRawError::Protocol`] when raw-mode framing is
    /// violated or a unit cannot be decoded as UTF-8.
    fn read_unit(&mut self) -> Result<String, LineRawError>;
}

/// Framing reader over any [`Read`] source.
///
/// In line mode, units are delimited by `\n`, `\r`, or `\r\n`, with the
/// delimiter excluded from the returned text. A line consisting of the
/// literal `RAW` switches the current call into raw mode: pairs of a
/// positive decimal byte count and exactly that many payload bytes follow,
/// until `ENDRAW`. The counted bytes are concatenated and returned as one
/// unit, so payloads containing terminator-like bytes travel unharmed.
pub struct LineRawReader<R> {
    inner: R,
    buf: Box<[u8]>,
    start: usize,
    end: usize,
    eof: bool,
}

impl<R: Read> LineRawReader<R> {
    /// Creates a reader with the given refill buffer size in bytes.
    pub fn new(inner: R, buffer_size: usize) -> Self {
        Self {
            inner,
            buf: vec![0; buffer_size.max(1)].into_boxed_slice(),
            start: 0,
            end: 0,
            eof: false,
        }
    }

    /// Consumes the reader and returns the underlying source.
    ///
    /// Bytes already pulled into the refill buffer are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Refills the buffer with at least one byte, unless the source is at
    /// end of stream. Interrupted reads are retried.
    ///
    /// Only called once the buffered region is fully consumed.
    fn fill(&mut self) -> io::Result<()> {
        debug_assert_eq!(self.start, self.end);
        self.start = 0;
        self.end = 0;
        loop {
            match self.inner.read(&mut self.buf) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(read) => {
                    self.end = read;
                    return Ok(());
                }
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }
        }
    }

    /// Reads one line, excluding its terminator.
    ///
    /// Returns `None` at a clean end of stream. Unterminated bytes buffered
    /// when the stream ends are surfaced as a final line rather than being
    /// discarded; callers needing clean termination must detect it
    /// themselves.
    fn read_line(&mut self) -> Result<Option<Vec<u8>>, LineRawError> {
        let mut line = Vec::new();
        loop {
            let mut cursor = self.start;
            while cursor < self.end {
                match self.buf[cursor] {
                    b'\n' => {
                        line.extend_from_slice(&self.buf[self.start..cursor]);
                        self.start = cursor + 1;
                        return Ok(Some(line));
                    }
                    b'\r' => {
                        line.extend_from_slice(&self.buf[self.start..cursor]);
                        self.start = cursor + 1;
                        self.consume_linefeed_after_carriage_return()?;
                        return Ok(Some(line));
                    }
                    _ => cursor += 1,
                }
            }
            line.extend_from_slice(&self.buf[self.start..self.end]);
            self.start = self.end;
            if self.eof {
                return if line.is_empty() { Ok(None) } else { Ok(Some(line)) };
            }
            self.fill()?;
        }
    }

    /// A `\r\n` pair may straddle a refill boundary; peek one byte ahead so
    /// the `\n` is not misread as an empty following line.
    fn consume_linefeed_after_carriage_return(&mut self) -> Result<(), LineRawError> {
        if self.start == self.end && !self.eof {
            self.fill()?;
        }
        if self.start < self.end && self.buf[self.start] == b'\n' {
            self.start += 1;
        }
        Ok(())
    }

    /// Reads exactly `count` raw bytes, looping across however many physical
    /// reads it takes.
    fn read_exact_count(&mut self, count: usize) -> Result<Vec<u8>, LineRawError> {
        let mut chunk = Vec::with_capacity(count);
        while chunk.len() < count {
            if self.start == self.end {
                if self.eof {
                    return Err(LineRawError::EndOfStream);
                }
                self.fill()?;
                continue;
            }
            let take = (count - chunk.len()).min(self.end - self.start);
            chunk.extend_from_slice(&self.buf[self.start..self.start + take]);
            self.start += take;
        }
        Ok(chunk)
    }

    fn read_raw_block(&mut self) -> Result<Vec<u8>, LineRawError> {
        let mut payload: Option<Vec<u8>> = None;
        loop {
            let count_line = self.read_line()?.ok_or(LineRawError::EndOfStream)?;
            if count_line == ENDRAW_MARKER {
                break;
            }
            let count = parse_chunk_count(&count_line)?;
            let chunk = self.read_exact_count(count)?;
            payload.get_or_insert_with(Vec::new).extend_from_slice(&chunk);
        }
        // ENDRAW with no preceding counted chunk is a framing error, not an
        // empty unit.
        payload.ok_or_else(|| ProtocolError::EmptyRawBlock.into())
    }
}

impl<R: Read> LineRawRead for LineRawReader<R> {
    fn read_unit(&mut self) -> Result<String, LineRawError> {
        let line = self.read_line()?.ok_or(LineRawError::EndOfStream)?;
        let bytes = if line == RAW_MARKER {
            self.read_raw_block()?
        } else {
            line
        };
        decode_unit(&bytes)
    }
}

/// Decodes a completed unit with the reader-wide fixed encoding (UTF-8).
fn decode_unit(bytes: &[u8]) -> Result<String, LineRawError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|error| ProtocolError::invalid_encoding(&error).into())
}

/// Parses a raw chunk byte count: a strictly positive decimal integer.
fn parse_chunk_count(line: &[u8]) -> Result<usize, LineRawError> {
    let text = std::str::from_utf8(line)
        .map_err(|_| ProtocolError::raw_count_not_integer(String::from_utf8_lossy(line)))?;
    let count: i64 = text
        .parse()
        .map_err(|_| ProtocolError::raw_count_not_integer(text))?;
    if count <= 0 {
        return Err(ProtocolError::raw_count_not_positive(count).into());
    }
    usize::try_from(count).map_err(|_| ProtocolError::raw_count_not_integer(text).into())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn reader(input: &str) -> LineRawReader<Cursor<Vec<u8>>> {
        LineRawReader::new(Cursor::new(input.as_bytes().to_vec()), 1024)
    }

    #[test]
    fn single_line_strips_terminator() {
        let mut r = reader("Good evening, gentlemen.\n");
        assert_eq!(r.read_unit().ok(), Some("Good evening, gentlemen.".to_owned()));
    }

    #[test]
    fn crlf_across_refill_boundary_is_one_terminator() {
        // Buffer of 2 forces the \r and \n into separate refills.
        let mut r = LineRawReader::new(Cursor::new(b"a\r\nb\n".to_vec()), 2);
        assert_eq!(r.read_unit().ok(), Some("a".to_owned()));
        assert_eq!(r.read_unit().ok(), Some("b".to_owned()));
    }

    #[test]
    fn clean_eof_reports_end_of_stream() {
        let mut r = reader("only\n");
        assert_eq!(r.read_unit().ok(), Some("only".to_owned()));
        assert!(matches!(r.read_unit(), Err(LineRawError::EndOfStream)));
    }

    #[test]
    fn trailing_unterminated_bytes_surface_as_final_line() {
        let mut r = reader("complete\npartial");
        assert_eq!(r.read_unit().ok(), Some("complete".to_owned()));
        assert_eq!(r.read_unit().ok(), Some("partial".to_owned()));
        assert!(matches!(r.read_unit(), Err(LineRawError::EndOfStream)));
    }

    #[test]
    fn raw_chunks_concatenate() {
        // Counted bytes stop exactly at the declared count; the next count
        // line starts immediately, with no separator after the payload.
        let mut r = reader("RAW\n4\nabcd2\nefENDRAW\n");
        assert_eq!(r.read_unit().ok(), Some("abcdef".to_owned()));
    }

    #[test]
    fn raw_payload_may_contain_terminator_bytes() {
        let mut r = reader("RAW\n9\nab\ncd\r\nefENDRAW\n");
        assert_eq!(r.read_unit().ok(), Some("ab\ncd\r\nef".to_owned()));
    }

    #[test]
    fn eof_inside_raw_chunk_is_end_of_stream() {
        let mut r = reader("RAW\n10\nabc");
        assert!(matches!(r.read_unit(), Err(LineRawError::EndOfStream)));
    }
}
