//! Result emission for numbered commands.
//!
//! The output stream is shared between the parsing thread (session signals),
//! the serial queue worker (command results), and shutdown paths, so every
//! write-plus-flush happens under one mutex. Output is flushed after every
//! block so partial results are never buffered indefinitely.

use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::errors::LineRawError;

/// Formats and emits command outcomes to the shared output stream.
pub struct ResultWriter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ResultWriter {
    /// Wraps an output stream.
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    fn lock_out(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        self.out.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes one numbered results block and flushes.
    ///
    /// The block is `RESULTS <id>` followed by `DONE` when `failure` is
    /// absent, or `FAILED` / the failure text / `ENDFAILED` when present,
    /// closed by `ENDRESULTS`.
    ///
    /// # Errors
    ///
    /// Returns [`LineRawError::Io`] when writing or flushing fails.
    pub fn write_results(
        &self,
        command_id: u64,
        failure: Option<&str>,
    ) -> Result<(), LineRawError> {
        let mut block = format!("RESULTS {command_id}\n");
        match failure {
            None => block.push_str("DONE\n"),
            Some(message) => {
                block.push_str("FAILED\n");
                block.push_str(message);
                block.push_str("\nENDFAILED\n");
            }
        }
        block.push_str("ENDRESULTS\n");
        let mut out = self.lock_out();
        out.write_all(block.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Writes one line of session-level output (e.g. the `READY` signal)
    /// and flushes.
    ///
    /// # Errors
    ///
    /// Returns [`LineRawError::Io`] when writing or flushing fails.
    pub fn write_line(&self, line: &str) -> Result<(), LineRawError> {
        let mut out = self.lock_out();
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().expect("buffer lock").clone()).expect("utf8")
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("buffer lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn success_block_contains_done() {
        let buffer = SharedBuffer::default();
        let writer = ResultWriter::new(buffer.clone());
        writer.write_results(12, None).expect("write results");
        assert_eq!(buffer.contents(), "RESULTS 12\nDONE\nENDRESULTS\n");
    }

    #[test]
    fn failure_block_wraps_diagnostic() {
        let buffer = SharedBuffer::default();
        let writer = ResultWriter::new(buffer.clone());
        writer
            .write_results(3, Some("did not receive a valid countdown sequence"))
            .expect("write results");
        assert_eq!(
            buffer.contents(),
            "RESULTS 3\nFAILED\ndid not receive a valid countdown sequence\nENDFAILED\nENDRESULTS\n"
        );
    }

    #[test]
    fn session_lines_are_newline_terminated() {
        let buffer = SharedBuffer::default();
        let writer = ResultWriter::new(buffer.clone());
        writer.write_line("READY").expect("write line");
        assert_eq!(buffer.contents(), "READY\n");
    }
}
