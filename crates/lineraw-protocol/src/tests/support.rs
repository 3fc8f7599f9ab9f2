//! Test harness utilities for the protocol behavioural suites.

use std::fmt::Write as _;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::dispatch::{SubcommandHandler, local_failure};
use crate::errors::{LineRawError, ProtocolError};
use crate::queue::SerialExecutor;
use crate::reader::LineRawRead;
use crate::tokens::{expect_unit, split_tokens};
use crate::writer::ResultWriter;

/// Reader adaptor that returns at most `chunk` bytes per `read` call.
///
/// Exercises every buffer-boundary path in the framing reader without
/// needing inputs sized to the real buffer.
pub struct ChunkedReader {
    data: Vec<u8>,
    position: usize,
    chunk: usize,
}

impl ChunkedReader {
    pub fn new(data: impl Into<Vec<u8>>, chunk: usize) -> Self {
        assert!(chunk > 0, "chunk size must be positive");
        Self {
            data: data.into(),
            position: 0,
            chunk,
        }
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.position..];
        let take = remaining.len().min(self.chunk).min(buf.len());
        buf[..take].copy_from_slice(&remaining[..take]);
        self.position += take;
        Ok(take)
    }
}

/// Reader adaptor that fails with `ErrorKind::Interrupted` on every other
/// `read` call.
pub struct InterruptingReader {
    inner: ChunkedReader,
    interrupt_next: bool,
}

impl InterruptingReader {
    pub fn new(data: impl Into<Vec<u8>>, chunk: usize) -> Self {
        Self {
            inner: ChunkedReader::new(data, chunk),
            interrupt_next: true,
        }
    }
}

impl Read for InterruptingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.interrupt_next {
            self.interrupt_next = false;
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        self.interrupt_next = true;
        self.inner.read(buf)
    }
}

/// Thread-safe in-memory sink for captured protocol output.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().expect("buffer lock").clone()).expect("utf8 output")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Subcommand that expects the data units `id`, `id - 1`, ... `0` followed
/// by `ENDCOUNTDOWN` and `ENDCOMMAND`, then reports success.
pub struct CountdownHandler {
    writer: Arc<ResultWriter>,
}

impl CountdownHandler {
    pub fn new(writer: Arc<ResultWriter>) -> Self {
        Self { writer }
    }

    fn parse_body(
        command_id: u64,
        args: Option<&str>,
        input: &mut dyn LineRawRead,
    ) -> Result<(), LineRawError> {
        if let Some(args) = args {
            return Err(ProtocolError::unexpected_arguments("COUNTDOWN", args).into());
        }
        for expected in (0..=command_id).rev() {
            expect_unit(input, &expected.to_string())?;
        }
        expect_unit(input, "ENDCOUNTDOWN")?;
        expect_unit(input, "ENDCOMMAND")
    }
}

impl SubcommandHandler for CountdownHandler {
    fn parse_and_execute(
        &self,
        command_id: u64,
        args: Option<&str>,
        input: &mut dyn LineRawRead,
        tasks: &SerialExecutor,
    ) -> Result<(), LineRawError> {
        let outcome = local_failure(Self::parse_body(command_id, args, input))?;
        let writer = Arc::clone(&self.writer);
        tasks.submit(move || {
            writer
                .write_results(command_id, outcome.err().as_deref())
                .expect("write results");
        });
        Ok(())
    }
}

/// Subcommand taking `<start> <delay_ms>` arguments and expecting the data
/// units `start`, `start + 1`, ... `id` followed by `ENDCOUNTUP` and
/// `ENDCOMMAND`. Its queued task sleeps for the requested delay before
/// reporting, so earlier commands can be made to finish executing after
/// later ones were parsed.
pub struct CountupHandler {
    writer: Arc<ResultWriter>,
}

impl CountupHandler {
    pub fn new(writer: Arc<ResultWriter>) -> Self {
        Self { writer }
    }

    fn parse_body(
        command_id: u64,
        args: Option<&str>,
        input: &mut dyn LineRawRead,
    ) -> Result<u64, LineRawError> {
        let args = args.ok_or(ProtocolError::missing_arguments(
            "COUNTUP",
            "<start> <delay_ms>",
        ))?;
        let tokens = split_tokens(args, 2)?;
        let start = parse_argument(&tokens[0])?;
        let delay_ms = parse_argument(&tokens[1])?;
        for expected in start..=command_id {
            expect_unit(input, &expected.to_string())?;
        }
        expect_unit(input, "ENDCOUNTUP")?;
        expect_unit(input, "ENDCOMMAND")?;
        Ok(delay_ms)
    }
}

fn parse_argument(token: &Option<String>) -> Result<u64, ProtocolError> {
    let token = token
        .as_deref()
        .ok_or(ProtocolError::missing_arguments("COUNTUP", "<start> <delay_ms>"))?;
    token
        .parse::<u64>()
        .map_err(|_| ProtocolError::invalid_arguments("COUNTUP", format!("'{token}'")))
}

impl SubcommandHandler for CountupHandler {
    fn parse_and_execute(
        &self,
        command_id: u64,
        args: Option<&str>,
        input: &mut dyn LineRawRead,
        tasks: &SerialExecutor,
    ) -> Result<(), LineRawError> {
        let outcome = local_failure(Self::parse_body(command_id, args, input))?;
        let writer = Arc::clone(&self.writer);
        tasks.submit(move || {
            if let Ok(delay_ms) = &outcome {
                thread::sleep(Duration::from_millis(*delay_ms));
            }
            writer
                .write_results(command_id, outcome.err().as_deref())
                .expect("write results");
        });
        Ok(())
    }
}

/// Formats one raw-mode chunk: the byte count line followed immediately by
/// the payload, with no trailing delimiter.
pub fn raw_chunk(payload: &str) -> String {
    format!("{}\n{payload}", payload.len())
}

/// Wraps chunks into a complete raw-mode unit.
pub fn raw_unit(chunks: &[&str]) -> String {
    let mut unit = String::from("RAW\n");
    for chunk in chunks {
        let _ = write!(unit, "{}", raw_chunk(chunk));
    }
    unit.push_str("ENDRAW\n");
    unit
}

/// Builds a complete COUNTDOWN command for `command_id`.
pub fn countdown_command(command_id: u64) -> String {
    let mut text = format!("COMMAND {command_id}\nCOUNTDOWN\n");
    for value in (0..=command_id).rev() {
        let _ = writeln!(text, "{value}");
    }
    text.push_str("ENDCOUNTDOWN\nENDCOMMAND\n");
    text
}

/// Builds a complete COUNTUP command for `command_id`.
pub fn countup_command(command_id: u64, start: u64, delay_ms: u64) -> String {
    let mut text = format!("COMMAND {command_id}\nCOUNTUP {start} {delay_ms}\n");
    for value in start..=command_id {
        let _ = writeln!(text, "{value}");
    }
    text.push_str("ENDCOUNTUP\nENDCOMMAND\n");
    text
}
