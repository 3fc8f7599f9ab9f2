//! Test harness utilities for the broker behavioural suites.

use std::fmt::Write as _;
use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use lineraw_config::CommandIdPolicy;
use lineraw_protocol::{LineRawReader, ResultWriter};

use crate::actor::PubSubActor;
use crate::session::{Session, SessionError};

/// Thread-safe in-memory sink for captured session output.
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

/// Runs one session over a scripted command stream and captures its output.
pub fn run_session(
    actor: Arc<dyn PubSubActor>,
    policy: CommandIdPolicy,
    script: &str,
) -> (Result<(), SessionError>, String) {
    let output = SharedBuffer::default();
    let writer = Arc::new(ResultWriter::new(output.clone()));
    let session = Session::new(actor, writer, policy);
    let mut input = LineRawReader::new(Cursor::new(script.as_bytes().to_vec()), 64);
    let result = session.run(&mut input);
    (result, output.contents())
}

/// Builds a complete PUBLISH command; payload units are sent as given.
pub fn publish_command(command_id: u64, metadata: &str, payload_units: &[&str]) -> String {
    let mut text = format!("COMMAND {command_id}\nPUBLISH\nMETADATA\n{metadata}\nPAYLOAD\n");
    for unit in payload_units {
        let _ = writeln!(text, "{unit}");
    }
    text.push_str("ENDPAYLOAD\nENDPUBLISH\nENDCOMMAND\n");
    text
}

/// Builds a complete SUBSCRIBE command.
pub fn subscribe_command(command_id: u64, subscription_id: i64, filter: &str) -> String {
    format!("COMMAND {command_id}\nSUBSCRIBE {subscription_id}\n{filter}\nENDCOMMAND\n")
}

/// Builds a complete UNSUBSCRIBE command.
pub fn unsubscribe_command(command_id: u64, subscription_id: i64) -> String {
    format!("COMMAND {command_id}\nUNSUBSCRIBE {subscription_id}\nENDCOMMAND\n")
}

/// Formats a raw-mode unit carrying one counted chunk per entry.
pub fn raw_unit(chunks: &[&str]) -> String {
    let mut unit = String::from("RAW\n");
    for chunk in chunks {
        let _ = write!(unit, "{}\n{chunk}", chunk.len());
    }
    unit.push_str("ENDRAW");
    unit
}

/// Splits captured output into the number of `READY` lines and the
/// remaining text.
///
/// Readiness signals come from the session thread while result blocks come
/// from the queue worker, so their interleaving is not deterministic; tests
/// assert on each side separately.
pub fn split_output(output: &str) -> (usize, String) {
    let mut readies = 0;
    let mut rest = String::new();
    for line in output.split_inclusive('\n') {
        if line == "READY\n" {
            readies += 1;
        } else {
            rest.push_str(line);
        }
    }
    (readies, rest)
}

/// The result block emitted for a successful command.
pub fn done_block(command_id: u64) -> String {
    format!("RESULTS {command_id}\nDONE\nENDRESULTS\n")
}

/// The result block emitted for a refused or malformed command.
pub fn failed_block(command_id: u64, message: &str) -> String {
    format!("RESULTS {command_id}\nFAILED\n{message}\nENDFAILED\nENDRESULTS\n")
}
