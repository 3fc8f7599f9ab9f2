//! Framing, dispatch, and ordered execution for the line/raw wire protocol.
//!
//! The protocol drives test actors over a byte stream, usually a process's
//! standard input and output. Incoming bytes are segmented into discrete
//! "data units" by the [`reader::LineRawReader`], commands are resolved by a
//! two-level dispatch tree, and the business actions they trigger run on a
//! [`queue::SerialExecutor`] so that results are reported in the order
//! commands arrived, no matter how long each takes to complete.
//!
//! ## Framing
//!
//! A data unit is either one line (terminated by `\n`, `\r`, or `\r\n`) or,
//! when a line contains the literal marker `RAW`, the concatenation of
//! counted byte chunks sent before a closing `ENDRAW`. Each chunk is a
//! decimal byte count line followed immediately by that many payload bytes,
//! with no delimiter after the payload, so the stream
//!
//! ```text
//! RAW\n4\nabcd2\nefENDRAW\n
//! ```
//!
//! yields the single unit `abcdef`. Counted chunks are binary safe: payload
//! bytes that look like line terminators are not interpreted as such.
//!
//! ## Dispatch
//!
//! Root-mode commands are one line, `<token> <args>`. The `COMMAND <id>`
//! root command opens a second dispatch layer: the next unit names a
//! subcommand whose handler consumes the command body synchronously on the
//! parsing thread, then enqueues its business action and result emission on
//! the serial queue and returns, letting parsing continue while the action
//! runs. Each command produces exactly one result block:
//!
//! ```text
//! RESULTS 7
//! DONE
//! ENDRESULTS
//! ```
//!
//! or, when the handler rejected its input or the action failed:
//!
//! ```text
//! RESULTS 7
//! FAILED
//! <diagnostic>
//! ENDFAILED
//! ENDRESULTS
//! ```

pub mod dispatch;
pub mod errors;
pub mod queue;
pub mod reader;
pub mod tokens;
pub mod writer;

pub use dispatch::{
    HandlerFactory, NumberedCommandHandler, RootCommandHandler, RootDispatchTable,
    RootModeHandler, SharedHandler, SubcommandDispatchTable, SubcommandHandler, local_failure,
    shared,
};
pub use errors::{LineRawError, ProtocolError};
pub use queue::SerialExecutor;
pub use reader::{LineRawRead, LineRawReader};
pub use tokens::{expect_unit, read_tokens, split_tokens};
pub use writer::ResultWriter;

#[cfg(test)]
mod tests;
