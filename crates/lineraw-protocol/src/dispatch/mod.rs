//! Two-level command dispatch over line/raw data units.
//!
//! Three structurally identical roles are built from one mechanism: a
//! dispatch table maps a leading token to a [`HandlerFactory`], and the
//! factory yields the handler to invoke. The factory indirection lets a
//! table mint a fresh handler per command or hand back a persistent
//! singleton; callers must not assume either, so handlers keep per-call
//! state in locals and task closures, never in instance fields.
//!
//! - [`RootModeHandler`] resolves the top-level command token and returns it
//!   to the host loop, which watches for its shutdown command.
//! - [`NumberedCommandHandler`] (itself a [`RootCommandHandler`]) parses the
//!   command identifier, resolves the subcommand, and owns the
//!   [`SerialExecutor`] that subcommand tasks are queued on.
//! - [`SubcommandHandler`] implementations consume their whole command body
//!   synchronously on the parsing thread, then enqueue exactly one task
//!   that performs the business action and writes the result block.

mod factory;
mod numbered;
mod root;

use std::collections::HashMap;
use std::sync::Arc;

pub use factory::{HandlerFactory, SharedHandler, shared};
pub use numbered::NumberedCommandHandler;
pub use root::RootModeHandler;

use crate::errors::LineRawError;
use crate::queue::SerialExecutor;
use crate::reader::LineRawRead;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Handler invoked for a root-mode command token.
pub trait RootCommandHandler: Send + Sync {
    /// Consumes whatever input belongs to this command and acts on it.
    ///
    /// `args` is the remainder of the root command line after the command
    /// token, or `None` when the line held only the token.
    ///
    /// # Errors
    ///
    /// Returns a protocol violation when the command cannot be parsed, or a
    /// transport failure when the stream fails mid-command.
    fn parse_and_execute(
        &self,
        input: &mut dyn LineRawRead,
        args: Option<&str>,
    ) -> Result<(), LineRawError>;
}

/// Terminal handler for a subcommand nested inside a numbered command.
///
/// Implementations must consume every remaining protocol token belonging to
/// the command - reading further data units as needed, up through their own
/// terminating marker - before returning, so the stream position is exactly
/// at the start of the next command. Validation failures local to the
/// command are converted into a `FAILED` result (see [`local_failure`]);
/// only transport failures propagate. The business action and the result
/// write happen inside the single task submitted to `tasks`, never on the
/// parsing thread.
pub trait SubcommandHandler: Send + Sync {
    /// Parses the command body and enqueues its execution.
    ///
    /// # Errors
    ///
    /// Returns transport failures; local protocol violations are reported
    /// through the command's result block instead.
    fn parse_and_execute(
        &self,
        command_id: u64,
        args: Option<&str>,
        input: &mut dyn LineRawRead,
        tasks: &SerialExecutor,
    ) -> Result<(), LineRawError>;
}

/// Dispatch table for root-mode commands.
pub type RootDispatchTable = HashMap<String, Arc<dyn HandlerFactory<dyn RootCommandHandler>>>;

/// Dispatch table for subcommands of a numbered command.
pub type SubcommandDispatchTable = HashMap<String, Arc<dyn HandlerFactory<dyn SubcommandHandler>>>;

/// Converts a command-local protocol violation into a failure message.
///
/// Subcommand handlers wrap their body parsing with this so that "the
/// handler rejected its input" becomes a `FAILED` result for that command
/// rather than an error escaping into the session. Transport failures pass
/// through untouched - losing the stream is never a per-command condition.
///
/// # Errors
///
/// Returns the original error when it is fatal to the session.
pub fn local_failure<T>(
    result: Result<T, LineRawError>,
) -> Result<Result<T, String>, LineRawError> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(LineRawError::Protocol(violation)) => Ok(Err(violation.to_string())),
        Err(fatal) => Err(fatal),
    }
}
