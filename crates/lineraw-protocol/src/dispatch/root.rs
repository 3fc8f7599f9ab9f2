//! Root-mode command resolution.

use tracing::debug;

use super::{DISPATCH_TARGET, RootDispatchTable};
use crate::errors::{LineRawError, ProtocolError};
use crate::reader::LineRawRead;
use crate::tokens::read_tokens;

/// Resolves the top-level command token of each incoming command.
///
/// Reads one data unit, splits it into the command token and an optional
/// argument remainder, looks the token up in its table, and delegates the
/// rest of the command to the matched handler. The token is returned to the
/// caller so the host loop can recognise its shutdown command without the
/// handler needing to signal upward.
pub struct RootModeHandler {
    table: RootDispatchTable,
}

impl RootModeHandler {
    /// Creates a handler dispatching over `table`.
    pub fn new(table: RootDispatchTable) -> Self {
        Self { table }
    }

    /// Reads and executes one root-mode command.
    ///
    /// # Errors
    ///
    /// Returns [`LineRawError::EndOfStream`] when the stream ends before a
    /// command line arrives, a protocol violation for an empty or unknown
    /// command token, and whatever the matched handler returns.
    pub fn parse_and_execute(
        &self,
        input: &mut dyn LineRawRead,
    ) -> Result<String, LineRawError> {
        let mut tokens = read_tokens(input, 2)?;
        let args = tokens.pop().flatten();
        let command = tokens.pop().flatten().ok_or(ProtocolError::EmptyTokenLine)?;
        debug!(target: DISPATCH_TARGET, %command, "dispatching root command");
        let factory = self
            .table
            .get(&command)
            .ok_or_else(|| ProtocolError::unknown_root_command(&command))?;
        factory
            .handler()
            .parse_and_execute(input, args.as_deref())?;
        Ok(command)
    }
}
