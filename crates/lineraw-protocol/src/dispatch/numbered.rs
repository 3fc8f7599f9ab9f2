//! Numbered command parsing and subcommand dispatch.

use std::sync::Mutex;

use lineraw_config::CommandIdPolicy;
use tracing::debug;

use super::{DISPATCH_TARGET, RootCommandHandler, SubcommandDispatchTable};
use crate::errors::{LineRawError, ProtocolError};
use crate::queue::SerialExecutor;
use crate::reader::LineRawRead;
use crate::tokens::read_tokens;

/// Root-level handler for numbered commands.
///
/// Parses the command identifier from the root command's arguments, reads
/// the subcommand line, and hands the body to the matched
/// [`SubcommandHandler`](super::SubcommandHandler) together with the serial
/// executor that orders command execution. Owning the executor here keeps
/// the ordering guarantee in one place: every subcommand of every numbered
/// command runs on the same queue, in submission order.
pub struct NumberedCommandHandler {
    table: SubcommandDispatchTable,
    executor: SerialExecutor,
    policy: CommandIdPolicy,
    last_id: Mutex<Option<u64>>,
}

impl NumberedCommandHandler {
    /// Creates a handler dispatching over `table` with its own task queue.
    pub fn new(table: SubcommandDispatchTable, policy: CommandIdPolicy) -> Self {
        Self {
            table,
            executor: SerialExecutor::new(),
            policy,
            last_id: Mutex::new(None),
        }
    }

    /// Blocks until every queued command has finished executing.
    ///
    /// Call this after the command stream ends so that results for commands
    /// still in the queue are written before the session closes.
    pub fn shutdown(&self) {
        self.executor.drain();
    }

    fn parse_command_id(args: Option<&str>) -> Result<u64, ProtocolError> {
        let args = args.ok_or(ProtocolError::MissingCommandId)?;
        if args.contains(' ') {
            return Err(ProtocolError::invalid_command_id(args));
        }
        args.parse::<u64>()
            .map_err(|_| ProtocolError::invalid_command_id(args))
    }

    fn enforce_policy(&self, command_id: u64) -> Result<(), ProtocolError> {
        let mut last_id = self
            .last_id
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if self.policy == CommandIdPolicy::Strict {
            if let Some(last) = *last_id {
                if command_id <= last {
                    return Err(ProtocolError::command_id_not_increasing(last, command_id));
                }
            }
        }
        *last_id = Some(command_id);
        Ok(())
    }
}

impl RootCommandHandler for NumberedCommandHandler {
    fn parse_and_execute(
        &self,
        input: &mut dyn LineRawRead,
        args: Option<&str>,
    ) -> Result<(), LineRawError> {
        let command_id = Self::parse_command_id(args)?;
        self.enforce_policy(command_id)?;
        let mut tokens = read_tokens(input, 2)?;
        let subcommand_args = tokens.pop().flatten();
        let subcommand = tokens.pop().flatten().ok_or(ProtocolError::EmptyTokenLine)?;
        debug!(
            target: DISPATCH_TARGET,
            command_id, %subcommand, "dispatching subcommand"
        );
        let factory = self
            .table
            .get(&subcommand)
            .ok_or_else(|| ProtocolError::unknown_subcommand(&subcommand))?;
        factory.handler().parse_and_execute(
            command_id,
            subcommand_args.as_deref(),
            input,
            &self.executor,
        )
    }
}
