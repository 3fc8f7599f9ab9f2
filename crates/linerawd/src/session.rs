//! The command session loop.

use std::sync::Arc;

use lineraw_config::CommandIdPolicy;
use lineraw_protocol::{
    LineRawError, LineRawRead, NumberedCommandHandler, ProtocolError, ResultWriter,
    RootCommandHandler, RootDispatchTable, RootModeHandler, SubcommandDispatchTable,
    SubcommandHandler, shared,
};
use tracing::{debug, error, info, warn};

use crate::SESSION_TARGET;
use crate::actor::PubSubActor;
use crate::handlers::{
    ClearCacheHandler, PublishHandler, ShutdownHandler, SubscribeHandler, UnsubscribeHandler,
};

/// Root command that ends the session cleanly.
pub const SHUTDOWN_COMMAND: &str = "SHUTDOWN";

/// Errors that end a session abnormally.
///
/// A session that ends at end of stream, on a SHUTDOWN command, or because
/// the output stream went away is considered clean. A root-level protocol
/// violation is not: command framing has been lost and nothing after the
/// offending bytes can be trusted, so the violation is surfaced to the
/// caller rather than skipped.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Drives one command stream against the broker actor.
///
/// Announces readiness with a `READY` line before each root command, routes
/// commands through the dispatch tree, and drains the serial queue before
/// returning so every accepted command has written its result block.
pub struct Session {
    writer: Arc<ResultWriter>,
    root: RootModeHandler,
    numbered: Arc<NumberedCommandHandler>,
}

impl Session {
    /// Builds the broker dispatch tree around `actor`.
    pub fn new(
        actor: Arc<dyn PubSubActor>,
        writer: Arc<ResultWriter>,
        policy: CommandIdPolicy,
    ) -> Self {
        let mut subcommands = SubcommandDispatchTable::new();
        subcommands.insert(
            "PUBLISH".to_owned(),
            shared(Arc::new(PublishHandler::new(
                Arc::clone(&actor),
                Arc::clone(&writer),
            )) as Arc<dyn SubcommandHandler>),
        );
        subcommands.insert(
            "SUBSCRIBE".to_owned(),
            shared(Arc::new(SubscribeHandler::new(
                Arc::clone(&actor),
                Arc::clone(&writer),
            )) as Arc<dyn SubcommandHandler>),
        );
        subcommands.insert(
            "UNSUBSCRIBE".to_owned(),
            shared(Arc::new(UnsubscribeHandler::new(
                Arc::clone(&actor),
                Arc::clone(&writer),
            )) as Arc<dyn SubcommandHandler>),
        );
        let numbered = Arc::new(NumberedCommandHandler::new(subcommands, policy));

        let mut roots = RootDispatchTable::new();
        roots.insert(
            "COMMAND".to_owned(),
            shared(Arc::clone(&numbered) as Arc<dyn RootCommandHandler>),
        );
        roots.insert(
            "CLEARCACHE".to_owned(),
            shared(Arc::new(ClearCacheHandler::new(actor)) as Arc<dyn RootCommandHandler>),
        );
        roots.insert(
            SHUTDOWN_COMMAND.to_owned(),
            shared(Arc::new(ShutdownHandler) as Arc<dyn RootCommandHandler>),
        );

        Self {
            writer,
            root: RootModeHandler::new(roots),
            numbered,
        }
    }

    /// Processes commands from `input` until the stream ends or SHUTDOWN
    /// arrives, then drains queued command execution.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Protocol`] when root-level framing is
    /// violated. Queued commands accepted before the violation still run
    /// and report their results before this returns.
    pub fn run(&self, input: &mut dyn LineRawRead) -> Result<(), SessionError> {
        let outcome = self.read_commands(input);
        self.numbered.shutdown();
        outcome
    }

    fn read_commands(&self, input: &mut dyn LineRawRead) -> Result<(), SessionError> {
        loop {
            if let Err(signal_error) = self.writer.write_line("READY") {
                warn!(target: SESSION_TARGET, %signal_error, "output stream closed");
                return Ok(());
            }
            match self.root.parse_and_execute(input) {
                Ok(command) if command == SHUTDOWN_COMMAND => {
                    info!(target: SESSION_TARGET, "session shut down by command");
                    return Ok(());
                }
                Ok(_) => {}
                Err(LineRawError::EndOfStream) => {
                    debug!(target: SESSION_TARGET, "command stream ended");
                    return Ok(());
                }
                Err(LineRawError::Io(read_error)) => {
                    warn!(target: SESSION_TARGET, %read_error, "input stream failed");
                    return Ok(());
                }
                Err(LineRawError::Protocol(violation)) => {
                    error!(target: SESSION_TARGET, %violation, "session lost command framing");
                    return Err(violation.into());
                }
            }
        }
    }
}
