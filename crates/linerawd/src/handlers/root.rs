//! Root-mode commands without a numbered body.

use std::sync::Arc;

use lineraw_protocol::{LineRawError, LineRawRead, RootCommandHandler};
use tracing::info;

use super::ensure_no_arguments;
use crate::SESSION_TARGET;
use crate::actor::PubSubActor;

/// Accepts the SHUTDOWN command.
///
/// Consumes nothing beyond the command line itself; the session loop
/// watches for the returned token and stops reading afterwards.
pub struct ShutdownHandler;

impl RootCommandHandler for ShutdownHandler {
    fn parse_and_execute(
        &self,
        _input: &mut dyn LineRawRead,
        args: Option<&str>,
    ) -> Result<(), LineRawError> {
        ensure_no_arguments("SHUTDOWN", args)?;
        info!(target: SESSION_TARGET, "shutdown requested");
        Ok(())
    }
}

/// Executes CLEARCACHE directly on the session thread.
///
/// Cache clearing is a root-mode command rather than a numbered one, so it
/// produces no result block and does not pass through the serial queue.
pub struct ClearCacheHandler {
    actor: Arc<dyn PubSubActor>,
}

impl ClearCacheHandler {
    pub fn new(actor: Arc<dyn PubSubActor>) -> Self {
        Self { actor }
    }
}

impl RootCommandHandler for ClearCacheHandler {
    fn parse_and_execute(
        &self,
        _input: &mut dyn LineRawRead,
        args: Option<&str>,
    ) -> Result<(), LineRawError> {
        ensure_no_arguments("CLEARCACHE", args)?;
        self.actor.clear_cache();
        Ok(())
    }
}
