//! The UNSUBSCRIBE subcommand.

use std::sync::Arc;

use lineraw_protocol::{
    LineRawError, LineRawRead, ResultWriter, SerialExecutor, SubcommandHandler, expect_unit,
    local_failure,
};
use tracing::warn;

use super::parse_single_int_arg;
use crate::SESSION_TARGET;
use crate::actor::PubSubActor;

/// Parses `UNSUBSCRIBE <id>` and `ENDCOMMAND`, then enqueues the removal.
pub struct UnsubscribeHandler {
    actor: Arc<dyn PubSubActor>,
    writer: Arc<ResultWriter>,
}

impl UnsubscribeHandler {
    pub fn new(actor: Arc<dyn PubSubActor>, writer: Arc<ResultWriter>) -> Self {
        Self { actor, writer }
    }

    fn parse_body(args: Option<&str>, input: &mut dyn LineRawRead) -> Result<i64, LineRawError> {
        let subscription_id = parse_single_int_arg("UNSUBSCRIBE", args)?;
        expect_unit(input, "ENDCOMMAND")?;
        Ok(subscription_id)
    }
}

impl SubcommandHandler for UnsubscribeHandler {
    fn parse_and_execute(
        &self,
        command_id: u64,
        args: Option<&str>,
        input: &mut dyn LineRawRead,
        tasks: &SerialExecutor,
    ) -> Result<(), LineRawError> {
        let outcome = local_failure(Self::parse_body(args, input))?;
        let actor = Arc::clone(&self.actor);
        let writer = Arc::clone(&self.writer);
        tasks.submit(move || {
            let failure = match &outcome {
                Ok(subscription_id) => actor.unsubscribe(*subscription_id),
                Err(message) => Some(message.clone()),
            };
            if let Err(error) = writer.write_results(command_id, failure.as_deref()) {
                warn!(target: SESSION_TARGET, command_id, %error, "failed to write results");
            }
        });
        Ok(())
    }
}
