//! The SUBSCRIBE subcommand.

use std::sync::Arc;

use lineraw_protocol::{
    LineRawError, LineRawRead, ResultWriter, SerialExecutor, SubcommandHandler, expect_unit,
    local_failure,
};
use tracing::warn;

use super::parse_single_int_arg;
use crate::SESSION_TARGET;
use crate::actor::PubSubActor;

/// Parses `SUBSCRIBE <id>`, the filter unit, and `ENDCOMMAND`, then
/// enqueues the subscription registration.
pub struct SubscribeHandler {
    actor: Arc<dyn PubSubActor>,
    writer: Arc<ResultWriter>,
}

impl SubscribeHandler {
    pub fn new(actor: Arc<dyn PubSubActor>, writer: Arc<ResultWriter>) -> Self {
        Self { actor, writer }
    }

    fn parse_body(
        args: Option<&str>,
        input: &mut dyn LineRawRead,
    ) -> Result<(i64, String), LineRawError> {
        let subscription_id = parse_single_int_arg("SUBSCRIBE", args)?;
        let filter = input.read_unit()?;
        expect_unit(input, "ENDCOMMAND")?;
        Ok((subscription_id, filter))
    }
}

impl SubcommandHandler for SubscribeHandler {
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
                Ok((subscription_id, filter)) => actor.subscribe(*subscription_id, filter),
                Err(message) => Some(message.clone()),
            };
            if let Err(error) = writer.write_results(command_id, failure.as_deref()) {
                warn!(target: SESSION_TARGET, command_id, %error, "failed to write results");
            }
        });
        Ok(())
    }
}
