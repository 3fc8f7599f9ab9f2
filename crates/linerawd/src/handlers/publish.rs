//! The PUBLISH subcommand.

use std::sync::Arc;

use lineraw_protocol::{
    LineRawError, LineRawRead, ResultWriter, SerialExecutor, SubcommandHandler, expect_unit,
    local_failure,
};
use tracing::warn;

use super::ensure_no_arguments;
use crate::SESSION_TARGET;
use crate::actor::PubSubActor;

/// Parses a publication body and enqueues the broker publish.
///
/// The body is framed as:
///
/// ```text
/// PUBLISH
/// METADATA
/// <metadata unit>
/// PAYLOAD
/// <payload units, concatenated>
/// ENDPAYLOAD
/// ENDPUBLISH
/// ENDCOMMAND
/// ```
///
/// Payload units are frequently raw-mode blocks; splitting a large payload
/// across several units lets the sender stream it without sizing the whole
/// thing up front.
pub struct PublishHandler {
    actor: Arc<dyn PubSubActor>,
    writer: Arc<ResultWriter>,
}

impl PublishHandler {
    pub fn new(actor: Arc<dyn PubSubActor>, writer: Arc<ResultWriter>) -> Self {
        Self { actor, writer }
    }

    fn parse_body(
        args: Option<&str>,
        input: &mut dyn LineRawRead,
    ) -> Result<(String, String), LineRawError> {
        ensure_no_arguments("PUBLISH", args)?;
        expect_unit(input, "METADATA")?;
        let metadata = input.read_unit()?;
        expect_unit(input, "PAYLOAD")?;
        let mut payload = String::new();
        loop {
            let unit = input.read_unit()?;
            if unit == "ENDPAYLOAD" {
                break;
            }
            payload.push_str(&unit);
        }
        expect_unit(input, "ENDPUBLISH")?;
        expect_unit(input, "ENDCOMMAND")?;
        Ok((metadata, payload))
    }
}

impl SubcommandHandler for PublishHandler {
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
                Ok((metadata, payload)) => actor.publish(metadata, payload),
                Err(message) => Some(message.clone()),
            };
            if let Err(error) = writer.write_results(command_id, failure.as_deref()) {
                warn!(target: SESSION_TARGET, command_id, %error, "failed to write results");
            }
        });
        Ok(())
    }
}
