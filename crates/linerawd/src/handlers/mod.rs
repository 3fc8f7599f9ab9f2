//! Command handlers wiring the wire protocol to the broker actor.
//!
//! Each numbered-command handler parses its whole body on the session
//! thread, converts local violations into a failure outcome, and enqueues
//! one task that performs the broker call and writes the result block.

mod publish;
mod root;
mod subscribe;
mod unsubscribe;

pub use publish::PublishHandler;
pub use root::{ClearCacheHandler, ShutdownHandler};
pub use subscribe::SubscribeHandler;
pub use unsubscribe::UnsubscribeHandler;

use lineraw_protocol::ProtocolError;

/// Rejects argument text after a command that takes none.
///
/// A trailing space on the command line produces an empty argument string;
/// that is tolerated the same as no argument at all.
fn ensure_no_arguments(command: &str, args: Option<&str>) -> Result<(), ProtocolError> {
    match args {
        None => Ok(()),
        Some(text) if text.is_empty() => Ok(()),
        Some(text) => Err(ProtocolError::unexpected_arguments(command, text)),
    }
}

/// Parses a command's single signed-integer argument.
fn parse_single_int_arg(command: &str, args: Option<&str>) -> Result<i64, ProtocolError> {
    let args = args
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ProtocolError::missing_arguments(command, "<subscription_id>"))?;
    if args.contains(' ') {
        return Err(ProtocolError::invalid_arguments(
            command,
            format!("expected one argument, received '{args}'"),
        ));
    }
    args.parse::<i64>().map_err(|_| {
        ProtocolError::invalid_arguments(command, format!("'{args}' is not an integer"))
    })
}
