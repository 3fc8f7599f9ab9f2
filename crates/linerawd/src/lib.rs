//! Publish-subscribe broker daemon speaking the line/raw protocol.
//!
//! The daemon reads commands from standard input, writes readiness signals
//! and result blocks to standard output, and emits structured telemetry on
//! standard error. Command bodies are parsed synchronously on the session
//! thread while the broker actions they trigger run on a serial queue, so
//! large publications can stream in while earlier commands are still
//! executing and results still come out in command order.
//!
//! The broker itself sits behind the [`PubSubActor`] seam;
//! [`InMemoryActor`] is the default wiring and real broker integrations
//! replace it without touching the protocol plumbing.

mod actor;
pub mod cli;
mod handlers;
mod session;
pub mod telemetry;

pub use actor::{InMemoryActor, PubSubActor};
pub use session::{SHUTDOWN_COMMAND, Session, SessionError};
pub use telemetry::{TelemetryError, TelemetryHandle};

pub(crate) const BROKER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::broker");
pub(crate) const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");

#[cfg(test)]
mod tests;
