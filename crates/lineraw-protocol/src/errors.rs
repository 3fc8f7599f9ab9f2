//! Error types for framing and command dispatch.
//!
//! Two failure kinds are kept apart, because they have different blast radii:
//! a transport failure (`EndOfStream`, `Io`) is fatal to the whole session,
//! while a [`ProtocolError`] is local to the command being parsed or executed
//! and is usually reported as a `FAILED` result for that command.

use std::io;

use thiserror::Error;

/// Violations of the line/raw wire protocol.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Raw-mode byte count line was not a decimal integer.
    #[error("raw mode requires an integer byte count; received [{received}]")]
    RawCountNotInteger { received: String },

    /// Raw-mode byte count was zero or negative.
    #[error("raw mode requires a positive byte count; received {count}")]
    RawCountNotPositive { count: i64 },

    /// `ENDRAW` arrived before any counted chunk.
    #[error("ENDRAW received directly after RAW")]
    EmptyRawBlock,

    /// A data unit could not be decoded with the reader's fixed encoding.
    #[error("data unit is not valid UTF-8: {message}")]
    InvalidEncoding { message: String },

    /// A data unit contained no non-empty tokens where at least one was
    /// required.
    #[error("expected at least one non-empty input token")]
    EmptyTokenLine,

    /// The next data unit did not match the token the handler expected.
    #[error("expected token '{expected}'; received '{received}'")]
    UnexpectedToken { expected: String, received: String },

    /// Root-mode token is not present in the dispatch table.
    #[error("unrecognized root mode command [{token}]")]
    UnknownRootCommand { token: String },

    /// Subcommand token is not present in the dispatch table.
    #[error("unrecognized subcommand [{token}]")]
    UnknownSubcommand { token: String },

    /// `COMMAND` arrived without a command identifier argument.
    #[error("COMMAND token requires a command ID argument")]
    MissingCommandId,

    /// Command identifier was not a single non-negative decimal integer.
    #[error("COMMAND token requires a single non-negative integer command ID; received [{received}]")]
    InvalidCommandId { received: String },

    /// Command identifier violated the strict ordering policy.
    #[error("command ID {received} is not greater than previously accepted ID {last}")]
    CommandIdNotIncreasing { last: u64, received: u64 },

    /// A command that takes no parameters received some.
    #[error("{command} command does not take any parameters; received [{received}]")]
    UnexpectedArguments { command: String, received: String },

    /// A command is missing a required argument.
    #[error("{command} command requires {expected}; received nothing")]
    MissingArguments { command: String, expected: String },

    /// A command argument failed validation.
    #[error("{command} command arguments are invalid: {message}")]
    InvalidArguments { command: String, message: String },
}

impl ProtocolError {
    /// Creates a non-integer raw count error.
    pub fn raw_count_not_integer(received: impl Into<String>) -> Self {
        Self::RawCountNotInteger {
            received: received.into(),
        }
    }

    /// Creates a non-positive raw count error.
    pub fn raw_count_not_positive(count: i64) -> Self {
        Self::RawCountNotPositive { count }
    }

    /// Creates an encoding error from a UTF-8 decode failure.
    pub fn invalid_encoding(source: &std::str::Utf8Error) -> Self {
        Self::InvalidEncoding {
            message: source.to_string(),
        }
    }

    /// Creates an unexpected token error.
    pub fn unexpected_token(expected: impl Into<String>, received: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            expected: expected.into(),
            received: received.into(),
        }
    }

    /// Creates an unknown root command error.
    pub fn unknown_root_command(token: impl Into<String>) -> Self {
        Self::UnknownRootCommand {
            token: token.into(),
        }
    }

    /// Creates an unknown subcommand error.
    pub fn unknown_subcommand(token: impl Into<String>) -> Self {
        Self::UnknownSubcommand {
            token: token.into(),
        }
    }

    /// Creates an invalid command identifier error.
    pub fn invalid_command_id(received: impl Into<String>) -> Self {
        Self::InvalidCommandId {
            received: received.into(),
        }
    }

    /// Creates a non-increasing command identifier error.
    pub fn command_id_not_increasing(last: u64, received: u64) -> Self {
        Self::CommandIdNotIncreasing { last, received }
    }

    /// Creates an unexpected arguments error.
    pub fn unexpected_arguments(command: impl Into<String>, received: impl Into<String>) -> Self {
        Self::UnexpectedArguments {
            command: command.into(),
            received: received.into(),
        }
    }

    /// Creates a missing arguments error.
    pub fn missing_arguments(command: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::MissingArguments {
            command: command.into(),
            expected: expected.into(),
        }
    }

    /// Creates an invalid arguments error.
    pub fn invalid_arguments(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            command: command.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced while reading or dispatching line/raw data.
#[derive(Debug, Error)]
pub enum LineRawError {
    /// The underlying source was exhausted before a data unit completed.
    #[error("input stream reached end of file")]
    EndOfStream,

    /// The underlying source failed.
    #[error("I/O failure on input stream: {0}")]
    Io(#[from] io::Error),

    /// The incoming bytes violated the wire protocol.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl LineRawError {
    /// Whether this error ends the session.
    ///
    /// Transport failures are fatal; protocol violations are local to the
    /// command being parsed and the session may continue.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Protocol(_))
    }
}
