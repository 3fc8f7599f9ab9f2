//! Shared configuration for the line/raw protocol harness.
//!
//! Configuration is an explicit, constructed value passed to the components
//! that need it; nothing in the workspace reads process-wide mutable state.
//! The harness binary builds a [`Config`] from its command-line options and
//! hands it to the telemetry layer and the protocol session.

mod defaults;
mod logging;
mod policy;

pub use defaults::{DEFAULT_LOG_FILTER, DEFAULT_READ_BUFFER_SIZE};
pub use logging::{LogFormat, LogFormatParseError};
pub use policy::{CommandIdPolicy, CommandIdPolicyParseError};

/// Runtime configuration shared by the harness binary and protocol session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    log_format: LogFormat,
    log_filter: String,
    read_buffer_size: usize,
    command_id_policy: CommandIdPolicy,
}

impl Config {
    /// Logging output format for telemetry.
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Tracing filter expression (an `EnvFilter` directive string).
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Size of the framing reader's refill buffer, in bytes.
    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    /// Policy applied to numbered-command identifiers.
    pub fn command_id_policy(&self) -> CommandIdPolicy {
        self.command_id_policy
    }

    /// Replaces the logging format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Replaces the tracing filter expression.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Replaces the framing reader buffer size.
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Replaces the numbered-command identifier policy.
    pub fn with_command_id_policy(mut self, policy: CommandIdPolicy) -> Self {
        self.command_id_policy = policy;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            command_id_policy: CommandIdPolicy::default(),
        }
    }
}
