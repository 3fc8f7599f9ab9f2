//! Default values shared by the harness binary and the protocol crates.

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default size of the framing reader's refill buffer, in bytes.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;
