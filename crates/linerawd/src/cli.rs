//! Command-line argument definitions for the broker daemon.

use clap::Parser;

use lineraw_config::{CommandIdPolicy, Config, LogFormat};

/// Command-line interface for the line/raw publish-subscribe broker.
#[derive(Parser, Debug)]
#[command(name = "linerawd", about = "Publish-subscribe broker speaking the line/raw protocol")]
pub struct Options {
    /// Log output format (`json` or `compact`).
    #[arg(long, value_parser = parse_log_format, default_value = "json")]
    log_format: LogFormat,
    /// Log filter expression (e.g. `info` or `linerawd::session=debug`).
    #[arg(long, default_value = lineraw_config::DEFAULT_LOG_FILTER)]
    log_filter: String,
    /// Refill buffer size for the protocol reader, in bytes.
    #[arg(long, value_name = "BYTES")]
    buffer_size: Option<usize>,
    /// Accept command identifiers in any order instead of requiring them to
    /// increase.
    #[arg(long)]
    lenient_command_ids: bool,
}

fn parse_log_format(text: &str) -> Result<LogFormat, String> {
    text.parse()
        .map_err(|_| format!("unknown log format '{text}'; expected 'json' or 'compact'"))
}

impl Options {
    /// Folds parsed arguments into the runtime configuration.
    pub fn into_config(self) -> Config {
        let policy = if self.lenient_command_ids {
            CommandIdPolicy::Lenient
        } else {
            CommandIdPolicy::Strict
        };
        let mut config = Config::default()
            .with_log_format(self.log_format)
            .with_log_filter(self.log_filter)
            .with_command_id_policy(policy);
        if let Some(size) = self.buffer_size {
            config = config.with_read_buffer_size(size);
        }
        config
    }
}
