use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use lineraw_protocol::{LineRawReader, ResultWriter};
use linerawd::cli::Options;
use linerawd::{InMemoryActor, Session, telemetry};

fn main() -> ExitCode {
    let config = Options::parse().into_config();
    if let Err(error) = telemetry::initialise(&config) {
        eprintln!("linerawd: {error}");
        return ExitCode::FAILURE;
    }

    let actor = Arc::new(InMemoryActor::new());
    let writer = Arc::new(ResultWriter::new(io::stdout()));
    let session = Session::new(actor, writer, config.command_id_policy());

    let mut input = LineRawReader::new(io::stdin().lock(), config.read_buffer_size());
    match session.run(&mut input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "session ended abnormally");
            ExitCode::FAILURE
        }
    }
}
