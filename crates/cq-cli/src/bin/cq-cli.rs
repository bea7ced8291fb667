#![forbid(unsafe_code)]

use std::process::ExitCode;

use cq_cli::{Command, parse_args, run, usage};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();

    let outcome = parse_args(std::env::args().skip(1)).and_then(|command| match command {
        Command::Help => Ok(usage().to_owned()),
        Command::Run(args) => run(&args),
    });

    match outcome {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("cq-cli error: {error}");
            ExitCode::from(1)
        }
    }
}

/// Diagnostics go to stderr so stdout stays machine-readable. `RUST_LOG`
/// selects the level; the default only shows warnings.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
