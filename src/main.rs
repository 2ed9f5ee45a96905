use std::process::ExitCode;

use clap::Parser;
use nodelingo::cli::{Arguments, Command, ExitStatus};
use tracing_subscriber::EnvFilter;

/// Log filter environment variable, e.g. `NODELINGO_LOG=nodelingo=trace`.
const LOG_ENV: &str = "NODELINGO_LOG";

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "nodelingo=debug"
        } else {
            "nodelingo=warn"
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let args = Arguments::parse();
    init_logging(args.verbose());

    if matches!(args.command, Some(Command::Serve)) {
        if let Err(err) = nodelingo::mcp::run_server() {
            eprintln!("Error: {}", err);
            return ExitStatus::Error.into();
        }
        return ExitStatus::Success.into();
    }

    match nodelingo::cli::run_cli(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitStatus::Error.into()
        }
    }
}
