/// Main entry point for the nodelingo CLI.
///
/// Dispatches to the appropriate command handler based on the parsed arguments.
///
/// # Returns
/// - `Ok(CommandResult)` with error/warning counts and exit behavior
/// - `Err` if the command fails (e.g., unreadable artifact, invalid config)
use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::CommandResult,
    commands::{
        diff::diff, extract::extract, init::init, reconcile::reconcile, translate::translate,
    },
};

pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Extract(cmd)) => extract(cmd),
        Some(Command::Translate(cmd)) => translate(cmd),
        Some(Command::Reconcile(cmd)) => reconcile(cmd),
        Some(Command::Diff(cmd)) => diff(cmd),
        Some(Command::Init) => init(),
        Some(Command::Serve) => {
            // Serve command is handled in main.rs before calling run()
            anyhow::bail!("Serve command should be handled before run()")
        }
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}
