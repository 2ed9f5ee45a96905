use std::process::ExitCode;

use super::commands::CommandResult;

/// Process exit status.
///
/// - `Success` (0): every plugin was processed, nothing left to act on
/// - `Failure` (1): the command ran but something needs attention (a file that
///   did not parse, a failed or cancelled translation, newly added nodes)
/// - `Error` (2): the command could not run (bad config, unreadable artifact)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl ExitStatus {
    pub fn from_result(result: &CommandResult) -> Self {
        if result.exit_on_errors && result.error_count > 0 {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
