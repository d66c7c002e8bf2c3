//! Exit code logic for the relay process.
//!
//! Single responsibility: map a run's outcome to the process exit status.

use std::process::ExitCode;

use relay_core::FailureKind;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    Failure,
    ConfigError,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::ConfigError => 2,
        }
    }
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        ExitCode::from(exit.code())
    }
}

/// Determines the exit outcome for a failed run.
pub(crate) fn determine_exit_outcome(kind: FailureKind) -> ProcessExit {
    match kind {
        FailureKind::MissingCredential | FailureKind::Config => ProcessExit::ConfigError,
        FailureKind::Download
        | FailureKind::Upload
        | FailureKind::ShareLink
        | FailureKind::Internal => ProcessExit::Failure,
    }
}
