use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomationError {
    /// A required control never appeared within its wait budget.
    #[error("control not found: {descriptor} (waited {timeout:?})")]
    ControlNotFound {
        descriptor: String,
        timeout: Duration,
    },

    /// A control that was expected to go away was still present at the deadline.
    #[error("control still present: {descriptor} (waited {timeout:?})")]
    ControlStillPresent {
        descriptor: String,
        timeout: Duration,
    },

    #[error("platform error: {0}")]
    PlatformError(String),

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The UI sequence completed but the document archive holds no matching
    /// finalized record.
    #[error("journal document '{filename}' was not stored for patient {cpr}")]
    DocumentNotStored { filename: String, cpr: String },
}

impl AutomationError {
    /// True for the two wait-budget failures, regardless of direction.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            AutomationError::ControlNotFound { .. } | AutomationError::ControlStillPresent { .. }
        )
    }
}
