use thiserror::Error;

use crate::RefreshRate;

/// Error type for querying and changing the refresh rate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("Failed to get the current display settings")]
    QueryFailure,
    #[error("{0} is not available at the current resolution and color depth")]
    NotAvailable(RefreshRate),
    #[error("Invalid selection: {0:?}")]
    InvalidSelection(String),
    #[error("Driver rejected the mode (BADMODE)")]
    TestRejectedBadMode,
    #[error("Test of mode failed, returned code: {0}")]
    TestFailed(i32),
    #[error("Could not apply mode, returned code: {0}")]
    CommitFailed(i32),
}

impl RefreshError {
    /// The raw status code returned by the OS, if this failure carries one
    pub fn raw_code(&self) -> Option<i32> {
        match self {
            RefreshError::TestFailed(code) | RefreshError::CommitFailed(code) => Some(*code),
            _ => None,
        }
    }
}

pub type RefreshResult<T = ()> = std::result::Result<T, RefreshError>;
