//! Error taxonomy shared by the Anchor layer and the window manager
//!
//! Fallible operations return [`AnchorResult`]. The narrow public surface
//! collapses these to a [`Status`] and pushes the detail to the report list.

use thiserror::Error;

/// Errors raised by windows, the system, drawing contexts and drags
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnchorError {
    /// An argument was out of range or malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not valid in the current state (e.g. swap without a context)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The platform backend refused the request
    #[error("Backend failure: {0}")]
    BackendFailure(String),

    /// The backend ran out of windows, contexts or similar resources
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A window, drag or icon could not be found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The source window already owns a running drag
    #[error("A drag is already in progress for this window")]
    DragInProgress,

    /// The operation was cancelled
    #[error("Cancelled")]
    Cancelled,
}

/// Result alias used across the crate
pub type AnchorResult<T> = Result<T, AnchorError>;

/// Two-valued status for callers that do not need the error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// The operation succeeded
    Success,
    /// The operation failed; details went to the report list
    Failure,
}

impl Status {
    /// Whether this is [`Status::Success`]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl<T> From<&AnchorResult<T>> for Status {
    fn from(result: &AnchorResult<T>) -> Self {
        if result.is_ok() {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

impl<T> From<AnchorResult<T>> for Status {
    fn from(result: AnchorResult<T>) -> Self {
        Self::from(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_collapses_results() {
        let ok: AnchorResult<u32> = Ok(3);
        let err: AnchorResult<u32> = Err(AnchorError::InvalidState("no context".into()));

        assert_eq!(Status::from(&ok), Status::Success);
        assert_eq!(Status::from(err), Status::Failure);
        assert!(Status::Success.is_success());
    }

    #[test]
    fn test_error_messages() {
        let err = AnchorError::NotFound("window".into());
        assert_eq!(err.to_string(), "Not found: window");
        assert_eq!(AnchorError::DragInProgress.to_string(), "A drag is already in progress for this window");
    }
}
