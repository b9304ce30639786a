use core::result::Result as CoreResult;

use quill_core::{Error, Operation};
use thiserror::Error;

/// Result type for synchronizer operations.
pub type SyncResult<T> = CoreResult<T, SyncError>;

/// Why a synchronizer operation did not change local state.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The call against the collection resource failed.
    #[error("Error during {operation}: {source}")]
    Remote {
        /// Operation that failed.
        operation: Operation,
        /// Underlying transport, status or decoding error.
        #[source]
        source: Error,
    },

    /// Submission was attempted with an empty title or content.
    #[error("A post needs both a title and content")]
    IncompleteDraft,

    /// The same call is still outstanding.
    #[error("A {0} call is already in flight")]
    InFlight(Operation),

    /// A draft field name other than `title` or `content`.
    #[error("Unknown draft field: {0}")]
    UnknownField(String),
}

impl SyncError {
    /// Whether the failure came from the collection resource.
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_display() {
        let remote = SyncError::Remote {
            operation: Operation::Create,
            source: Error::Status {
                operation: Operation::Create,
                status: 502,
                body: String::new(),
            },
        };
        assert_eq!(
            remote.to_string(),
            "Error during create: create failed with HTTP 502: "
        );
        assert!(remote.is_remote());

        assert_eq!(
            SyncError::InFlight(Operation::Delete).to_string(),
            "A delete call is already in flight"
        );
        assert!(!SyncError::IncompleteDraft.is_remote());
    }
}
