//! Store error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Access denied: {path} resolves outside the store root")]
    AccessDenied { path: PathBuf },

    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to serialize store contents: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_message() {
        let err = StoreError::AccessDenied {
            path: PathBuf::from("../../etc/passwd"),
        };

        let msg = err.to_string();
        assert!(msg.contains("Access denied"));
        assert!(msg.contains("etc/passwd"));
    }

    #[test]
    fn test_not_found_message() {
        let err = StoreError::NotFound {
            path: PathBuf::from("missing.txt"),
        };

        assert!(err.to_string().contains("missing.txt"));
    }
}
