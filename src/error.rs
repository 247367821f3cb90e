use thiserror::Error;

/// Motion cue client error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    #[error("RPC transport failed: {0}")]
    Rpc(String),

    #[error("Backend rejected {method}: {message}")]
    Rejected { method: String, message: String },

    #[error("Unexpected response shape: {0}")]
    Decode(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OverlayError {
    /// True for failures that should be retried on the next tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, OverlayError::Rpc(_) | OverlayError::Decode(_))
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(e: serde_json::Error) -> Self {
        OverlayError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OverlayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            OverlayError::Rpc("connection refused".to_string()),
            OverlayError::Rejected {
                method: "update_settings".to_string(),
                message: "disk full".to_string(),
            },
            OverlayError::Decode("missing field".to_string()),
            OverlayError::InvalidState("wizard closed".to_string()),
            OverlayError::InvalidParameters("blank name".to_string()),
            OverlayError::Internal("lock poisoned".to_string()),
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(OverlayError::Rpc("timeout".into()).is_transient());
        assert!(OverlayError::Decode("bad".into()).is_transient());
        assert!(!OverlayError::InvalidState("x".into()).is_transient());
    }
}
