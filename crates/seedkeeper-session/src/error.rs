//! Error types for torrent session operations.

use std::error::Error;

use thiserror::Error;

/// Primary error type raised by session implementations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Operation is not supported by the underlying session.
    #[error("session operation '{operation}' not supported")]
    Unsupported {
        /// Operation identifier.
        operation: &'static str,
    },
    /// The referenced torrent is not part of the session.
    #[error("torrent {info_hash} not found")]
    NotFound {
        /// Missing torrent info-hash.
        info_hash: String,
    },
    /// A command payload was rejected before reaching the engine.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the rejection.
        reason: &'static str,
    },
    /// Operation failed in the underlying engine.
    #[error("session operation '{operation}' failed: {source}")]
    OperationFailed {
        /// Operation identifier.
        operation: &'static str,
        /// Torrent info-hash when available.
        info_hash: Option<String>,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl SessionError {
    /// Wrap an engine failure with the operation that produced it.
    pub fn operation_failed(
        operation: &'static str,
        info_hash: Option<&str>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self::OperationFailed {
            operation,
            info_hash: info_hash.map(str::to_owned),
            source: source.into(),
        }
    }
}

/// Convenience alias for session results.
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let missing = SessionError::NotFound {
            info_hash: "abc".into(),
        };
        assert_eq!(missing.to_string(), "torrent abc not found");

        let failed = SessionError::operation_failed("pause_torrent", Some("abc"), "engine stalled");
        assert_eq!(
            failed.to_string(),
            "session operation 'pause_torrent' failed: engine stalled"
        );
        assert!(failed.source().is_some());
        assert!(matches!(
            failed,
            SessionError::OperationFailed {
                info_hash: Some(ref hash),
                ..
            } if hash == "abc"
        ));
    }
}
