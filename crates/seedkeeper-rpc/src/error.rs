//! Error taxonomy surfaced to RPC clients.

use seedkeeper_session::SessionError;
use thiserror::Error;

/// Errors returned by the dispatcher, each mapped to a JSON-RPC error code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// The request body was not valid JSON.
    #[error("parse error: {message}")]
    ParseError {
        /// Decoder message.
        message: String,
    },
    /// The body was JSON but not a request object.
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// Structural problem with the request.
        reason: &'static str,
    },
    /// No method is registered under the requested name.
    #[error("method '{method}' not found")]
    MethodNotFound {
        /// Requested method name.
        method: String,
    },
    /// Parameters are missing or of the wrong type.
    #[error("invalid params for '{method}': {reason}")]
    InvalidParams {
        /// Method being invoked.
        method: &'static str,
        /// What was wrong with the parameters.
        reason: String,
    },
    /// The torrent session failed while handling the call.
    #[error("internal error in '{method}': {message}")]
    InternalError {
        /// Method being invoked.
        method: &'static str,
        /// Underlying session failure.
        message: String,
    },
}

impl RpcError {
    /// JSON-RPC 2.0 error code.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            Self::ParseError { .. } => -32_700,
            Self::InvalidRequest { .. } => -32_600,
            Self::MethodNotFound { .. } => -32_601,
            Self::InvalidParams { .. } => -32_602,
            Self::InternalError { .. } => -32_603,
        }
    }

    /// Stable machine-readable name, also used as the metrics outcome label.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ParseError { .. } => "parse_error",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::MethodNotFound { .. } => "method_not_found",
            Self::InvalidParams { .. } => "invalid_params",
            Self::InternalError { .. } => "internal_error",
        }
    }

    pub(crate) fn session(method: &'static str, source: &SessionError) -> Self {
        Self::InternalError {
            method,
            message: source.to_string(),
        }
    }
}

/// Convenience alias for dispatcher results.
pub type RpcResult<T> = Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_json_rpc() {
        let cases = [
            (
                RpcError::ParseError {
                    message: "eof".into(),
                },
                -32_700,
                "parse_error",
            ),
            (
                RpcError::InvalidRequest {
                    reason: "missing method",
                },
                -32_600,
                "invalid_request",
            ),
            (
                RpcError::MethodNotFound {
                    method: "nope".into(),
                },
                -32_601,
                "method_not_found",
            ),
            (
                RpcError::InvalidParams {
                    method: "pause_torrent",
                    reason: "expected at least 1 parameter, got 0".into(),
                },
                -32_602,
                "invalid_params",
            ),
            (
                RpcError::InternalError {
                    method: "pause_torrent",
                    message: "boom".into(),
                },
                -32_603,
                "internal_error",
            ),
        ];
        for (err, code, kind) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn session_failures_keep_the_underlying_message() {
        let err = RpcError::session(
            "get_torrent_info",
            &SessionError::NotFound {
                info_hash: "abc".into(),
            },
        );
        assert_eq!(
            err.to_string(),
            "internal error in 'get_torrent_info': torrent abc not found"
        );
    }
}
