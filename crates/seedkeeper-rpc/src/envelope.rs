//! Request and response envelopes.
//!
//! Requests follow JSON-RPC 2.0 with relaxed rules: `jsonrpc` and `id` are
//! optional, `params` is a positional array that may be absent or `null`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RpcError, RpcResult};

/// Protocol version string echoed when the client sends one.
pub const JSONRPC_VERSION: &str = "2.0";

/// Incoming method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Protocol marker, echoed back verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    /// Case-sensitive method name.
    pub method: String,
    /// Positional parameters; `None` means no parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Opaque correlation token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl RpcRequest {
    /// Build a request with positional parameters and no id.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: Some(JSONRPC_VERSION.to_string()),
            method: method.into(),
            params: Some(Value::Array(params)),
            id: None,
        }
    }

    /// Attach a correlation id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Validate the structure of an already-decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidRequest`] when the value is not an object, the
    /// method is missing or not a string, or `params` is neither an array nor `null`.
    pub fn from_value(value: Value) -> RpcResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(invalid("request must be a JSON object"));
        };
        let method = match map.remove("method") {
            Some(Value::String(method)) => method,
            Some(_) => return Err(invalid("method must be a string")),
            None => return Err(invalid("method is missing")),
        };
        let params = match map.remove("params") {
            None | Some(Value::Null) => None,
            Some(params @ Value::Array(_)) => Some(params),
            Some(_) => return Err(invalid("params must be an array")),
        };
        let jsonrpc = match map.remove("jsonrpc") {
            None | Some(Value::Null) => None,
            Some(Value::String(version)) => Some(version),
            Some(_) => return Err(invalid("jsonrpc must be a string")),
        };
        Ok(Self {
            jsonrpc,
            method,
            params,
            id: take_id(&mut map),
        })
    }

    /// Positional parameters as a slice.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidRequest`] when `params` holds something other
    /// than an array.
    pub fn params(&self) -> RpcResult<&[Value]> {
        match &self.params {
            None | Some(Value::Null) => Ok(&[]),
            Some(Value::Array(values)) => Ok(values),
            Some(_) => Err(invalid("params must be an array")),
        }
    }
}

fn invalid(reason: &'static str) -> RpcError {
    RpcError::InvalidRequest { reason }
}

fn take_id(map: &mut Map<String, Value>) -> Option<Value> {
    map.remove("id").filter(|id| !id.is_null())
}

/// Decode a raw request body.
///
/// # Errors
///
/// Returns [`RpcError::ParseError`] for malformed JSON and
/// [`RpcError::InvalidRequest`] for JSON that is not a request object.
pub fn decode_request(body: &[u8]) -> RpcResult<RpcRequest> {
    let value: Value = serde_json::from_slice(body).map_err(|err| RpcError::ParseError {
        message: err.to_string(),
    })?;
    RpcRequest::from_value(value)
}

/// Error object carried by a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// JSON-RPC error code.
    pub code: i64,
    /// Stable error kind name.
    pub kind: String,
    /// Human-readable description.
    pub message: String,
}

impl From<&RpcError> for ErrorBody {
    fn from(err: &RpcError) -> Self {
        Self {
            code: err.code(),
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

/// Outgoing response; exactly one of `result` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Protocol marker copied from the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    /// Method result on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error description on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    /// Correlation id copied from the request (`null` when absent).
    #[serde(default)]
    pub id: Option<Value>,
}

impl RpcResponse {
    /// Successful response.
    #[must_use]
    pub const fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: None,
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Failed response.
    #[must_use]
    pub fn failure(id: Option<Value>, err: &RpcError) -> Self {
        Self {
            jsonrpc: None,
            result: None,
            error: Some(ErrorBody::from(err)),
            id,
        }
    }

    /// Echo the protocol marker of the originating request.
    #[must_use]
    pub fn with_jsonrpc(mut self, jsonrpc: Option<String>) -> Self {
        self.jsonrpc = jsonrpc;
        self
    }

    /// Whether the call succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_and_id_are_optional() -> anyhow::Result<()> {
        let request = decode_request(br#"{"method": "ping"}"#)?;
        assert_eq!(request.method, "ping");
        assert!(request.params()?.is_empty());
        assert!(request.id.is_none());
        assert!(request.jsonrpc.is_none());

        let request = decode_request(br#"{"method": "ping", "params": null, "id": 7}"#)?;
        assert!(request.params()?.is_empty());
        assert_eq!(request.id, Some(json!(7)));
        Ok(())
    }

    #[test]
    fn structural_problems_are_invalid_requests() {
        for body in [
            &br#"[1, 2]"#[..],
            br#"{"params": []}"#,
            br#"{"method": 5}"#,
            br#"{"method": "ping", "params": {"a": 1}}"#,
        ] {
            let err = decode_request(body).expect_err("structurally invalid");
            assert_eq!(err.code(), -32_600, "{}", String::from_utf8_lossy(body));
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = decode_request(b"{\"method\": ").expect_err("truncated body");
        assert_eq!(err.kind(), "parse_error");
    }

    #[test]
    fn responses_serialise_one_of_result_or_error() -> anyhow::Result<()> {
        let ok = RpcResponse::success(Some(json!(1)), json!("pong"))
            .with_jsonrpc(Some(JSONRPC_VERSION.into()));
        assert_eq!(
            serde_json::to_value(&ok)?,
            json!({"jsonrpc": "2.0", "result": "pong", "id": 1})
        );

        let failed = RpcResponse::failure(
            None,
            &RpcError::MethodNotFound {
                method: "nope".into(),
            },
        );
        assert!(!failed.is_success());
        assert_eq!(
            serde_json::to_value(&failed)?,
            json!({
                "error": {
                    "code": -32_601,
                    "kind": "method_not_found",
                    "message": "method 'nope' not found"
                },
                "id": null
            })
        );
        Ok(())
    }
}
