//! Request dispatch: lookup, arity check, invocation and response shaping.

use std::sync::Arc;

use seedkeeper_session::TorrentSession;
use seedkeeper_telemetry::Metrics;
use serde_json::Value;
use tracing::{debug, warn};

use crate::envelope::{RpcRequest, RpcResponse};
use crate::error::{RpcError, RpcResult};
use crate::methods;
use crate::params::Params;
use crate::registry::lookup;

/// Metrics label used for calls to unregistered methods.
const UNKNOWN_METHOD_LABEL: &str = "unknown";
const OK_OUTCOME: &str = "ok";

/// Routes method calls to the torrent session.
///
/// The dispatcher holds no mutable state; clones share the same session and
/// metrics and may be used concurrently.
#[derive(Clone)]
pub struct Dispatcher {
    session: Arc<dyn TorrentSession>,
    metrics: Metrics,
}

impl Dispatcher {
    /// Build a dispatcher over a session.
    #[must_use]
    pub fn new(session: Arc<dyn TorrentSession>, metrics: Metrics) -> Self {
        Self { session, metrics }
    }

    /// Invoke `method` with positional parameters.
    ///
    /// # Errors
    ///
    /// - [`RpcError::MethodNotFound`] for unregistered names.
    /// - [`RpcError::InvalidParams`] for too few or mistyped parameters.
    /// - [`RpcError::InternalError`] when the session fails.
    pub async fn call(&self, method: &str, params: &[Value]) -> RpcResult<Value> {
        let Some(entry) = lookup(method) else {
            let err = RpcError::MethodNotFound {
                method: method.to_string(),
            };
            self.record(UNKNOWN_METHOD_LABEL, &Err(err.clone()));
            return Err(err);
        };

        let params = Params::new(entry.name, params);
        let result = match params.require(entry.min_params) {
            Ok(()) => methods::invoke(entry.method, self.session.as_ref(), params).await,
            Err(err) => Err(err),
        };
        self.record(entry.name, &result);
        result
    }

    /// Handle a decoded request, always producing a response.
    pub async fn handle(&self, request: RpcRequest) -> RpcResponse {
        let result = match request.params() {
            Ok(values) => self.call(&request.method, values).await,
            Err(err) => {
                self.record(UNKNOWN_METHOD_LABEL, &Err(err.clone()));
                Err(err)
            }
        };
        let RpcRequest { jsonrpc, id, .. } = request;
        match result {
            Ok(value) => RpcResponse::success(id, value),
            Err(err) => RpcResponse::failure(id, &err),
        }
        .with_jsonrpc(jsonrpc)
    }

    /// Handle a JSON value that has not yet been validated as a request.
    pub async fn handle_value(&self, value: Value) -> RpcResponse {
        let id = value.get("id").filter(|id| !id.is_null()).cloned();
        match RpcRequest::from_value(value) {
            Ok(request) => self.handle(request).await,
            Err(err) => {
                self.record(UNKNOWN_METHOD_LABEL, &Err(err.clone()));
                RpcResponse::failure(id, &err)
            }
        }
    }

    /// Handle a raw request body.
    pub async fn handle_slice(&self, body: &[u8]) -> RpcResponse {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => self.handle_value(value).await,
            Err(source) => {
                let err = RpcError::ParseError {
                    message: source.to_string(),
                };
                self.record(UNKNOWN_METHOD_LABEL, &Err(err.clone()));
                RpcResponse::failure(None, &err)
            }
        }
    }

    fn record(&self, method: &str, result: &RpcResult<Value>) {
        match result {
            Ok(_) => {
                self.metrics.inc_rpc_request(method, OK_OUTCOME);
                debug!(method, "rpc call succeeded");
            }
            Err(err @ RpcError::InternalError { .. }) => {
                self.metrics.inc_rpc_request(method, err.kind());
                warn!(method, error = %err, "rpc call failed");
            }
            Err(err) => {
                self.metrics.inc_rpc_request(method, err.kind());
                debug!(method, error = %err, "rpc call rejected");
            }
        }
    }
}
