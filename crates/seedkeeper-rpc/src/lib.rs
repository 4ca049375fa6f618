#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! JSON-RPC method dispatcher exposing torrent session operations.
//!
//! Layout: `envelope.rs` (request/response wire shapes), `registry.rs` (static
//! method table), `methods.rs` (handlers), `params.rs` (positional parameter
//! access), `dispatcher.rs`, `error.rs`.

pub mod dispatcher;
pub mod envelope;
pub mod error;
mod methods;
pub mod params;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use envelope::{ErrorBody, JSONRPC_VERSION, RpcRequest, RpcResponse, decode_request};
pub use error::{RpcError, RpcResult};
pub use params::Params;
pub use registry::{METHODS, Method, MethodSpec, lookup};
