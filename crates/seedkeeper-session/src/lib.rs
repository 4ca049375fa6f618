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

//! Torrent session capability consumed by the Seedkeeper control plane.
//!
//! Layout: `model/` (torrent snapshots and command payloads), `service/` (the
//! `TorrentSession` trait), `stub.rs` (in-memory session), `error.rs`.

pub mod error;
pub mod model;
pub mod service;
pub mod stub;

pub use error::{SessionError, SessionResult};
pub use model::{
    AddTorrent, BufferTorrent, COMPLETED_TIME_FORMAT, TorrentInfo, TorrentState, upload_ratio,
};
pub use service::TorrentSession;
pub use stub::StubSession;
