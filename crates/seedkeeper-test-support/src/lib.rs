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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (torrent snapshots), recording.rs (command-capturing
//! session), failing.rs (session that fails selected operations).

pub mod failing;
pub mod fixtures;
pub mod recording;

pub use failing::FailingSession;
pub use fixtures::{completed_hours_ago, info_hash, torrent_info};
pub use recording::{RecordingSession, SessionCommand};
