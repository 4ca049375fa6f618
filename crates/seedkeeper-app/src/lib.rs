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

//! Seedkeeper daemon wiring.
//!
//! Layout: `bootstrap.rs` (dependency loading, control plane, run loop), `error.rs`.

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Application-level errors.
pub mod error;

pub use bootstrap::{BootstrapDependencies, ControlPlane, run_app, run_app_with};
pub use error::{AppError, AppResult};
