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

//! Environment-driven configuration for the Seedkeeper daemon.
//!
//! Layout: `model.rs` (typed settings), `validate.rs` (value parsing),
//! `loader.rs` (environment lookup), `defaults.rs`, `error.rs`.

mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ENV_DELETE_EXPIRED, ENV_DIAGNOSTICS_INTERVAL_SECS, ENV_DOWNLOAD_DIR, ENV_EXPIRED_ACTION,
    ENV_LIMITS_INTERVAL_SECS, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_MAX_RATIO, ENV_MAX_TIME_HOURS,
    ENV_RESUME_INTERVAL_SECS,
};
pub use model::{
    ExpiredAction, LoggingSettings, MaintenanceSchedule, SeedingLimits, ServiceConfig,
    SessionDefaults,
};
