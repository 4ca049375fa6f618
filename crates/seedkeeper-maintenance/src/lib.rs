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

//! Background maintenance for a torrent session.
//!
//! Layout: `timer.rs` (repeating timer), `seeding.rs` (seeding-limit monitor),
//! `resume.rs` (resume-data persistence), `diagnostics.rs` (torrent log tick),
//! `service.rs` (owns the timers).

pub mod diagnostics;
pub mod resume;
pub mod seeding;
pub mod service;
pub mod timer;

pub use diagnostics::TorrentDiagnostics;
pub use resume::ResumePersistence;
pub use seeding::{LimitAction, MonitorReport, SeedingLimitMonitor};
pub use service::MaintenanceService;
pub use timer::{POLL_QUANTUM, RepeatingTimer, TimerError, TimerStatus, TimerTask};
