//! Default values applied when a setting is absent from the environment.

use std::time::Duration;

/// Seeding-limit evaluation period.
pub(super) const LIMITS_INTERVAL: Duration = Duration::from_secs(10);
/// Resume-data persistence period.
pub(super) const RESUME_INTERVAL: Duration = Duration::from_secs(20);
/// Download directory handed to the session when a request names none.
pub(super) const DOWNLOAD_DIR: &str = "downloads";
