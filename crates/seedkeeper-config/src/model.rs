//! Typed configuration models.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use seedkeeper_telemetry::{DEFAULT_LOG_LEVEL, LogFormat};
use serde::{Deserialize, Serialize};

use crate::defaults;

/// Fully validated daemon configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServiceConfig {
    /// Seeding policy enforced by the maintenance engine.
    pub seeding: SeedingLimits,
    /// Timer periods for the maintenance tasks.
    pub schedule: MaintenanceSchedule,
    /// Logger settings.
    pub logging: LoggingSettings,
    /// Defaults applied to session commands.
    pub session: SessionDefaults,
}

/// What to do with a torrent that has seeded longer than the configured time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiredAction {
    /// Pause the torrent and keep it in the session.
    #[default]
    Pause,
    /// Remove the torrent from the session.
    Delete,
}

impl ExpiredAction {
    /// Configuration name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Delete => "delete",
        }
    }
}

impl Display for ExpiredAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Seeding-limit policy. A limit of zero disables the corresponding check.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeedingLimits {
    /// Upload ratio at which a seeding torrent is paused.
    pub max_ratio: f64,
    /// Hours after completion at which the expired action applies.
    pub max_time_hours: f64,
    /// Action applied once `max_time_hours` elapses.
    pub expired_action: ExpiredAction,
    /// Whether `delete` also removes downloaded files.
    pub delete_expired: bool,
}

impl SeedingLimits {
    /// Ratio limit, or `None` when the check is disabled.
    #[must_use]
    pub fn max_ratio(&self) -> Option<f64> {
        (self.max_ratio > 0.0).then_some(self.max_ratio)
    }

    /// Seeding time limit, or `None` when the check is disabled or unrepresentable.
    #[must_use]
    pub fn max_time(&self) -> Option<Duration> {
        if self.max_time_hours > 0.0 {
            Duration::try_from_secs_f64(self.max_time_hours * 3600.0).ok()
        } else {
            None
        }
    }

    /// Whether either limit is active.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.max_ratio().is_some() || self.max_time().is_some()
    }
}

/// Periods of the maintenance timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceSchedule {
    /// Seeding-limit evaluation period.
    pub limits_interval: Duration,
    /// Resume-data persistence period.
    pub resume_interval: Duration,
    /// Torrent diagnostics logging period; `None` disables the tick.
    pub diagnostics_interval: Option<Duration>,
}

impl Default for MaintenanceSchedule {
    fn default() -> Self {
        Self {
            limits_interval: defaults::LIMITS_INTERVAL,
            resume_interval: defaults::RESUME_INTERVAL,
            diagnostics_interval: None,
        }
    }
}

/// Logger settings handed to the telemetry crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::infer(),
        }
    }
}

/// Defaults applied to session commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDefaults {
    /// Directory used when `add_torrent` names no save path.
    pub download_dir: String,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            download_dir: defaults::DOWNLOAD_DIR.to_string(),
        }
    }
}
