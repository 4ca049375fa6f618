//! Environment-backed configuration loading.
//!
//! Unset or blank variables fall back to defaults; anything present must parse.

use crate::error::ConfigResult;
use crate::model::{
    LoggingSettings, MaintenanceSchedule, SeedingLimits, ServiceConfig, SessionDefaults,
};
use crate::validate::{
    parse_bool, parse_expired_action, parse_hours, parse_interval, parse_limit, parse_log_format,
    parse_optional_interval,
};

/// Upload ratio limit (`0` disables).
pub const ENV_MAX_RATIO: &str = "SEEDKEEPER_MAX_RATIO";
/// Seeding time limit in hours (`0` disables).
pub const ENV_MAX_TIME_HOURS: &str = "SEEDKEEPER_MAX_TIME_HOURS";
/// `pause` or `delete`.
pub const ENV_EXPIRED_ACTION: &str = "SEEDKEEPER_EXPIRED_ACTION";
/// Whether deleting an expired torrent also deletes its files.
pub const ENV_DELETE_EXPIRED: &str = "SEEDKEEPER_DELETE_EXPIRED";
/// Seeding-limit evaluation period in seconds.
pub const ENV_LIMITS_INTERVAL_SECS: &str = "SEEDKEEPER_LIMITS_INTERVAL_SECS";
/// Resume-data persistence period in seconds.
pub const ENV_RESUME_INTERVAL_SECS: &str = "SEEDKEEPER_RESUME_INTERVAL_SECS";
/// Diagnostics logging period in seconds (`0` disables).
pub const ENV_DIAGNOSTICS_INTERVAL_SECS: &str = "SEEDKEEPER_DIAGNOSTICS_INTERVAL_SECS";
/// Log filter directive.
pub const ENV_LOG_LEVEL: &str = "SEEDKEEPER_LOG_LEVEL";
/// `json` or `pretty`.
pub const ENV_LOG_FORMAT: &str = "SEEDKEEPER_LOG_FORMAT";
/// Default download directory for new torrents.
pub const ENV_DOWNLOAD_DIR: &str = "SEEDKEEPER_DOWNLOAD_DIR";

impl ServiceConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting encountered.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting encountered.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);
        let defaults = Self::default();

        let seeding = SeedingLimits {
            max_ratio: env
                .parse(ENV_MAX_RATIO, parse_limit)?
                .unwrap_or(defaults.seeding.max_ratio),
            max_time_hours: env
                .parse(ENV_MAX_TIME_HOURS, parse_hours)?
                .unwrap_or(defaults.seeding.max_time_hours),
            expired_action: env
                .parse(ENV_EXPIRED_ACTION, parse_expired_action)?
                .unwrap_or(defaults.seeding.expired_action),
            delete_expired: env
                .parse(ENV_DELETE_EXPIRED, parse_bool)?
                .unwrap_or(defaults.seeding.delete_expired),
        };

        let schedule = MaintenanceSchedule {
            limits_interval: env
                .parse(ENV_LIMITS_INTERVAL_SECS, parse_interval)?
                .unwrap_or(defaults.schedule.limits_interval),
            resume_interval: env
                .parse(ENV_RESUME_INTERVAL_SECS, parse_interval)?
                .unwrap_or(defaults.schedule.resume_interval),
            diagnostics_interval: env
                .parse(ENV_DIAGNOSTICS_INTERVAL_SECS, parse_optional_interval)?
                .unwrap_or(defaults.schedule.diagnostics_interval),
        };

        let logging = LoggingSettings {
            level: env.raw(ENV_LOG_LEVEL).unwrap_or(defaults.logging.level),
            format: env
                .parse(ENV_LOG_FORMAT, parse_log_format)?
                .unwrap_or(defaults.logging.format),
        };

        let session = SessionDefaults {
            download_dir: env
                .raw(ENV_DOWNLOAD_DIR)
                .unwrap_or(defaults.session.download_dir),
        };

        Ok(Self {
            seeding,
            schedule,
            logging,
            session,
        })
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn raw(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn parse<T>(
        &self,
        key: &'static str,
        parser: fn(&'static str, &str) -> ConfigResult<T>,
    ) -> ConfigResult<Option<T>> {
        self.raw(key).map(|value| parser(key, &value)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::model::ExpiredAction;
    use seedkeeper_telemetry::LogFormat;
    use std::collections::HashMap;
    use std::time::Duration;

    fn load(pairs: &[(&str, &str)]) -> ConfigResult<ServiceConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() -> anyhow::Result<()> {
        let config = load(&[])?;
        assert_eq!(config, ServiceConfig::default());
        assert!(!config.seeding.is_enabled());
        assert_eq!(config.session.download_dir, "downloads");
        Ok(())
    }

    #[test]
    fn every_variable_is_applied() -> anyhow::Result<()> {
        let config = load(&[
            (ENV_MAX_RATIO, "1.5"),
            (ENV_MAX_TIME_HOURS, "24"),
            (ENV_EXPIRED_ACTION, "delete"),
            (ENV_DELETE_EXPIRED, "yes"),
            (ENV_LIMITS_INTERVAL_SECS, "30"),
            (ENV_RESUME_INTERVAL_SECS, "60"),
            (ENV_DIAGNOSTICS_INTERVAL_SECS, "120"),
            (ENV_LOG_LEVEL, "debug"),
            (ENV_LOG_FORMAT, "json"),
            (ENV_DOWNLOAD_DIR, "/srv/torrents"),
        ])?;

        assert_eq!(config.seeding.max_ratio(), Some(1.5));
        assert_eq!(
            config.seeding.max_time(),
            Some(Duration::from_secs(24 * 3600))
        );
        assert_eq!(config.seeding.expired_action, ExpiredAction::Delete);
        assert!(config.seeding.delete_expired);
        assert_eq!(config.schedule.limits_interval, Duration::from_secs(30));
        assert_eq!(config.schedule.resume_interval, Duration::from_secs(60));
        assert_eq!(
            config.schedule.diagnostics_interval,
            Some(Duration::from_secs(120))
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.session.download_dir, "/srv/torrents");
        Ok(())
    }

    #[test]
    fn blank_values_fall_back_to_defaults() -> anyhow::Result<()> {
        let config = load(&[(ENV_MAX_RATIO, "  "), (ENV_LOG_LEVEL, "")])?;
        assert!(config.seeding.max_ratio().is_none());
        assert_eq!(config.logging.level, "info");
        Ok(())
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = load(&[(ENV_RESUME_INTERVAL_SECS, "0")]).expect_err("zero interval");
        assert_eq!(
            err,
            ConfigError::InvalidField {
                field: ENV_RESUME_INTERVAL_SECS,
                value: "0".into(),
                reason: "must be greater than zero",
            }
        );

        let err = load(&[(ENV_EXPIRED_ACTION, "archive")]).expect_err("unknown action");
        assert!(err.to_string().contains(ENV_EXPIRED_ACTION));
    }

    #[test]
    fn unrepresentable_seeding_time_is_rejected() {
        let err = load(&[(ENV_MAX_TIME_HOURS, "1e20")]).expect_err("overflowing hours");
        assert_eq!(
            err,
            ConfigError::InvalidField {
                field: ENV_MAX_TIME_HOURS,
                value: "1e20".into(),
                reason: "is too large",
            }
        );
    }
}
