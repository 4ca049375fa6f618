//! # Design
//!
//! - Centralize application-level errors for bootstrap and shutdown.
//! - Keep error messages constant while carrying the failing operation.
//! - Preserve source errors without re-logging at call sites.

use std::io;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: seedkeeper_config::ConfigError,
    },
    /// Logging or metrics setup failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: seedkeeper_telemetry::TelemetryError,
    },
    /// A maintenance timer could not be started.
    #[error("maintenance operation failed")]
    Maintenance {
        /// Operation identifier.
        operation: &'static str,
        /// Source timer error.
        source: seedkeeper_maintenance::TimerError,
    },
    /// Waiting for the shutdown signal failed.
    #[error("shutdown signal failed")]
    Signal {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: seedkeeper_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: seedkeeper_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn maintenance(
        operation: &'static str,
        source: seedkeeper_maintenance::TimerError,
    ) -> Self {
        Self::Maintenance { operation, source }
    }

    pub(crate) const fn signal(operation: &'static str, source: io::Error) -> Self {
        Self::Signal { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn helpers_build_variants_with_sources() {
        let config = AppError::config(
            "config.load",
            seedkeeper_config::ConfigError::InvalidField {
                field: "SEEDKEEPER_MAX_RATIO",
                value: "lots".into(),
                reason: "not a number",
            },
        );
        assert!(matches!(
            config,
            AppError::Config {
                operation: "config.load",
                ..
            }
        ));
        assert!(config.source().is_some());

        let timer = AppError::maintenance(
            "maintenance.start",
            seedkeeper_maintenance::TimerError::Stopped { name: "resume_data" },
        );
        assert_eq!(timer.to_string(), "maintenance operation failed");

        let signal = AppError::signal("signal.ctrl_c", io::Error::other("closed"));
        assert!(matches!(signal, AppError::Signal { .. }));
    }
}
