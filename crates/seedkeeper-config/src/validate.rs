//! Parsing helpers for raw configuration values.
//!
//! Each helper receives the environment variable name so failures can point at
//! the exact setting.

use std::time::Duration;

use seedkeeper_telemetry::LogFormat;

use crate::error::{ConfigError, ConfigResult};
use crate::model::ExpiredAction;

const SECS_PER_HOUR: f64 = 3600.0;

fn invalid(field: &'static str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidField {
        field,
        value: value.to_string(),
        reason,
    }
}

/// Parse a finite, non-negative number (`0` disables the related limit).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a number, is
/// negative, or is not finite.
pub fn parse_limit(field: &'static str, value: &str) -> ConfigResult<f64> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| invalid(field, value, "must be a number"))?;
    if !parsed.is_finite() {
        return Err(invalid(field, value, "must be finite"));
    }
    if parsed < 0.0 {
        return Err(invalid(field, value, "must not be negative"));
    }
    Ok(parsed)
}

/// Parse a seeding-time limit in hours that must convert to a [`Duration`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for anything [`parse_limit`] rejects
/// and for hour counts too large to represent.
pub fn parse_hours(field: &'static str, value: &str) -> ConfigResult<f64> {
    let hours = parse_limit(field, value)?;
    if Duration::try_from_secs_f64(hours * SECS_PER_HOUR).is_err() {
        return Err(invalid(field, value, "is too large"));
    }
    Ok(hours)
}

/// Parse a boolean flag accepting `true/false`, `1/0` and `yes/no`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for any other spelling.
pub fn parse_bool(field: &'static str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid(field, value, "must be true/false, 1/0 or yes/no")),
    }
}

/// Parse a timer period in whole seconds that must be positive.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an integer or is zero.
pub fn parse_interval(field: &'static str, value: &str) -> ConfigResult<Duration> {
    match parse_optional_interval(field, value)? {
        Some(interval) => Ok(interval),
        None => Err(invalid(field, value, "must be greater than zero")),
    }
}

/// Parse a timer period in whole seconds where `0` disables the timer.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not a non-negative integer.
pub fn parse_optional_interval(field: &'static str, value: &str) -> ConfigResult<Option<Duration>> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| invalid(field, value, "must be a whole number of seconds"))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

/// Parse the expired-torrent action.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] unless the value is `pause` or `delete`.
pub fn parse_expired_action(field: &'static str, value: &str) -> ConfigResult<ExpiredAction> {
    match value.trim().to_ascii_lowercase().as_str() {
        "pause" => Ok(ExpiredAction::Pause),
        "delete" => Ok(ExpiredAction::Delete),
        _ => Err(invalid(field, value, "must be 'pause' or 'delete'")),
    }
}

/// Parse the logger output format.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] unless the value is `json` or `pretty`.
pub fn parse_log_format(field: &'static str, value: &str) -> ConfigResult<LogFormat> {
    value
        .parse()
        .map_err(|_| invalid(field, value, "must be 'json' or 'pretty'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_reject_negative_and_non_finite_values() {
        assert_eq!(parse_limit("MAX_RATIO", " 1.5 "), Ok(1.5));
        assert_eq!(parse_limit("MAX_RATIO", "0"), Ok(0.0));
        assert!(matches!(
            parse_limit("MAX_RATIO", "-1"),
            Err(ConfigError::InvalidField {
                reason: "must not be negative",
                ..
            })
        ));
        assert!(matches!(
            parse_limit("MAX_RATIO", "inf"),
            Err(ConfigError::InvalidField {
                reason: "must be finite",
                ..
            })
        ));
        assert!(parse_limit("MAX_RATIO", "lots").is_err());
    }

    #[test]
    fn hours_must_fit_a_duration() {
        assert_eq!(parse_hours("MAX_TIME_HOURS", "24"), Ok(24.0));
        assert_eq!(parse_hours("MAX_TIME_HOURS", "0"), Ok(0.0));
        assert!(matches!(
            parse_hours("MAX_TIME_HOURS", "1e20"),
            Err(ConfigError::InvalidField {
                reason: "is too large",
                ..
            })
        ));
        assert!(parse_hours("MAX_TIME_HOURS", "-2").is_err());
    }

    #[test]
    fn booleans_accept_common_spellings() {
        for value in ["true", "1", "YES"] {
            assert_eq!(parse_bool("FLAG", value), Ok(true));
        }
        for value in ["false", "0", "no"] {
            assert_eq!(parse_bool("FLAG", value), Ok(false));
        }
        assert!(parse_bool("FLAG", "maybe").is_err());
    }

    #[test]
    fn intervals_distinguish_mandatory_and_optional_timers() {
        assert_eq!(parse_interval("T", "5"), Ok(Duration::from_secs(5)));
        assert!(parse_interval("T", "0").is_err());
        assert_eq!(parse_optional_interval("T", "0"), Ok(None));
        assert!(parse_optional_interval("T", "-3").is_err());
    }

    #[test]
    fn enum_values_are_case_insensitive() {
        assert_eq!(
            parse_expired_action("ACTION", "Delete"),
            Ok(ExpiredAction::Delete)
        );
        assert!(parse_expired_action("ACTION", "archive").is_err());
        assert_eq!(parse_log_format("FORMAT", "json"), Ok(LogFormat::Json));
        let err = parse_log_format("FORMAT", "xml").expect_err("unknown format");
        assert_eq!(
            err.to_string(),
            "invalid value 'xml' for FORMAT: must be 'json' or 'pretty'"
        );
    }
}
