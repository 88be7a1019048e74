//! Environment variable parsing utilities.
//!
//! Every helper reads through an [`Env`] lookup instead of the process
//! environment directly, so configuration can be loaded from a map in tests.

use std::str::FromStr;
use std::time::Duration;

use super::ConfigError;

/// Variable lookup: `Some(value)` if set.
pub type Env<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Lookup backed by the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get environment variable with default value.
pub fn env_or(env: Env<'_>, key: &str, default: &str) -> String {
    env(key).unwrap_or_else(|| default.to_string())
}

/// Get optional environment variable (None if empty or missing).
pub fn env_opt(env: Env<'_>, key: &str) -> Option<String> {
    env(key).filter(|s| !s.is_empty())
}

/// Get a value that must not be empty when set.
pub fn env_non_empty(env: Env<'_>, key: &str, default: &str) -> Result<String, ConfigError> {
    match env(key) {
        Some(v) if v.trim().is_empty() => Err(ConfigError::Missing { key: key.into() }),
        Some(v) => Ok(v),
        None => Ok(default.to_string()),
    }
}

/// Parse environment variable with type conversion.
pub fn env_parse<T: FromStr>(env: Env<'_>, key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env(key) {
        Some(v) if !v.is_empty() => v.trim().parse().map_err(|e: T::Err| ConfigError::Parse {
            key: key.into(),
            value: v,
            error: e.to_string(),
        }),
        _ => Ok(default),
    }
}

/// Parse duration string (e.g., "500ms", "30s", "2m", "1h").
/// Returns None for "off" or "0".
pub fn parse_duration(s: &str) -> Result<Option<Duration>, String> {
    let s = s.trim().to_lowercase();

    if s == "off" || s == "0" || s.is_empty() {
        return Ok(None);
    }

    if let Some(num_str) = s.strip_suffix("ms") {
        let num: u64 = num_str
            .parse()
            .map_err(|_| format!("invalid number: {}", num_str))?;
        return Ok(Some(Duration::from_millis(num)).filter(|d| !d.is_zero()));
    }

    // Try to split into number and unit
    let (num_str, unit) = if let Some(n) = s.strip_suffix('s') {
        (n, "s")
    } else if let Some(n) = s.strip_suffix('m') {
        (n, "m")
    } else if let Some(n) = s.strip_suffix('h') {
        (n, "h")
    } else {
        // Try parsing as seconds
        return s
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| format!("invalid duration: {}", s));
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    let secs = match unit {
        "s" => num,
        "m" => num * 60,
        "h" => num * 3600,
        _ => return Err(format!("invalid unit: {}", unit)),
    };

    Ok(Some(Duration::from_secs(secs)).filter(|d| !d.is_zero()))
}

/// Parse a mandatory deadline. "off" and zero are rejected.
pub fn env_timeout(env: Env<'_>, key: &str, default: &str) -> Result<Duration, ConfigError> {
    let value = env_opt(env, key).unwrap_or_else(|| default.to_string());
    match parse_duration(&value) {
        Ok(Some(duration)) => Ok(duration),
        Ok(None) => Err(ConfigError::Invalid {
            key: key.into(),
            message: format!("'{}' disables the timeout; a deadline is required", value),
        }),
        Err(error) => Err(ConfigError::Parse {
            key: key.into(),
            value,
            error,
        }),
    }
}
