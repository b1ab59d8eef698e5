use std::{fmt::Display, str::FromStr};

use crate::error::config::ConfigError;

/// Parses a configuration value into any `FromStr` type
///
/// # Arguments
/// - `name` - Name of the environment variable, used in the error
/// - `value` - The raw string value
///
/// # Returns
/// - `Ok(T)` - Successfully parsed value
/// - `Err(ConfigError::InvalidEnvVar)` - The value could not be parsed
pub fn parse_env_value<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Parses a Discord snowflake ID (channel, guild or role)
///
/// Discord IDs are non-zero `u64` values.
///
/// # Returns
/// - `Ok(u64)` - Successfully parsed ID
/// - `Err(ConfigError::InvalidEnvVar)` - Not a number, or zero
pub fn parse_snowflake(name: &str, value: &str) -> Result<u64, ConfigError> {
    let id: u64 = parse_env_value(name, value)?;

    if id == 0 {
        return Err(ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value: value.to_string(),
            reason: "Discord IDs must be non-zero".to_string(),
        });
    }

    Ok(id)
}
