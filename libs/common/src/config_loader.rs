//! Configuration value helpers
//! Resolves single settings with fallback logic: explicit value > ENV > default

use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, warn};

/// Get configuration value with priority: explicit > ENV > Default
///
/// # Arguments
/// * `explicit` - Value given on the command line or by the caller
/// * `env_var` - Environment variable name to check
/// * `default` - Default value to use as fallback
pub fn get_config_value<T>(explicit: Option<T>, env_var: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    // Priority 1: explicit value
    if let Some(val) = explicit {
        debug!("Using explicit value for {}", env_var);
        return val;
    }

    // Priority 2: Environment variable
    if let Ok(env_str) = std::env::var(env_var) {
        match env_str.parse::<T>() {
            Ok(val) => {
                debug!("Using {} from environment: {}", env_var, env_str);
                return val;
            },
            Err(e) => {
                warn!("Failed to parse {} from environment: {}", env_var, e);
            },
        }
    }

    // Priority 3: Default value
    debug!("Using default value for {}", env_var);
    default
}

/// Get string configuration value with priority: explicit > ENV > Default
///
/// Empty strings are treated as unset at every level but the last.
pub fn get_string_config(explicit: Option<String>, env_var: &str, default: String) -> String {
    if let Some(val) = explicit {
        if !val.is_empty() {
            debug!("Using explicit value for {}", env_var);
            return val;
        }
    }

    if let Ok(env_val) = std::env::var(env_var) {
        if !env_val.is_empty() {
            debug!("Using {} from environment", env_var);
            return env_val;
        }
    }

    debug!("Using default value for {}", env_var);
    default
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_get_config_value_priority() {
        Jail::expect_with(|jail| {
            jail.set_env("EMBER_TEST_PORT", "4000");

            // Explicit value wins
            assert_eq!(get_config_value(Some(8080u16), "EMBER_TEST_PORT", 3000), 8080);
            // Environment beats default
            assert_eq!(get_config_value(None, "EMBER_TEST_PORT", 3000u16), 4000);
            // Unset falls through
            assert_eq!(get_config_value(None, "EMBER_TEST_UNSET", 3000u16), 3000);
            Ok(())
        });
    }

    #[test]
    fn test_unparseable_env_falls_back() {
        Jail::expect_with(|jail| {
            jail.set_env("EMBER_TEST_BAD_PORT", "not-a-port");
            assert_eq!(get_config_value(None, "EMBER_TEST_BAD_PORT", 3000u16), 3000);
            Ok(())
        });
    }

    #[test]
    fn test_get_string_config_skips_empty() {
        Jail::expect_with(|jail| {
            jail.set_env("EMBER_TEST_HOST", "builder.local");
            let host = get_string_config(Some(String::new()), "EMBER_TEST_HOST", "x".into());
            assert_eq!(host, "builder.local");
            Ok(())
        });
    }
}
