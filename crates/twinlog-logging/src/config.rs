//! Configuration types for the tracing bridge

use serde::{Deserialize, Serialize};

/// Main logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default log level
    pub default_level: String,

    /// Let `RUST_LOG` override `default_level`
    pub env_override: bool,

    /// Console echo configuration
    pub console: ConsoleConfig,

    /// Write JSON lines into the log slots instead of plain text
    pub json: bool,

    /// Include file/line of the call site
    pub include_location: bool,

    /// Include the event target
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            env_override: true,
            console: ConsoleConfig::default(),
            json: false,
            include_location: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Verbose config with a human-readable console echo
    pub fn development() -> Self {
        Self {
            default_level: "debug".to_string(),
            console: ConsoleConfig {
                enabled: true,
                pretty: true,
                ansi: true,
            },
            include_location: true,
            ..Default::default()
        }
    }

    /// JSON lines into the slots, no console
    pub fn production() -> Self {
        Self {
            default_level: "info".to_string(),
            json: true,
            ..Default::default()
        }
    }

    /// Deterministic config for tests: ignores `RUST_LOG`, no console
    pub fn testing() -> Self {
        Self {
            default_level: "trace".to_string(),
            env_override: false,
            console: ConsoleConfig {
                enabled: false,
                ..Default::default()
            },
            include_target: false,
            ..Default::default()
        }
    }
}

/// Console echo configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Echo events to stderr
    pub enabled: bool,
    /// Use the multi-line pretty format
    pub pretty: bool,
    /// Include ANSI colors
    pub ansi: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            // Echo only in debug builds, like the file:line convenience logger
            enabled: cfg!(debug_assertions),
            pretty: false,
            ansi: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.default_level, "info");
        assert!(config.env_override);
        assert!(!config.json);
        assert_eq!(config.console.enabled, cfg!(debug_assertions));
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert_eq!(config.default_level, "debug");
        assert!(config.console.enabled);
        assert!(config.console.pretty);
    }

    #[test]
    fn test_production_config() {
        let config = LogConfig::production();
        assert!(config.json);
        assert_eq!(config.default_level, "info");
    }

    #[test]
    fn test_testing_config() {
        let config = LogConfig::testing();
        assert!(!config.env_override);
        assert!(!config.console.enabled);
    }
}
