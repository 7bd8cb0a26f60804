//! Layered configuration loading using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`TCALC_` prefix, e.g. `TCALC_LOG_PATH`)
//! 2. Project-level `./tcalc.toml`
//! 3. User-level `<config dir>/tcalc/config.toml`
//! 4. Built-in defaults
//!
//! Command-line flags are applied on top by the binary.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the project-level configuration.
pub const LOCAL_CONFIG_FILE: &str = "tcalc.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

fn default_log_path() -> PathBuf {
    PathBuf::from("calculator_log.csv")
}

const fn default_logging_enabled() -> bool {
    true
}

const fn default_history_size() -> usize {
    20
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CalcConfig {
    /// Where successful evaluations are appended.
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    /// Whether evaluations are logged at all.
    #[serde(default = "default_logging_enabled")]
    pub logging_enabled: bool,

    /// Entries kept in the keypad's history panel.
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            logging_enabled: default_logging_enabled(),
            history_size: default_history_size(),
        }
    }
}

impl CalcConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        if Path::new(LOCAL_CONFIG_FILE).exists() {
            figment = figment.merge(Toml::file(LOCAL_CONFIG_FILE));
        }

        figment.merge(Env::prefixed("TCALC_"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tcalc").join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.log_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    /// Points the user config directory into the jail.
    fn isolate_config_dir(jail: &mut Jail) {
        let home = jail.directory().to_path_buf();
        jail.set_env("HOME", home.display());
        jail.set_env("XDG_CONFIG_HOME", home.join(".config").display());
    }

    #[test]
    fn test_defaults_are_correct() {
        let config = CalcConfig::default();
        assert_eq!(config.log_path, PathBuf::from("calculator_log.csv"));
        assert!(config.logging_enabled);
        assert_eq!(config.history_size, 20);
    }

    #[test]
    fn test_figment_builds_without_files() {
        Jail::expect_with(|jail| {
            isolate_config_dir(jail);
            let config = CalcConfig::load().expect("should extract defaults");
            assert_eq!(config, CalcConfig::default());
            Ok(())
        });
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_user_config_file_is_read() {
        Jail::expect_with(|jail| {
            isolate_config_dir(jail);
            std::fs::create_dir_all(".config/tcalc").expect("create config dir");
            jail.create_file(".config/tcalc/config.toml", "history_size = 7")?;

            assert_eq!(
                CalcConfig::global_config_path(),
                Some(jail.directory().join(".config/tcalc/config.toml"))
            );
            let config = CalcConfig::load().expect("config loads");
            assert_eq!(config.history_size, 7);
            Ok(())
        });
    }

    #[test]
    fn test_local_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            isolate_config_dir(jail);
            jail.create_file(
                LOCAL_CONFIG_FILE,
                r#"
                    log_path = "history/calc.csv"
                    history_size = 5
                "#,
            )?;

            let config = CalcConfig::load().expect("config loads");
            assert_eq!(config.log_path, PathBuf::from("history/calc.csv"));
            assert_eq!(config.history_size, 5);
            assert!(config.logging_enabled);
            Ok(())
        });
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_local_file_beats_user_file() {
        Jail::expect_with(|jail| {
            isolate_config_dir(jail);
            std::fs::create_dir_all(".config/tcalc").expect("create config dir");
            jail.create_file(".config/tcalc/config.toml", "history_size = 7\nlogging_enabled = false")?;
            jail.create_file(LOCAL_CONFIG_FILE, "history_size = 3")?;

            let config = CalcConfig::load().expect("config loads");
            assert_eq!(config.history_size, 3);
            assert!(!config.logging_enabled);
            Ok(())
        });
    }

    #[test]
    fn test_env_beats_local_file() {
        Jail::expect_with(|jail| {
            isolate_config_dir(jail);
            jail.create_file(LOCAL_CONFIG_FILE, "logging_enabled = true")?;
            jail.set_env("TCALC_LOGGING_ENABLED", "false");
            jail.set_env("TCALC_LOG_PATH", "from_env.csv");

            let config = CalcConfig::load().expect("config loads");
            assert!(!config.logging_enabled);
            assert_eq!(config.log_path, PathBuf::from("from_env.csv"));
            Ok(())
        });
    }

    #[test]
    fn test_malformed_value_is_a_figment_error() {
        Jail::expect_with(|jail| {
            isolate_config_dir(jail);
            jail.set_env("TCALC_HISTORY_SIZE", "lots");
            assert!(matches!(CalcConfig::load(), Err(ConfigError::Figment(_))));
            Ok(())
        });
    }

    #[test]
    fn test_empty_log_path_is_invalid() {
        Jail::expect_with(|jail| {
            isolate_config_dir(jail);
            jail.create_file(LOCAL_CONFIG_FILE, r#"log_path = """#)?;
            assert!(matches!(CalcConfig::load(), Err(ConfigError::InvalidValue { .. })));
            Ok(())
        });
    }
}
