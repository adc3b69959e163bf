//! Configuration for the alert engine
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/finpulse/config.toml)
//! 3. Built-in defaults (lowest priority)
//!
//! The config file is operator input and fails fast when malformed; the
//! runtime state blobs under the data directory are parse-or-default
//! instead (see the storage module).

use serde::Deserialize;
use std::path::PathBuf;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for the persisted state blobs (settings, cooldown,
    /// history, plan)
    pub data_dir: PathBuf,

    /// Seconds between watcher evaluations of the plan
    pub check_interval_secs: u64,

    /// Email channel endpoint settings
    pub email: EmailConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Backend email-send endpoint settings. Channel enablement lives in the
/// notification settings blob, not here.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// URL the rendered email is POSTed to
    pub endpoint: String,
    /// Recipient address
    pub to: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3001/api/send-email".to_string(),
            to: String::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level when RUST_LOG is not set
    pub level: String,
    /// Also write JSON logs to rotating files
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_prefix: String,
    pub file_rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_prefix: "finpulse".to_string(),
            file_rotation: LogRotation::Daily,
        }
    }
}

/// Log file rotation schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

impl LogRotation {
    fn parse(value: &str) -> Self {
        match value {
            "hourly" => LogRotation::Hourly,
            "never" => LogRotation::Never,
            _ => LogRotation::Daily,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            check_interval_secs: 60,
            email: EmailConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("finpulse")
}

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub data_dir: Option<String>,
    pub check_interval_secs: Option<u64>,

    /// Optional [email] section
    pub email: Option<FileEmail>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileEmail {
    pub endpoint: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_prefix: Option<String>,
    pub file_rotation: Option<String>,
}

impl Config {
    /// Get the config file path: ~/.config/finpulse/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("finpulse").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        // Don't overwrite existing config
        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Silently fail - config is optional
            }
        }

        // Write config (ignore errors - config is optional)
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// A broken config fails fast with a clear error instead of silently
    /// falling back to defaults while the user debugs the wrong thing.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\nCONFIG ERROR - Failed to parse {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  To reset, delete the file and restart finpulse.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\nCONFIG ERROR - Cannot read {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: file -> env vars -> defaults
    pub fn from_env() -> Self {
        Self::from_parts(Self::load_file_config(), EnvOverrides::capture())
    }

    fn from_parts(file: FileConfig, env: EnvOverrides) -> Self {
        let defaults = Config::default();

        let data_dir = env
            .data_dir
            .or(file.data_dir)
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let check_interval_secs = env
            .check_interval_secs
            .or(file.check_interval_secs)
            .unwrap_or(defaults.check_interval_secs);

        let file_email = file.email.unwrap_or_default();
        let email = EmailConfig {
            endpoint: env
                .email_endpoint
                .or(file_email.endpoint)
                .unwrap_or(defaults.email.endpoint),
            to: env.email_to.or(file_email.to).unwrap_or(defaults.email.to),
        };

        let file_logging = file.logging.unwrap_or_default();
        let logging = LoggingConfig {
            level: file_logging.level.unwrap_or(defaults.logging.level),
            file_enabled: file_logging
                .file_enabled
                .unwrap_or(defaults.logging.file_enabled),
            file_dir: file_logging
                .file_dir
                .map(PathBuf::from)
                .unwrap_or(defaults.logging.file_dir),
            file_prefix: file_logging
                .file_prefix
                .unwrap_or(defaults.logging.file_prefix),
            file_rotation: file_logging
                .file_rotation
                .as_deref()
                .map(LogRotation::parse)
                .unwrap_or(defaults.logging.file_rotation),
        };

        Self {
            data_dir,
            check_interval_secs,
            email,
            logging,
        }
    }

    /// Render the default config template written on first run.
    pub fn to_toml(&self) -> String {
        format!(
            "# finpulse configuration\n\
             # Values here are overridden by FINPULSE_* environment variables.\n\
             \n\
             # data_dir = {data_dir:?}\n\
             check_interval_secs = {interval}\n\
             \n\
             [email]\n\
             endpoint = {endpoint:?}\n\
             to = {to:?}\n\
             \n\
             [logging]\n\
             level = {level:?}\n\
             file_enabled = {file_enabled}\n\
             file_dir = {file_dir:?}\n\
             file_prefix = {file_prefix:?}\n\
             # hourly, daily or never\n\
             file_rotation = \"daily\"\n",
            data_dir = self.data_dir.display().to_string(),
            interval = self.check_interval_secs,
            endpoint = self.email.endpoint,
            to = self.email.to,
            level = self.logging.level,
            file_enabled = self.logging.file_enabled,
            file_dir = self.logging.file_dir.display().to_string(),
            file_prefix = self.logging.file_prefix,
        )
    }
}

/// Environment overrides, captured once so loading stays testable.
#[derive(Debug, Default)]
struct EnvOverrides {
    data_dir: Option<String>,
    check_interval_secs: Option<u64>,
    email_endpoint: Option<String>,
    email_to: Option<String>,
}

impl EnvOverrides {
    fn capture() -> Self {
        Self {
            data_dir: std::env::var("FINPULSE_DATA_DIR").ok(),
            check_interval_secs: std::env::var("FINPULSE_CHECK_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok()),
            email_endpoint: std::env::var("FINPULSE_EMAIL_ENDPOINT").ok(),
            email_to: std::env::var("FINPULSE_EMAIL_TO").ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify that the written template parses back. Catches TOML syntax
    /// errors in the hand-rendered template.
    #[test]
    fn test_default_template_roundtrips() {
        let toml_str = Config::default().to_toml();
        let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
        assert!(
            parsed.is_ok(),
            "Default config template should parse.\nTOML:\n{}\nError: {:?}",
            toml_str,
            parsed.err()
        );
    }

    #[test]
    fn test_file_values_override_defaults() {
        let file: FileConfig = toml::from_str(
            r#"
            check_interval_secs = 120

            [email]
            endpoint = "https://api.example.com/send"
            to = "me@example.com"

            [logging]
            level = "debug"
            file_enabled = true
            file_rotation = "hourly"
            "#,
        )
        .unwrap();

        let config = Config::from_parts(file, EnvOverrides::default());
        assert_eq!(config.check_interval_secs, 120);
        assert_eq!(config.email.endpoint, "https://api.example.com/send");
        assert_eq!(config.email.to, "me@example.com");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file_enabled);
        assert_eq!(config.logging.file_rotation, LogRotation::Hourly);
    }

    #[test]
    fn test_env_beats_file() {
        let file: FileConfig = toml::from_str(
            r#"
            check_interval_secs = 120

            [email]
            to = "file@example.com"
            "#,
        )
        .unwrap();
        let env = EnvOverrides {
            check_interval_secs: Some(30),
            email_to: Some("env@example.com".to_string()),
            ..Default::default()
        };

        let config = Config::from_parts(file, env);
        assert_eq!(config.check_interval_secs, 30);
        assert_eq!(config.email.to, "env@example.com");
    }

    #[test]
    fn test_empty_sources_fall_back_to_defaults() {
        let config = Config::from_parts(FileConfig::default(), EnvOverrides::default());
        assert_eq!(config.check_interval_secs, 60);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.file_enabled);
        assert_eq!(config.logging.file_rotation, LogRotation::Daily);
    }

    #[test]
    fn test_unknown_rotation_defaults_to_daily() {
        assert_eq!(LogRotation::parse("weekly"), LogRotation::Daily);
        assert_eq!(LogRotation::parse("hourly"), LogRotation::Hourly);
        assert_eq!(LogRotation::parse("never"), LogRotation::Never);
    }
}
