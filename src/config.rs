//! Configuration loading and constants.
//!
//! `AppConfig` is resolved once at startup and then treated as immutable.
//! Sources are layered, lowest priority first: built-in defaults, an optional
//! TOML file, environment variables (after `.env` has been loaded), and finally
//! command-line flags applied by the binary.

use const_format::formatcp;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Service info payload never changes during a process lifetime
pub const HTTP_CACHE_INFO_MAX_AGE: u32 = 60;

pub const CACHE_CONTROL_INFO: &str = formatcp!("public, max-age={}", HTTP_CACHE_INFO_MAX_AGE);

/// Health responses must always be fresh for liveness probes
pub const CACHE_CONTROL_HEALTH: &str = "no-store";

// =============================================================================
// Service Info
// =============================================================================

/// Message returned by the root endpoint
pub const INFO_MESSAGE: &str = "DevOps demo application is running";

/// Documentation pointer returned by the root endpoint
pub const INFO_DOCS: &str = "Check README.md for usage instructions.";

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path (optional, defaults apply if absent)
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default dotenv file path (optional)
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port when `PORT` is unset
pub const DEFAULT_PORT: u16 = 3000;

/// Version reported by `/health` when `APP_VERSION` is unset
pub const DEFAULT_APP_VERSION: &str = "local";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "devops_demo=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

// =============================================================================
// Environment Variables
// =============================================================================

pub const ENV_PORT: &str = "PORT";
pub const ENV_HOST: &str = "HOST";
pub const ENV_APP_VERSION: &str = "APP_VERSION";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
pub const ENV_LOG_FILTER: &str = "RUST_LOG";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Values reported by the service endpoints
    #[serde(default)]
    pub app: AppInfoConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_PORT
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppInfoConfig {
    /// Build or deploy version reported by `/health`
    #[serde(default = "AppInfoConfig::default_version")]
    pub version: String,
}

impl Default for AppInfoConfig {
    fn default() -> Self {
        Self {
            version: Self::default_version(),
        }
    }
}

impl AppInfoConfig {
    fn default_version() -> String {
        DEFAULT_APP_VERSION.to_string()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
    /// `EnvFilter` directives, e.g. "devops_demo=debug,tower_http=info"
    #[serde(default = "LoggingConfig::default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: Self::default_format(),
            filter: Self::default_filter(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    fn default_filter() -> String {
        DEFAULT_LOG_FILTER.to_string()
    }

    /// Parsed log format, or `None` if the configured value is not recognized.
    pub fn log_format(&self) -> Option<LogFormat> {
        match self.format.trim().to_ascii_lowercase().as_str() {
            "text" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl AppConfig {
    /// Load configuration from a TOML file. A missing file is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load_optional<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Overlay values from an environment lookup.
    ///
    /// `lookup` returns `None` for unset variables. Empty values are treated as
    /// unset so `PORT=` in a `.env` file keeps the default; whitespace-only
    /// values are kept as given.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(port) = get(ENV_PORT) {
            self.http.port = port.trim().parse::<u16>().map_err(|e| {
                ConfigError::Env {
                    var: ENV_PORT,
                    value: port.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(host) = get(ENV_HOST) {
            self.http.host = host.trim().to_string();
        }
        if let Some(version) = get(ENV_APP_VERSION) {
            self.app.version = version;
        }
        if let Some(format) = get(ENV_LOG_FORMAT) {
            self.logging.format = format;
        }
        if let Some(filter) = get(ENV_LOG_FILTER) {
            self.logging.filter = filter;
        }

        Ok(())
    }

    /// Overlay command-line flags, which take priority over every other source.
    pub fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(port) = overrides.port {
            self.http.port = port;
        }
        if let Some(host) = &overrides.host {
            self.http.host = host.clone();
        }
        if let Some(filter) = &overrides.log_filter {
            self.logging.filter = filter.clone();
        }
    }

    /// Resolve the final configuration: `base` (defaults or file) overlaid with
    /// the environment from `lookup`, then with command-line flags.
    pub fn resolve<F>(mut base: Self, lookup: F, overrides: &CliOverrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        base.apply_env(lookup)?;
        base.apply_overrides(overrides);
        Ok(base)
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub log_filter: Option<String>,
}

/// Reads a variable from the process environment.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Reads `KEY=value` entries from a dotenv file without touching the process
/// environment.
pub fn read_env_file<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>, ConfigError> {
    dotenvy::from_path_iter(path.as_ref())?
        .map(|item| item.map_err(ConfigError::from))
        .collect()
}

/// Lookup that consults `lookup` first and falls back to `env_file`, so a
/// dotenv entry never replaces a variable that is already set.
pub fn with_env_file<F>(lookup: F, env_file: HashMap<String, String>) -> impl Fn(&str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    move |name: &str| lookup(name).or_else(|| env_file.get(name).cloned())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to read environment file: {0}")]
    EnvFile(#[from] dotenvy::Error),
    #[error("Invalid value {value:?} for {var}: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.app.version, "local");
        assert_eq!(config.logging.log_format(), Some(LogFormat::Text));
    }

    #[test]
    fn test_unset_env_keeps_defaults() {
        let mut config = AppConfig::default();
        config.apply_env(lookup_from(&[])).unwrap();
        assert_eq!(config.http.port, DEFAULT_PORT);
        assert_eq!(config.app.version, DEFAULT_APP_VERSION);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env(lookup_from(&[
                ("PORT", "8081"),
                ("HOST", "127.0.0.1"),
                ("APP_VERSION", "1.4.2"),
                ("LOG_FORMAT", "json"),
                ("RUST_LOG", "info"),
            ]))
            .unwrap();

        assert_eq!(config.http.port, 8081);
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.app.version, "1.4.2");
        assert_eq!(config.logging.log_format(), Some(LogFormat::Json));
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_empty_env_values_are_unset() {
        let mut config = AppConfig::default();
        config
            .apply_env(lookup_from(&[("PORT", ""), ("APP_VERSION", "")]))
            .unwrap();
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.app.version, "local");
    }

    #[test]
    fn test_whitespace_version_is_kept() {
        let mut config = AppConfig::default();
        config
            .apply_env(lookup_from(&[("APP_VERSION", "  ")]))
            .unwrap();
        assert_eq!(config.app.version, "  ");
    }

    #[test]
    fn test_flag_beats_env_beats_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[http]\nport = 4000\nhost = \"10.0.0.1\"\n\n[app]\nversion = \"from-file\"\n\n[logging]\nfilter = \"warn\""
        )
        .unwrap();
        let base = AppConfig::load(file.path()).unwrap();

        let overrides = CliOverrides {
            port: Some(6000),
            host: None,
            log_filter: Some("trace".to_string()),
        };
        let config = AppConfig::resolve(
            base,
            lookup_from(&[("PORT", "5000"), ("HOST", "127.0.0.1"), ("RUST_LOG", "info")]),
            &overrides,
        )
        .unwrap();

        // flag over env
        assert_eq!(config.http.port, 6000);
        assert_eq!(config.logging.filter, "trace");
        // env over file
        assert_eq!(config.http.host, "127.0.0.1");
        // file over default
        assert_eq!(config.app.version, "from-file");
        // default
        assert_eq!(config.logging.format, DEFAULT_LOG_FORMAT);
    }

    #[test]
    fn test_resolve_without_sources_gives_defaults() {
        let config =
            AppConfig::resolve(AppConfig::default(), lookup_from(&[]), &CliOverrides::default())
                .unwrap();
        assert_eq!(config.http.port, DEFAULT_PORT);
        assert_eq!(config.http.host, DEFAULT_HOST);
        assert_eq!(config.app.version, DEFAULT_APP_VERSION);
    }

    #[test]
    fn test_resolve_propagates_env_error() {
        let result = AppConfig::resolve(
            AppConfig::default(),
            lookup_from(&[("PORT", "abc")]),
            &CliOverrides {
                port: Some(8080),
                ..CliOverrides::default()
            },
        );
        assert!(matches!(result, Err(ConfigError::Env { var: "PORT", .. })));
    }

    #[test]
    fn test_env_file_does_not_replace_set_variable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "PORT=3999\nAPP_VERSION=from-dotenv").unwrap();
        let env_file = read_env_file(file.path()).unwrap();

        let lookup = with_env_file(lookup_from(&[("PORT", "8081")]), env_file);
        let config =
            AppConfig::resolve(AppConfig::default(), lookup, &CliOverrides::default()).unwrap();

        assert_eq!(config.http.port, 8081);
        assert_eq!(config.app.version, "from-dotenv");
    }

    #[test]
    fn test_read_env_file_missing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_env_file(dir.path().join(".env")).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(_)));
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(lookup_from(&[("PORT", "eighty")]))
            .unwrap_err();
        match err {
            ConfigError::Env { var, value, .. } => {
                assert_eq!(var, "PORT");
                assert_eq!(value, "eighty");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_port_is_an_error() {
        let mut config = AppConfig::default();
        assert!(config.apply_env(lookup_from(&[("PORT", "70000")])).is_err());
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 4000\n\n[app]\nversion = \"from-file\"").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.http.port, 4000);
        assert_eq!(config.http.host, DEFAULT_HOST);
        assert_eq!(config.app.version, "from-file");
        assert_eq!(config.logging.format, DEFAULT_LOG_FORMAT);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 4000").unwrap();

        let mut config = AppConfig::load(file.path()).unwrap();
        config.apply_env(lookup_from(&[("PORT", "5000")])).unwrap();
        assert_eq!(config.http.port, 5000);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_optional_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_optional(dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.http.port, DEFAULT_PORT);
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http\nport = ").unwrap();
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_log_format() {
        let logging = LoggingConfig {
            format: "yaml".to_string(),
            filter: DEFAULT_LOG_FILTER.to_string(),
        };
        assert_eq!(logging.log_format(), None);
    }

    #[test]
    fn test_cache_control_info() {
        assert_eq!(CACHE_CONTROL_INFO, "public, max-age=60");
    }
}
