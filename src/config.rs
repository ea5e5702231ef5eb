//! Configuration loading and constants.
//!
//! Settings come from three layers: built-in defaults, an optional TOML file for
//! tuning values (listen address, store namespace and timeouts, log format), and the
//! process environment for everything the deployment injects (store endpoint and
//! credentials, display colors, the failure-simulation flag). `AppConfig` is resolved
//! once at startup and never mutated afterwards.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use const_format::formatcp;
use serde::{Deserialize, Serialize};

// =============================================================================
// HTTP Response Cache Control
// =============================================================================

/// Submission form - static markup, safe to cache briefly
pub const HTTP_CACHE_FORM_MAX_AGE: u32 = 60;

pub const CACHE_CONTROL_FORM: &str = formatcp!("public, max-age={}", HTTP_CACHE_FORM_MAX_AGE);

/// Everything that reflects configuration or store contents must be revalidated
pub const CACHE_CONTROL_DYNAMIC: &str = "no-store";

// =============================================================================
// Message Limits
// =============================================================================

/// Maximum length for a submitted message (characters)
pub const MAX_MESSAGE_LENGTH: usize = 4096;

// =============================================================================
// Environment Variables
// =============================================================================

pub const ENV_STORE_HOST: &str = "MONGO_HOST";
pub const ENV_STORE_PORT: &str = "MONGO_PORT";
pub const ENV_STORE_USERNAME: &str = "MONGO_USERNAME";
pub const ENV_STORE_PASSWORD: &str = "MONGO_PASSWORD";
pub const ENV_STORE_DATABASE: &str = "MONGO_DATABASE";
pub const ENV_DEFAULT_COLOR: &str = "APP_COLOR";
pub const ENV_ALLOWED_COLORS: &str = "ALLOWED_COLORS";
pub const ENV_FAIL_FLAG: &str = "FAIL_FLAG";
pub const ENV_HTTP_HOST: &str = "HTTP_HOST";
pub const ENV_HTTP_PORT: &str = "HTTP_PORT";

// =============================================================================
// Defaults
// =============================================================================

/// Palette used when `ALLOWED_COLORS` is not set
pub const DEFAULT_ALLOWED_COLORS: &[&str] =
    &["red", "green", "blue", "teal", "yellow", "orange", "purple"];

pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 8080;

pub const DEFAULT_DATABASE: &str = "tritier";
pub const DEFAULT_COLLECTION: &str = "messages";

/// Seconds allowed for establishing a store connection / selecting a server
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Seconds allowed for a single store operation
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Seconds to wait for in-flight requests after a shutdown signal
pub const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 30;

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "tritier=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http: HttpServerConfig,
    pub store: StoreConfig,
    pub colors: ColorConfig,
    /// When set, `/issue` reports a simulated failure
    pub fail_flag: bool,
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
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }
}

/// Store tuning values that may come from the TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "StoreSettings::default_database")]
    pub database: String,
    #[serde(default = "StoreSettings::default_collection")]
    pub collection: String,
    #[serde(default = "StoreSettings::default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "StoreSettings::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            database: Self::default_database(),
            collection: Self::default_collection(),
            connect_timeout_seconds: Self::default_connect_timeout(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

impl StoreSettings {
    fn default_database() -> String {
        DEFAULT_DATABASE.to_string()
    }

    fn default_collection() -> String {
        DEFAULT_COLLECTION.to_string()
    }

    fn default_connect_timeout() -> u64 {
        DEFAULT_CONNECT_TIMEOUT_SECS
    }

    fn default_request_timeout() -> u64 {
        DEFAULT_REQUEST_TIMEOUT_SECS
    }
}

/// Document store connection configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub credentials: Option<StoreCredentials>,
    pub settings: StoreSettings,
}

impl StoreConfig {
    /// Check if credentials are configured
    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }
}

/// Store credentials. Never printed: `Debug` redacts the password.
#[derive(Clone)]
pub struct StoreCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Display color configuration
#[derive(Debug, Clone, Serialize)]
pub struct ColorConfig {
    pub default_color: String,
    pub allowed_colors: BTreeSet<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// The optional TOML layer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub http: HttpServerConfig,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

impl AppConfig {
    /// Resolve configuration from the optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a file layer and a variable lookup.
    ///
    /// Blank values count as absent.
    pub fn from_sources<F>(file: FileConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let FileConfig {
            mut http,
            mut store,
            logging,
        } = file;

        if let Some(host) = var(ENV_HTTP_HOST) {
            http.host = host;
        }
        if let Some(port) = var(ENV_HTTP_PORT) {
            http.port = parse_port(ENV_HTTP_PORT, &port)?;
        }
        if let Some(database) = var(ENV_STORE_DATABASE) {
            store.database = database;
        }

        let host = required(ENV_STORE_HOST)?;
        let port = parse_port(ENV_STORE_PORT, &required(ENV_STORE_PORT)?)?;

        let credentials = match (var(ENV_STORE_USERNAME), var(ENV_STORE_PASSWORD)) {
            (Some(username), Some(password)) => Some(StoreCredentials { username, password }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Validation(format!(
                    "{} and {} must be set together",
                    ENV_STORE_USERNAME, ENV_STORE_PASSWORD
                )))
            }
        };

        let allowed_colors: BTreeSet<String> = match var(ENV_ALLOWED_COLORS) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_ALLOWED_COLORS.iter().map(|c| c.to_string()).collect(),
        };
        if allowed_colors.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{} does not name any color",
                ENV_ALLOWED_COLORS
            )));
        }

        let default_color = required(ENV_DEFAULT_COLOR)?;
        if !allowed_colors.contains(&default_color) {
            return Err(ConfigError::Validation(format!(
                "{} '{}' is not one of the allowed colors",
                ENV_DEFAULT_COLOR, default_color
            )));
        }

        let fail_flag = match var(ENV_FAIL_FLAG) {
            Some(value) => parse_flag(ENV_FAIL_FLAG, &value)?,
            None => false,
        };

        Ok(Self {
            http,
            store: StoreConfig {
                host,
                port,
                credentials,
                settings: store,
            },
            colors: ColorConfig {
                default_color,
                allowed_colors,
            },
            fail_flag,
            logging,
        })
    }
}

fn parse_port(key: &'static str, value: &str) -> Result<u16, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
        expected: "a port number (0-65535)",
    })
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            expected: "a boolean (true/false)",
        }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("Invalid value '{value}' for {key}: expected {expected}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            (ENV_STORE_HOST, "mongo"),
            (ENV_STORE_PORT, "27017"),
            (ENV_DEFAULT_COLOR, "teal"),
        ]
    }

    fn with(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        let mut pairs = base();
        pairs.extend_from_slice(extra);
        pairs
    }

    #[test]
    fn test_minimal_environment() {
        let config = AppConfig::from_sources(FileConfig::default(), env(&base())).unwrap();
        assert_eq!(config.store.host, "mongo");
        assert_eq!(config.store.port, 27017);
        assert!(!config.store.has_credentials());
        assert_eq!(config.colors.default_color, "teal");
        assert!(config.colors.allowed_colors.contains("blue"));
        assert!(!config.fail_flag);
        assert_eq!(config.http.port, DEFAULT_HTTP_PORT);
        assert_eq!(config.store.settings.database, DEFAULT_DATABASE);
    }

    #[test]
    fn test_missing_required_variables() {
        for key in [ENV_STORE_HOST, ENV_STORE_PORT, ENV_DEFAULT_COLOR] {
            let pairs: Vec<_> = base().into_iter().filter(|(k, _)| *k != key).collect();
            let err = AppConfig::from_sources(FileConfig::default(), env(&pairs)).unwrap_err();
            assert!(matches!(err, ConfigError::Missing(k) if k == key), "{key}: {err}");
        }
    }

    #[test]
    fn test_blank_variable_counts_as_missing() {
        let pairs = vec![
            (ENV_STORE_HOST, "  "),
            (ENV_STORE_PORT, "27017"),
            (ENV_DEFAULT_COLOR, "teal"),
        ];
        let err = AppConfig::from_sources(FileConfig::default(), env(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_STORE_HOST)));
    }

    #[test]
    fn test_unparseable_port() {
        for port in ["mongo", "70000", "-1"] {
            let pairs = vec![
                (ENV_STORE_HOST, "mongo"),
                (ENV_STORE_PORT, port),
                (ENV_DEFAULT_COLOR, "teal"),
            ];
            let err = AppConfig::from_sources(FileConfig::default(), env(&pairs)).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: ENV_STORE_PORT, .. }));
        }
    }

    #[test]
    fn test_fail_flag_values() {
        for (raw, expected) in [("true", true), ("TRUE", true), ("1", true), ("no", false), ("false", false)] {
            let pairs = with(&[(ENV_FAIL_FLAG, raw)]);
            let config = AppConfig::from_sources(FileConfig::default(), env(&pairs)).unwrap();
            assert_eq!(config.fail_flag, expected, "{raw}");
        }

        let pairs = with(&[(ENV_FAIL_FLAG, "maybe")]);
        let err = AppConfig::from_sources(FileConfig::default(), env(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: ENV_FAIL_FLAG, .. }));
    }

    #[test]
    fn test_allowed_colors_list() {
        let pairs = with(&[(ENV_ALLOWED_COLORS, "teal, blue,,")]);
        let config = AppConfig::from_sources(FileConfig::default(), env(&pairs)).unwrap();
        let colors: Vec<_> = config.colors.allowed_colors.iter().cloned().collect();
        assert_eq!(colors, vec!["blue".to_string(), "teal".to_string()]);
    }

    #[test]
    fn test_default_color_must_be_allowed() {
        let pairs = with(&[(ENV_ALLOWED_COLORS, "red,blue")]);
        let err = AppConfig::from_sources(FileConfig::default(), env(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_credentials_must_be_paired() {
        let pairs = with(&[(ENV_STORE_USERNAME, "admin")]);
        let err = AppConfig::from_sources(FileConfig::default(), env(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let pairs = with(&[(ENV_STORE_USERNAME, "admin"), (ENV_STORE_PASSWORD, "hunter2")]);
        let config = AppConfig::from_sources(FileConfig::default(), env(&pairs)).unwrap();
        assert!(config.store.has_credentials());
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let credentials = StoreCredentials {
            username: "admin".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_file_layer_and_env_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[http]
port = 9000

[store]
database = "demo"
request_timeout_seconds = 2

[logging]
format = "json"
"#
        )
        .unwrap();

        let file_config = FileConfig::load(file.path()).unwrap();
        assert_eq!(file_config.http.host, DEFAULT_HTTP_HOST);
        assert_eq!(file_config.store.collection, DEFAULT_COLLECTION);

        let pairs = with(&[(ENV_HTTP_PORT, "9100"), (ENV_STORE_DATABASE, "override")]);
        let config = AppConfig::from_sources(file_config, env(&pairs)).unwrap();
        assert_eq!(config.http.port, 9100);
        assert_eq!(config.store.settings.database, "override");
        assert_eq!(config.store.settings.request_timeout_seconds, 2);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_missing_config_file() {
        let err = FileConfig::load("/nonexistent/tritier.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
