//! Configuration resolution for the SSO service.
//!
//! Implements layered config resolution:
//! 1. Built-in defaults
//! 2. TOML config file (`--config`)
//! 3. Environment variables
//! 4. CLI arguments (highest priority, applied by the binary)

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Complete SSO configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// gRPC listener binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub host: String,
    pub port: u16,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 50051,
        }
    }
}

impl TransportConfig {
    /// Resolve `host:port` into a socket address.
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid transport address: {e}")))
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` database file. `None` resolves to [`default_database_path`].
    pub path: Option<PathBuf>,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
    /// How often expired refresh tokens are purged.
    pub token_gc_interval_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 5,
            busy_timeout_secs: 5,
            token_gc_interval_secs: 3600,
        }
    }
}

/// Password hashing and token signing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// bcrypt cost factor.
    pub hash_cost: u32,
    pub jwt: JwtConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            hash_cost: 10,
            jwt: JwtConfig::default(),
        }
    }
}

/// JWT signing parameters. TTLs are in seconds.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub verify_email_ttl_secs: i64,
    pub forget_password_ttl_secs: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            algorithm: "HS256".to_string(),
            access_ttl_secs: 15 * 60,
            refresh_ttl_secs: 30 * 24 * 60 * 60,
            verify_email_ttl_secs: 24 * 60 * 60,
            forget_password_ttl_secs: 60 * 60,
        }
    }
}

// Keeps the signing secret out of logs.
impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("verify_email_ttl_secs", &self.verify_email_ttl_secs)
            .field("forget_password_ttl_secs", &self.forget_password_ttl_secs)
            .finish()
    }
}

/// Field format rules. A field is valid iff every regex of its list matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub email_regexp: String,
    pub password_regexps: Vec<String>,
    pub display_name_regexps: Vec<String>,
    pub phone_regexps: Vec<String>,
    pub telegram_regexps: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            email_regexp: r"^[^@\s]+@[^@\s]+\.[^@\s]+$".to_string(),
            password_regexps: vec![
                r"^\S{8,}$".to_string(),
                r"[A-Za-z]".to_string(),
                r"[0-9]".to_string(),
            ],
            display_name_regexps: vec![r"^.{1,64}$".to_string(), r"\S".to_string()],
            phone_regexps: vec![r"^\+?[0-9]{7,15}$".to_string()],
            telegram_regexps: vec![r"^@?[A-Za-z0-9_]{5,32}$".to_string()],
        }
    }
}

impl ValidationConfig {
    fn all_patterns(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.email_regexp)
            .chain(&self.password_regexps)
            .chain(&self.display_name_regexps)
            .chain(&self.phone_regexps)
            .chain(&self.telegram_regexps)
    }
}

/// Notification publishing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Webhook base URL. Events are only logged when unset.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub subjects: SubjectsConfig,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 5,
            subjects: SubjectsConfig::default(),
        }
    }
}

/// Subject names events are published under.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectsConfig {
    pub verify_email: String,
    pub forget_password: String,
}

impl Default for SubjectsConfig {
    fn default() -> Self {
        Self {
            verify_email: "sso.verify-email".to_string(),
            forget_password: "sso.forget-password".to_string(),
        }
    }
}

/// Log output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Append logs to this file instead of stdout.
    pub file_path: Option<PathBuf>,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            json: false,
        }
    }
}

impl Config {
    /// Parse a TOML document on top of the built-in defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reject configurations the service cannot start with.
    pub fn validate(&self) -> Result<()> {
        let jwt = &self.security.jwt;
        if jwt.secret.is_empty() {
            return Err(Error::Config("security.jwt.secret must be set".into()));
        }
        if !matches!(jwt.algorithm.as_str(), "HS256" | "HS384" | "HS512") {
            return Err(Error::Config(format!(
                "security.jwt.algorithm must be one of HS256, HS384, HS512 (got {})",
                jwt.algorithm
            )));
        }
        for (name, ttl) in [
            ("access_ttl_secs", jwt.access_ttl_secs),
            ("refresh_ttl_secs", jwt.refresh_ttl_secs),
            ("verify_email_ttl_secs", jwt.verify_email_ttl_secs),
            ("forget_password_ttl_secs", jwt.forget_password_ttl_secs),
        ] {
            if ttl <= 0 {
                return Err(Error::Config(format!("security.jwt.{name} must be positive")));
            }
        }
        if !(4..=31).contains(&self.security.hash_cost) {
            return Err(Error::Config(format!(
                "security.hash_cost must be within 4..=31 (got {})",
                self.security.hash_cost
            )));
        }
        if self.database.max_connections == 0 {
            return Err(Error::Config("database.max_connections must be positive".into()));
        }
        for pattern in self.validation.all_patterns() {
            regex::Regex::new(pattern)
                .map_err(|e| Error::Config(format!("Invalid validation regexp {pattern:?}: {e}")))?;
        }
        Ok(())
    }

    /// Database file path, falling back to the per-user default.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database.path.clone().or_else(default_database_path)
    }
}

/// Load configuration with layered resolution.
///
/// A missing `path` means defaults plus environment only; a `path` that does
/// not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => Config::default(),
    };
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Default database path: `~/.sso/sso.db`.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".sso").join("sso.db"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Apply `SSO_*` overrides using `lookup` as the variable source.
pub fn apply_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("SSO_JWT_SECRET") {
        config.security.jwt.secret = val;
    }
    if let Some(val) = lookup("SSO_DB_PATH") {
        config.database.path = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("SSO_LOG_LEVEL") {
        config.logging.level = val;
    }
    if let Some(val) = lookup("SSO_NOTIFICATIONS_ENDPOINT") {
        config.notifications.endpoint = Some(val);
    }
    if let Some(port) = lookup("SSO_PORT").and_then(|val| val.parse().ok()) {
        config.transport.port = port;
    }
}
