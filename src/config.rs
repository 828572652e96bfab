//! Layered configuration: a TOML file with per-field environment overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

const ENV_CONFIG_PATH: &str = "OCPP_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default = "default_db_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_db_name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub db: DbConfig,
    /// Port the station WebSocket listener binds to.
    #[serde(default = "default_ws_port")]
    pub ws_port: u16,
    /// Port the control-plane HTTP surface binds to.
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    /// Hours added to UTC when persisting timestamps. Earlier systems in
    /// this space hardcode 3; kept as a configurable parameter instead.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i64,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default timeout, in seconds, for an outbound server-initiated CALL.
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            user: default_db_user(),
            password: String::new(),
            name: default_db_name(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db: DbConfig::default(),
            ws_port: default_ws_port(),
            control_port: default_control_port(),
            utc_offset_hours: default_utc_offset_hours(),
            logging: LoggingConfig::default(),
            command_timeout_secs: default_command_timeout_secs(),
        }
    }
}

fn default_db_host() -> String {
    "127.0.0.1".to_string()
}
fn default_db_port() -> u16 {
    5432
}
fn default_db_user() -> String {
    "ocpp".to_string()
}
fn default_db_name() -> String {
    "ocpp".to_string()
}
fn default_ws_port() -> u16 {
    8080
}
fn default_control_port() -> u16 {
    9090
}
fn default_utc_offset_hours() -> i64 {
    3
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_command_timeout_secs() -> u64 {
    10
}

impl AppConfig {
    /// Load configuration from `path`, falling back to defaults for any
    /// field missing from the file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut cfg: AppConfig = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            AppConfig::default()
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Resolves to `$OCPP_CONFIG` if set, otherwise a platform config
    /// directory.
    pub fn default_config_path() -> PathBuf {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            return PathBuf::from(p);
        }
        dirs_next::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ocpp-gateway")
            .join("config.toml")
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("OCPP_DB_HOST") {
            self.db.host = v;
        }
        if let Ok(v) = std::env::var("OCPP_DB_PORT") {
            if let Ok(p) = v.parse() {
                self.db.port = p;
            }
        }
        if let Ok(v) = std::env::var("OCPP_DB_USER") {
            self.db.user = v;
        }
        if let Ok(v) = std::env::var("OCPP_DB_PASSWORD") {
            self.db.password = v;
        }
        if let Ok(v) = std::env::var("OCPP_DB_NAME") {
            self.db.name = v;
        }
        if let Ok(v) = std::env::var("OCPP_WS_PORT") {
            if let Ok(p) = v.parse() {
                self.ws_port = p;
            }
        }
        if let Ok(v) = std::env::var("OCPP_CONTROL_PORT") {
            if let Ok(p) = v.parse() {
                self.control_port = p;
            }
        }
        if let Ok(v) = std::env::var("OCPP_UTC_OFFSET_HOURS") {
            if let Ok(h) = v.parse() {
                self.utc_offset_hours = h;
            }
        }
        if let Ok(v) = std::env::var("OCPP_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db.user, self.db.password, self.db.host, self.db.port, self.db.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.ws_port, 8080);
        assert_eq!(cfg.control_port, 9090);
        assert_eq!(cfg.utc_offset_hours, 3);
        assert_eq!(cfg.command_timeout_secs, 10);
    }

    #[test]
    fn env_override_wins_over_file_default() {
        std::env::set_var("OCPP_WS_PORT", "7000");
        let mut cfg = AppConfig::default();
        cfg.apply_env_overrides();
        assert_eq!(cfg.ws_port, 7000);
        std::env::remove_var("OCPP_WS_PORT");
    }
}
