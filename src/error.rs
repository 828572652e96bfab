//! Crate-wide error types.

use thiserror::Error;

/// Failure mode of the [`crate::store::Store`] port.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("station {0} not found")]
    StationNotFound(String),
    #[error("connector ({0}, {1}) not found")]
    ConnectorNotFound(String, u32),
    #[error("current session {0} not found")]
    SessionNotFound(i64),
    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Failures loading [`crate::config::AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors surfaced by the control-plane `Start`/`Stop` RPCs.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("station not connected")]
    StationNotConnected,
    #[error("database error: {0}")]
    ErrorDb(#[from] StoreError),
    #[error("failed to send command to station: {0}")]
    SendCommandError(String),
    #[error("station did not accept the command")]
    CommandWasNotAccepted,
}

impl ControlError {
    /// Stable machine-readable code, used in the control-plane HTTP error body.
    pub fn code(&self) -> &'static str {
        match self {
            ControlError::StationNotConnected => "stationNotConnected",
            ControlError::ErrorDb(_) => "errorDB",
            ControlError::SendCommandError(_) => "sendCommandError",
            ControlError::CommandWasNotAccepted => "commandWasNotAccepted",
        }
    }
}
