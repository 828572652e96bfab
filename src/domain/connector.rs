use serde::{Deserialize, Serialize};

/// Normalized connector state. Mirrors the lowercase OCPP 1.6
/// `StatusNotification.status` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorState {
    Available,
    Preparing,
    Charging,
    Suspendedevse,
    Suspendedev,
    Finishing,
    Reserved,
    Unavailable,
    Faulted,
}

impl ConnectorState {
    /// Parse the OCPP `status` string, case-insensitively, falling back to
    /// `Unavailable` for anything unrecognized rather than failing the frame.
    pub fn from_ocpp_status(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "available" => Self::Available,
            "preparing" => Self::Preparing,
            "charging" => Self::Charging,
            "suspendedevse" => Self::Suspendedevse,
            "suspendedev" => Self::Suspendedev,
            "finishing" => Self::Finishing,
            "reserved" => Self::Reserved,
            "faulted" => Self::Faulted,
            _ => Self::Unavailable,
        }
    }

    /// Whether a session on this connector is still actively charging —
    /// used by the StatusNotification/StopTransaction auto-finish rule.
    pub fn is_active_charging(&self) -> bool {
        matches!(self, Self::Charging | Self::Finishing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Preparing => "preparing",
            Self::Charging => "charging",
            Self::Suspendedevse => "suspendedevse",
            Self::Suspendedev => "suspendedev",
            Self::Finishing => "finishing",
            Self::Reserved => "reserved",
            Self::Unavailable => "unavailable",
            Self::Faulted => "faulted",
        }
    }
}

/// A physical connector on a station, keyed by `(station_id, ocpp_id)` —
/// its OCPP index, not an internal id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub station_id: i64,
    pub ocpp_id: u32,
    pub state: ConnectorState,
}
