use serde::{Deserialize, Serialize};

/// A registered charging station (OCPP "charge point" / "charge box").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: i64,
    /// External identity carried in the WebSocket upgrade path and in
    /// every OCPP frame; unique across the fleet.
    pub charge_box_id: String,
    pub vendor: String,
    pub model: String,
    pub serial: String,
    pub firmware: String,
    /// Whether a `StationLink` is currently registered for this station.
    pub online: bool,
}

impl Station {
    /// Apply the vendor/model/serial/firmware refresh carried by a
    /// `BootNotification`.
    pub fn apply_boot_notification(
        &mut self,
        vendor: &str,
        model: &str,
        serial: Option<&str>,
        firmware: Option<&str>,
    ) {
        self.vendor = vendor.to_string();
        self.model = model.to_string();
        if let Some(serial) = serial {
            self.serial = serial.to_string();
        }
        if let Some(firmware) = firmware {
            self.firmware = firmware.to_string();
        }
    }
}
