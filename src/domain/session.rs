use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A charging transaction: modeled as one record type shared by the
/// current-session and finished-session tables, distinguished only by
/// which `Store` method wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub station_id: i64,
    pub connector_id: i64,
    pub connector_ocpp_id: u32,
    pub connector_type: String,
    pub connector_power: i32,
    pub user_id: i64,
    pub email: String,
    pub id_tag: String,

    pub begin: Option<String>,
    pub end: Option<String>,

    pub voltage: f32,
    pub current: f32,
    pub power: f32,
    pub soc: i32,
    pub soc_begin: Option<i32>,
    pub soc_end: Option<i32>,
    pub max_power: f32,
    pub charged_energy: f32,

    pub price_limit: f32,
    pub price_per_kwh: f32,
    pub percent_limit: i32,
    pub total_price: f32,
    /// Elapsed seconds between `begin` and the most recent sample/stop.
    pub time_left: i64,

    /// -1 rejected, 0 pending, 1 accepted.
    pub was_start_accepted: i32,
    pub was_first_meter_values: bool,
    pub was_start_transaction: bool,
    pub was_stop_transaction: bool,

    pub location_country: String,
    pub location_city: String,
    pub location_street: String,
    pub location_photo_url: Option<String>,
    pub station_serial: String,
    pub owner: String,
}

/// Format a `DateTime<Utc>` the way sessions are persisted: adds the
/// configured offset (3h by default) and writes `"YYYY-MM-DD HH:MM:SS"`
/// with no timezone suffix.
pub fn format_persisted_timestamp(ts: DateTime<Utc>, utc_offset_hours: i64) -> String {
    (ts + Duration::hours(utc_offset_hours))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Parse a timestamp previously written by [`format_persisted_timestamp`]
/// back into a naive offset-shifted instant, for elapsed-time math.
pub fn parse_persisted_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()
}

impl Session {
    /// `totalPrice = round(chargedEnergy * pricePerKwH, 2)`.
    pub fn recompute_total_price(&mut self) {
        let energy = Decimal::from_f32_retain(self.charged_energy).unwrap_or_default();
        let price = Decimal::from_f32_retain(self.price_per_kwh).unwrap_or_default();
        let total = (energy * price).round_dp(2);
        self.total_price = total.to_string().parse().unwrap_or(0.0);
    }

    /// Recompute `timeLeft` as the elapsed seconds between `begin` and
    /// `sample_ts` (both already offset-shifted persisted strings).
    pub fn recompute_time_left(&mut self, sample_ts: &str) {
        let (Some(begin), Some(sample)) = (
            self.begin.as_deref().and_then(parse_persisted_timestamp),
            parse_persisted_timestamp(sample_ts),
        ) else {
            return;
        };
        self.time_left = (sample - begin).num_seconds().max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn persisted_timestamp_adds_offset() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_persisted_timestamp(ts, 3), "2024-01-01 03:00:00");
    }

    #[test]
    fn total_price_rounds_to_two_places() {
        let mut s = blank_session();
        s.charged_energy = 1.5;
        s.price_per_kwh = 10.0;
        s.recompute_total_price();
        assert_eq!(s.total_price, 15.0);
    }

    #[test]
    fn time_left_is_elapsed_seconds_since_begin() {
        let mut s = blank_session();
        s.begin = Some("2024-01-01 03:00:00".to_string());
        s.recompute_time_left("2024-01-01 03:10:00");
        assert_eq!(s.time_left, 600);
    }

    fn blank_session() -> Session {
        Session {
            id: 1,
            station_id: 1,
            connector_id: 1,
            connector_ocpp_id: 1,
            connector_type: "Type2".into(),
            connector_power: 22,
            user_id: 1,
            email: String::new(),
            id_tag: "TAG".into(),
            begin: None,
            end: None,
            voltage: 0.0,
            current: 0.0,
            power: 0.0,
            soc: 0,
            soc_begin: None,
            soc_end: None,
            max_power: 0.0,
            charged_energy: 0.0,
            price_limit: 0.0,
            price_per_kwh: 0.0,
            percent_limit: 0,
            total_price: 0.0,
            time_left: 0,
            was_start_accepted: 0,
            was_first_meter_values: false,
            was_start_transaction: false,
            was_stop_transaction: false,
            location_country: String::new(),
            location_city: String::new(),
            location_street: String::new(),
            location_photo_url: None,
            station_serial: String::new(),
            owner: String::new(),
        }
    }
}
