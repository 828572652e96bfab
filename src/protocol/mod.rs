//! OCPP 1.6J protocol: wire framing (C2), payload shapes, the pending-call
//! correlation registry (C3), and the per-action handlers (C5).

mod frame;
mod handlers;
mod messages;
mod pending;

pub use frame::{OcppFrame, OcppFrameError};
pub use handlers::{dispatch_call, DispatchError, HandlerContext};
pub use messages::{
    RemoteStartStopStatus, RemoteStartTransactionRequest, RemoteStartTransactionResponse,
    RemoteStopTransactionRequest, RemoteStopTransactionResponse,
};
pub use pending::{PendingCallError, PendingCalls};

/// OCPP 1.6 WebSocket subprotocol name, negotiated at upgrade time.
pub const OCPP_SUBPROTOCOL: &str = "ocpp1.6";

/// Generate a fresh `uniqueId` for an outbound CALL.
///
/// Earlier id generators built this from a near-constant nanosecond value,
/// which is not actually random. Uses the `rand` crate instead so ids are
/// genuinely unpredictable.
pub fn generate_unique_id() -> String {
    use rand::Rng;
    let now = chrono::Utc::now().format("%Y%m%d%H%M%S");
    let suffix: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("{now}_{suffix}")
}

/// Generate a fresh idTag for a remote-started session:
/// 5 random bytes, lowercase hex, 10 characters.
pub fn generate_id_tag() -> String {
    let bytes: [u8; 5] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_ids_are_not_constant() {
        let a = generate_unique_id();
        let b = generate_unique_id();
        assert_ne!(a, b);
    }

    #[test]
    fn id_tag_is_ten_hex_chars() {
        let tag = generate_id_tag();
        assert_eq!(tag.len(), 10);
        assert!(tag.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
