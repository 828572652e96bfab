//! OCPP 1.6J message and type re-exports for the actions this gateway
//! handles — sourced from `rust-ocpp`, the same crate the teacher's own
//! handlers build on (`handle_meter_values.rs`, `handle_stop_transaction.rs`,
//! `handle_authorize.rs`, `handle_heartbeat.rs`, `commands/remote_stop.rs`,
//! `commands/data_transfer.rs`). Field names, casing, and optionality come
//! straight from the crate's own serde derives; nothing here is hand-rolled.

pub use rust_ocpp::v1_6::messages::authorize::{AuthorizeRequest, AuthorizeResponse};
pub use rust_ocpp::v1_6::messages::boot_notification::{BootNotificationRequest, BootNotificationResponse};
pub use rust_ocpp::v1_6::messages::data_transfer::{DataTransferRequest, DataTransferResponse};
pub use rust_ocpp::v1_6::messages::diagnostics_status_notification::{
    DiagnosticsStatusNotificationRequest, DiagnosticsStatusNotificationResponse,
};
pub use rust_ocpp::v1_6::messages::firmware_status_notification::{
    FirmwareStatusNotificationRequest, FirmwareStatusNotificationResponse,
};
pub use rust_ocpp::v1_6::messages::heart_beat::{HeartbeatRequest, HeartbeatResponse};
pub use rust_ocpp::v1_6::messages::meter_values::{MeterValuesRequest, MeterValuesResponse};
pub use rust_ocpp::v1_6::messages::remote_start_transaction::{
    RemoteStartTransactionRequest, RemoteStartTransactionResponse,
};
pub use rust_ocpp::v1_6::messages::remote_stop_transaction::{
    RemoteStopTransactionRequest, RemoteStopTransactionResponse,
};
pub use rust_ocpp::v1_6::messages::start_transaction::{StartTransactionRequest, StartTransactionResponse};
pub use rust_ocpp::v1_6::messages::status_notification::{StatusNotificationRequest, StatusNotificationResponse};
pub use rust_ocpp::v1_6::messages::stop_transaction::{StopTransactionRequest, StopTransactionResponse};

pub use rust_ocpp::v1_6::types::{
    AuthorizationStatus, ChargePointStatus, DataTransferStatus, IdTagInfo, Measurand, MeterValue,
    RegistrationStatus, RemoteStartStopStatus, SampledValue,
};
