//! Per-link pending-call registry (C3): correlates outbound CALL `uniqueId`s
//! with a single-shot awaiter, under a default timeout.
//!
//! A map keyed by message id, each entry paired with a oneshot channel,
//! scoped to one [`crate::transport::StationLink`] rather than the whole
//! fleet, with a 10s default timeout.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::{oneshot, Mutex};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum PendingCallError {
    #[error("no outstanding call for id {0}")]
    UnknownId(String),
    #[error("station did not reply within the deadline")]
    Timeout,
    #[error("link closed while waiting for a reply")]
    LinkClosed,
    #[error("station returned CALLERROR {code}: {description}")]
    Remote { code: String, description: String },
}

/// Either side of an outstanding call's resolution: a CALLRESULT payload or
/// a CALLERROR's code/description.
enum Outcome {
    Payload(Value),
    Error { code: String, description: String },
}

/// Registry of outstanding outbound CALLs for a single station connection.
pub struct PendingCalls {
    awaiters: Mutex<HashMap<String, oneshot::Sender<Outcome>>>,
    timeout: Duration,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            awaiters: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Register `unique_id` and wait for its CALLRESULT/CALLERROR payload,
    /// or the configured timeout, whichever comes first. Cleans up its own
    /// entry in all cases.
    pub async fn call(&self, unique_id: String) -> Result<Value, PendingCallError> {
        let (tx, rx) = oneshot::channel();
        self.awaiters.lock().await.insert(unique_id.clone(), tx);

        let result = tokio::time::timeout(self.timeout, rx).await;
        self.awaiters.lock().await.remove(&unique_id);

        match result {
            Ok(Ok(Outcome::Payload(payload))) => Ok(payload),
            Ok(Ok(Outcome::Error { code, description })) => Err(PendingCallError::Remote { code, description }),
            Ok(Err(_)) => Err(PendingCallError::LinkClosed),
            Err(_) => Err(PendingCallError::Timeout),
        }
    }

    /// Complete the awaiter for `unique_id` with a CALLRESULT `payload`. A
    /// late or unknown id is logged by the caller and otherwise ignored.
    pub async fn complete(&self, unique_id: &str, payload: Value) -> Result<(), PendingCallError> {
        self.resolve(unique_id, Outcome::Payload(payload)).await
    }

    /// Complete the awaiter for `unique_id` with a CALLERROR.
    pub async fn fail(
        &self,
        unique_id: &str,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<(), PendingCallError> {
        self.resolve(
            unique_id,
            Outcome::Error {
                code: code.into(),
                description: description.into(),
            },
        )
        .await
    }

    async fn resolve(&self, unique_id: &str, outcome: Outcome) -> Result<(), PendingCallError> {
        let tx = self
            .awaiters
            .lock()
            .await
            .remove(unique_id)
            .ok_or_else(|| PendingCallError::UnknownId(unique_id.to_string()))?;
        let _ = tx.send(outcome);
        Ok(())
    }

    /// Fail every outstanding awaiter — called when the link tears down.
    pub async fn cancel_all(&self) {
        let mut awaiters = self.awaiters.lock().await;
        for (_, tx) in awaiters.drain() {
            drop(tx);
        }
    }
}

impl Default for PendingCalls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_a_registered_call() {
        let registry = std::sync::Arc::new(PendingCalls::new());
        let r2 = registry.clone();
        let handle = tokio::spawn(async move { r2.call("id1".to_string()).await });

        // Give the awaiter a chance to register.
        tokio::task::yield_now().await;
        registry
            .complete("id1", serde_json::json!({"status": "Accepted"}))
            .await
            .unwrap();

        let payload = handle.await.unwrap().unwrap();
        assert_eq!(payload["status"], "Accepted");
    }

    #[tokio::test]
    async fn unknown_id_completion_errors() {
        let registry = PendingCalls::new();
        let err = registry.complete("ghost", serde_json::json!({})).await;
        assert!(matches!(err, Err(PendingCallError::UnknownId(_))));
    }

    #[tokio::test]
    async fn times_out_when_nothing_replies() {
        let registry = PendingCalls::with_timeout(Duration::from_millis(20));
        let err = registry.call("id2".to_string()).await.unwrap_err();
        assert!(matches!(err, PendingCallError::Timeout));
    }

    #[tokio::test]
    async fn fail_surfaces_the_call_error() {
        let registry = std::sync::Arc::new(PendingCalls::new());
        let r2 = registry.clone();
        let handle = tokio::spawn(async move { r2.call("id4".to_string()).await });
        tokio::task::yield_now().await;
        registry.fail("id4", "NotImplemented", "unsupported action").await.unwrap();
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, PendingCallError::Remote { code, .. } if code == "NotImplemented"));
    }

    #[tokio::test]
    async fn cancel_all_fails_outstanding_awaiters() {
        let registry = std::sync::Arc::new(PendingCalls::with_timeout(Duration::from_secs(5)));
        let r2 = registry.clone();
        let handle = tokio::spawn(async move { r2.call("id3".to_string()).await });
        tokio::task::yield_now().await;
        registry.cancel_all().await;
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, PendingCallError::LinkClosed));
    }
}
