//! Station registry (C6): the process-wide `stationId -> StationLink` map
//! the control service uses to reach a live connection.
//!
//! Keyed by the internal station id (not the charge-box string) and backed
//! by a single `tokio::sync::RwLock` rather than `DashMap` — link
//! construction and teardown are the only writes, low-contention enough
//! that one lock is simpler than a lock-free map and no less correct.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::transport::StationLink;

#[derive(Default)]
pub struct StationRegistry {
    links: RwLock<HashMap<i64, Arc<StationLink>>>,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, station_id: i64, link: Arc<StationLink>) {
        self.links.write().await.insert(station_id, link);
    }

    pub async fn get(&self, station_id: i64) -> Option<Arc<StationLink>> {
        self.links.read().await.get(&station_id).cloned()
    }

    /// Remove `station_id` from the registry, but only if the map still
    /// holds the same link instance — guards against a newer connection's
    /// teardown racing an older one's.
    pub async fn remove_if_current(&self, station_id: i64, link: &Arc<StationLink>) {
        let mut links = self.links.write().await;
        if let Some(current) = links.get(&station_id) {
            if Arc::ptr_eq(current, link) {
                links.remove(&station_id);
            }
        }
    }

    pub async fn is_online(&self, station_id: i64) -> bool {
        self.links.read().await.contains_key(&station_id)
    }

    pub async fn connected_station_ids(&self) -> Vec<i64> {
        self.links.read().await.keys().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.links.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::test_support::test_link;

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let registry = StationRegistry::new();
        let link = test_link(1);
        registry.insert(1, link.clone()).await;
        let found = registry.get(1).await.unwrap();
        assert!(Arc::ptr_eq(&found, &link));
    }

    #[tokio::test]
    async fn remove_if_current_only_removes_the_matching_instance() {
        let registry = StationRegistry::new();
        let first = test_link(1);
        let second = test_link(1);
        registry.insert(1, first.clone()).await;
        registry.insert(1, second.clone()).await;

        // A stale teardown for `first` must not evict `second`.
        registry.remove_if_current(1, &first).await;
        assert!(registry.get(1).await.is_some());

        registry.remove_if_current(1, &second).await;
        assert!(registry.get(1).await.is_none());
    }

    #[tokio::test]
    async fn unknown_station_is_absent() {
        let registry = StationRegistry::new();
        assert!(registry.get(99).await.is_none());
        assert!(!registry.is_online(99).await);
    }
}
