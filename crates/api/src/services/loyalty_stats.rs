//! Cached loyalty stats with change notification.
//!
//! Every ledger write replaces the member's cached stats and broadcasts the
//! new value to subscribers. The ledger is append-only, so `entry_count`
//! orders snapshots: a value with fewer entries than the cached one is stale
//! and is dropped.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use domain::models::LoyaltyStats;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

pub struct LoyaltyStatsStore {
    cache: RwLock<HashMap<Uuid, LoyaltyStats>>,
    tx: broadcast::Sender<LoyaltyStats>,
}

impl LoyaltyStatsStore {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            cache: RwLock::new(HashMap::new()),
            tx,
        }
    }

    pub async fn get(&self, user_id: Uuid) -> Option<LoyaltyStats> {
        self.cache.read().await.get(&user_id).cloned()
    }

    /// Caches `stats` without notifying (used after a read-through load).
    ///
    /// Returns `false` when the cache already holds a newer snapshot.
    pub async fn insert(&self, stats: LoyaltyStats) -> bool {
        let mut cache = self.cache.write().await;
        match cache.entry(stats.user_id) {
            Entry::Occupied(mut slot) => {
                if slot.get().entry_count > stats.entry_count {
                    return false;
                }
                slot.insert(stats);
            }
            Entry::Vacant(slot) => {
                slot.insert(stats);
            }
        }
        true
    }

    /// Caches fresh stats after a write and notifies subscribers. Stale
    /// values are neither cached nor broadcast.
    pub async fn publish(&self, stats: LoyaltyStats) {
        if self.insert(stats.clone()).await {
            // No subscribers is fine.
            let _ = self.tx.send(stats);
        }
    }

    pub async fn invalidate(&self, user_id: Uuid) {
        self.cache.write().await.remove(&user_id);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoyaltyStats> {
        self.tx.subscribe()
    }
}

impl Default for LoyaltyStatsStore {
    fn default() -> Self {
        Self::new()
    }
}
