//! In-memory store for unit tests. Models the same row-version CAS the
//! postgres implementation relies on, so ledger semantics can be tested
//! without a database.

use super::{ClaimWrite, ReleaseWrite, SplitStore, StoreError};
use crate::server::model::item::BillItem;
use crate::server::model::participant::Participant;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct MemInner {
    items: BTreeMap<i64, BillItem>,
    participants: BTreeMap<i64, Participant>,
    next_participant_id: i64,
}

#[derive(Default)]
pub(crate) struct MemStore {
    inner: Mutex<MemInner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a bill item at version 1, unclaimed.
    pub async fn seed_item(&self, id: i64, session_id: i64, unit_price_cents: i64, total_quantity: i32) {
        self.inner.lock().await.items.insert(
            id,
            BillItem {
                id,
                session_id,
                unit_price_cents,
                total_quantity,
                claimed_quantity: 0,
                claimed_by: None,
                version: 1,
            },
        );
    }

    pub async fn item(&self, id: i64) -> Option<BillItem> {
        self.inner.lock().await.items.get(&id).cloned()
    }

    pub async fn participant(&self, id: i64) -> Option<Participant> {
        self.inner.lock().await.participants.get(&id).cloned()
    }
}

impl SplitStore for MemStore {
    async fn fetch_item(&self, item_id: i64) -> Result<Option<BillItem>, StoreError> {
        Ok(self.inner.lock().await.items.get(&item_id).cloned())
    }

    async fn session_items(
        &self,
        session_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<BillItem>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .items
            .values()
            .filter(|i| i.session_id == session_id)
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn write_claim(
        &self,
        item_id: i64,
        expected_version: i64,
        claimed_quantity: i32,
        claimed_by: Option<i64>,
    ) -> Result<ClaimWrite, StoreError> {
        let mut inner = self.inner.lock().await;
        let Some(item) = inner.items.get_mut(&item_id) else {
            return Ok(ClaimWrite::Missing);
        };
        if item.version != expected_version {
            return Ok(ClaimWrite::VersionMismatch {
                current_version: item.version,
            });
        }
        item.claimed_quantity = claimed_quantity;
        item.claimed_by = claimed_by;
        item.version += 1;
        Ok(ClaimWrite::Applied {
            new_version: item.version,
        })
    }

    async fn write_release(
        &self,
        item_id: i64,
        participant_id: i64,
    ) -> Result<ReleaseWrite, StoreError> {
        let mut inner = self.inner.lock().await;
        let Some(item) = inner.items.get_mut(&item_id) else {
            return Ok(ReleaseWrite::Missing);
        };
        if item.claimed_by != Some(participant_id) {
            return Ok(ReleaseWrite::NotOwner);
        }
        item.claimed_quantity = 0;
        item.claimed_by = None;
        item.version += 1;
        Ok(ReleaseWrite::Applied {
            new_version: item.version,
        })
    }

    async fn find_participant(
        &self,
        session_id: i64,
        participant_id: i64,
    ) -> Result<Option<Participant>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .participants
            .get(&participant_id)
            .filter(|p| p.session_id == session_id)
            .cloned())
    }

    async fn add_participant(
        &self,
        session_id: i64,
        is_host: bool,
        joined_at: DateTime<Utc>,
    ) -> Result<Participant, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_participant_id += 1;
        let p = Participant {
            id: inner.next_participant_id,
            session_id,
            is_host,
            is_active: true,
            joined_at,
            last_seen_at: joined_at,
        };
        inner.participants.insert(p.id, p.clone());
        Ok(p)
    }

    async fn touch_participant(
        &self,
        participant_id: i64,
        seen_at: DateTime<Utc>,
        active: bool,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.participants.get_mut(&participant_id) {
            Some(p) => {
                p.last_seen_at = seen_at;
                p.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn active_participants(&self, session_id: i64) -> Result<Vec<Participant>, StoreError> {
        Ok(self
            .inner
            .lock()
            .await
            .participants
            .values()
            .filter(|p| p.session_id == session_id && p.is_active)
            .cloned()
            .collect())
    }

    async fn deactivate_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<i64>, StoreError> {
        let mut inner = self.inner.lock().await;
        let mut swept = Vec::new();
        for p in inner.participants.values_mut() {
            if p.is_active && p.last_seen_at < cutoff {
                p.is_active = false;
                swept.push(p.id);
            }
        }
        Ok(swept)
    }
}
