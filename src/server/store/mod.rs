//! Storage seam for the split core. The core modules only ever see this
//! trait; production goes to postgres, tests run against an in-memory
//! implementation with real row versions.

use crate::server::model::item::BillItem;
use crate::server::model::participant::Participant;
use chrono::{DateTime, Utc};
use derive_more::{Display, Error};

#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod pg;

#[derive(Debug, Display, Error)]
pub(crate) enum StoreError {
    #[display("no database connection available")]
    Unavailable,
    #[display("database error: {_0}")]
    Db(tokio_postgres::Error),
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        StoreError::Db(e)
    }
}

/// Result of the conditional claim write. The write only lands when the row
/// version still equals the caller's expected version.
#[derive(Debug, PartialEq)]
pub(crate) enum ClaimWrite {
    Applied { new_version: i64 },
    VersionMismatch { current_version: i64 },
    Missing,
}

/// Result of a release, gated on `claimed_by` instead of version.
#[derive(Debug, PartialEq)]
pub(crate) enum ReleaseWrite {
    Applied { new_version: i64 },
    NotOwner,
    Missing,
}

pub(crate) trait SplitStore: Send + Sync {
    async fn fetch_item(&self, item_id: i64) -> Result<Option<BillItem>, StoreError>;

    async fn session_items(
        &self,
        session_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<BillItem>, StoreError>;

    /// Compare-and-swap the claim fields of one item. Sets
    /// `claimed_quantity`/`claimed_by` and bumps `version`, but only if the
    /// stored version still equals `expected_version`.
    async fn write_claim(
        &self,
        item_id: i64,
        expected_version: i64,
        claimed_quantity: i32,
        claimed_by: Option<i64>,
    ) -> Result<ClaimWrite, StoreError>;

    /// Clear the claim on one item if and only if `participant_id` owns it.
    async fn write_release(
        &self,
        item_id: i64,
        participant_id: i64,
    ) -> Result<ReleaseWrite, StoreError>;

    async fn find_participant(
        &self,
        session_id: i64,
        participant_id: i64,
    ) -> Result<Option<Participant>, StoreError>;

    async fn add_participant(
        &self,
        session_id: i64,
        is_host: bool,
        joined_at: DateTime<Utc>,
    ) -> Result<Participant, StoreError>;

    /// Set `last_seen_at` and the active flag; `false` when no such row.
    async fn touch_participant(
        &self,
        participant_id: i64,
        seen_at: DateTime<Utc>,
        active: bool,
    ) -> Result<bool, StoreError>;

    async fn active_participants(&self, session_id: i64) -> Result<Vec<Participant>, StoreError>;

    /// Flip participants inactive whose heartbeat is older than `cutoff`;
    /// returns the ids that were swept.
    async fn deactivate_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<i64>, StoreError>;
}
