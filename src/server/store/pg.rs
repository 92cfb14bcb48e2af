use super::{ClaimWrite, ReleaseWrite, SplitStore, StoreError};
use crate::server::database::connection::Connection;
use crate::server::database::pool::Pool;
use crate::server::model::item::BillItem;
use crate::server::model::participant::Participant;
use crate::server::DB_TIMEOUT_SECONDS;
use chrono::{DateTime, Utc};
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;

const ITEM_COLUMNS: &str =
    "id, session_id, unit_price_cents, total_quantity, claimed_quantity, claimed_by, version";
const PARTICIPANT_COLUMNS: &str = "id, session_id, is_host, is_active, joined_at, last_seen_at";

#[derive(Clone)]
pub(crate) struct PgStore {
    read_pool: Pool,
    write_pool: Pool,
}

impl PgStore {
    pub fn new(read_pool: Pool, write_pool: Pool) -> Self {
        Self {
            read_pool,
            write_pool,
        }
    }

    async fn read_conn(&self) -> Result<Connection, StoreError> {
        self.read_pool
            .acquire(DB_TIMEOUT_SECONDS)
            .await
            .ok_or(StoreError::Unavailable)
    }

    async fn write_conn(&self) -> Result<Connection, StoreError> {
        self.write_pool
            .acquire(DB_TIMEOUT_SECONDS)
            .await
            .ok_or(StoreError::Unavailable)
    }
}

fn row_to_item(row: &Row) -> BillItem {
    BillItem {
        id: row.get("id"),
        session_id: row.get("session_id"),
        unit_price_cents: row.get("unit_price_cents"),
        total_quantity: row.get("total_quantity"),
        claimed_quantity: row.get("claimed_quantity"),
        claimed_by: row.get("claimed_by"),
        version: row.get("version"),
    }
}

fn row_to_participant(row: &Row) -> Participant {
    Participant {
        id: row.get("id"),
        session_id: row.get("session_id"),
        is_host: row.get("is_host"),
        is_active: row.get("is_active"),
        joined_at: row.get("joined_at"),
        last_seen_at: row.get("last_seen_at"),
    }
}

impl SplitStore for PgStore {
    async fn fetch_item(&self, item_id: i64) -> Result<Option<BillItem>, StoreError> {
        let conn = self.read_conn().await?;
        let rows = conn
            .query(
                format!("SELECT {ITEM_COLUMNS} FROM bill_item WHERE id = $1").as_str(),
                &[&item_id],
            )
            .await?;
        Ok(rows.first().map(row_to_item))
    }

    async fn session_items(
        &self,
        session_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<BillItem>, StoreError> {
        let conn = self.read_conn().await?;
        let params: &[&(dyn ToSql + Sync)] = &[&session_id, &offset, &limit];
        let rows = conn
            .query(
                format!(
                    r#"
                    SELECT {ITEM_COLUMNS}
                    FROM bill_item
                    WHERE session_id = $1
                    ORDER BY id
                    OFFSET $2
                    LIMIT $3
                "#
                )
                .as_str(),
                params,
            )
            .await?;
        Ok(rows.iter().map(row_to_item).collect())
    }

    async fn write_claim(
        &self,
        item_id: i64,
        expected_version: i64,
        claimed_quantity: i32,
        claimed_by: Option<i64>,
    ) -> Result<ClaimWrite, StoreError> {
        let mut conn = self.write_conn().await?;
        let txn = conn.transaction().await?;
        let params: &[&(dyn ToSql + Sync)] =
            &[&item_id, &expected_version, &claimed_quantity, &claimed_by];
        let updated = txn
            .query(
                r#"
                UPDATE bill_item
                SET claimed_quantity = $3, claimed_by = $4, version = version + 1
                WHERE id = $1 AND version = $2
                RETURNING version
            "#,
                params,
            )
            .await?;
        let write = match updated.first() {
            Some(row) => ClaimWrite::Applied {
                new_version: row.get("version"),
            },
            // lost the race or the version was stale; report the live version
            None => match txn
                .query("SELECT version FROM bill_item WHERE id = $1", &[&item_id])
                .await?
                .first()
            {
                Some(row) => ClaimWrite::VersionMismatch {
                    current_version: row.get("version"),
                },
                None => ClaimWrite::Missing,
            },
        };
        txn.commit().await?;
        Ok(write)
    }

    async fn write_release(
        &self,
        item_id: i64,
        participant_id: i64,
    ) -> Result<ReleaseWrite, StoreError> {
        let mut conn = self.write_conn().await?;
        let txn = conn.transaction().await?;
        let params: &[&(dyn ToSql + Sync)] = &[&item_id, &participant_id];
        let updated = txn
            .query(
                r#"
                UPDATE bill_item
                SET claimed_quantity = 0, claimed_by = NULL, version = version + 1
                WHERE id = $1 AND claimed_by = $2
                RETURNING version
            "#,
                params,
            )
            .await?;
        let write = match updated.first() {
            Some(row) => ReleaseWrite::Applied {
                new_version: row.get("version"),
            },
            None => match txn
                .query("SELECT id FROM bill_item WHERE id = $1", &[&item_id])
                .await?
                .first()
            {
                Some(_) => ReleaseWrite::NotOwner,
                None => ReleaseWrite::Missing,
            },
        };
        txn.commit().await?;
        Ok(write)
    }

    async fn find_participant(
        &self,
        session_id: i64,
        participant_id: i64,
    ) -> Result<Option<Participant>, StoreError> {
        let conn = self.read_conn().await?;
        let rows = conn
            .query(
                format!("SELECT {PARTICIPANT_COLUMNS} FROM participant WHERE id = $1 AND session_id = $2")
                    .as_str(),
                &[&participant_id, &session_id],
            )
            .await?;
        Ok(rows.first().map(row_to_participant))
    }

    async fn add_participant(
        &self,
        session_id: i64,
        is_host: bool,
        joined_at: DateTime<Utc>,
    ) -> Result<Participant, StoreError> {
        let conn = self.write_conn().await?;
        let params: &[&(dyn ToSql + Sync)] = &[&session_id, &is_host, &joined_at];
        let row = conn
            .query_one(
                r#"
                INSERT INTO participant(session_id, is_host, is_active, joined_at, last_seen_at)
                VALUES ($1, $2, TRUE, $3, $3)
                RETURNING id
            "#,
                params,
            )
            .await?;
        Ok(Participant {
            id: row.get("id"),
            session_id,
            is_host,
            is_active: true,
            joined_at,
            last_seen_at: joined_at,
        })
    }

    async fn touch_participant(
        &self,
        participant_id: i64,
        seen_at: DateTime<Utc>,
        active: bool,
    ) -> Result<bool, StoreError> {
        let conn = self.write_conn().await?;
        let params: &[&(dyn ToSql + Sync)] = &[&participant_id, &seen_at, &active];
        let affected = conn
            .execute(
                "UPDATE participant SET last_seen_at = $2, is_active = $3 WHERE id = $1",
                params,
            )
            .await?;
        Ok(affected > 0)
    }

    async fn active_participants(&self, session_id: i64) -> Result<Vec<Participant>, StoreError> {
        let conn = self.read_conn().await?;
        let rows = conn
            .query(
                format!(
                    "SELECT {PARTICIPANT_COLUMNS} FROM participant WHERE session_id = $1 AND is_active"
                )
                .as_str(),
                &[&session_id],
            )
            .await?;
        Ok(rows.iter().map(row_to_participant).collect())
    }

    async fn deactivate_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<i64>, StoreError> {
        let conn = self.write_conn().await?;
        let rows = conn
            .query(
                r#"
                UPDATE participant
                SET is_active = FALSE
                WHERE is_active AND last_seen_at < $1
                RETURNING id
            "#,
                &[&cutoff],
            )
            .await?;
        Ok(rows.iter().map(|row| row.get("id")).collect())
    }
}
