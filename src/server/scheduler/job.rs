//! Presence timeout scheduler: the collaborator that flips stale diners
//! inactive so the dynamic split stops counting them.

use crate::server::store::pg::PgStore;
use crate::server::store::{SplitStore, StoreError};
use crate::server::util::time::helper::now_utc;
use chrono::{DateTime, Utc};
use log::{error, info};
use std::time::Duration;
use tokio::{pin, select, time};
use tokio_util::sync::CancellationToken;
use tokio_util::task::task_tracker;

/// A participant whose last heartbeat is older than this is considered gone.
const STALE_AFTER_SECONDS: i64 = 90;

/// One sweep pass; the sweep is the moral equivalent of `leave` on every
/// participant whose heartbeat went quiet.
pub(crate) async fn sweep_stale<S: SplitStore>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<Vec<i64>, StoreError> {
    store
        .deactivate_stale(now - chrono::Duration::seconds(STALE_AFTER_SECONDS))
        .await
}

async fn worker(store: PgStore, cancel_token: CancellationToken) {
    let interval = time::interval(Duration::from_secs(60));
    pin!(interval);
    loop {
        select! {
            _ = interval.tick() => {},
            _ = cancel_token.cancelled() => {
                info!("received cancel signal, returning gracefully");
                return;
            }
        }

        match sweep_stale(&store, now_utc()).await {
            Ok(swept) if swept.is_empty() => {}
            Ok(swept) => {
                info!("marked stale participants {:?} as inactive", swept);
            }
            Err(e) => {
                error!("failed to sweep stale participants, {}", e);
            }
        };
    }
}

pub(crate) async fn presence_sweeper(store: PgStore, cancel_token: CancellationToken) {
    let tracker = task_tracker::TaskTracker::new();
    tracker.spawn(worker(store, cancel_token));
    if tracker.close() {
        tracker.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::presence;
    use crate::server::store::memory::MemStore;
    use crate::server::util::time::mock_chrono;

    #[tokio::test]
    async fn sweeps_only_participants_past_the_window() {
        let store = MemStore::new();
        mock_chrono::set_now(1000);
        let stale = presence::join_session(&store, 1, true).await.unwrap();
        mock_chrono::set_now(1050);
        let fresh = presence::join_session(&store, 1, false).await.unwrap();

        let now = DateTime::<Utc>::from_timestamp(1100, 0).unwrap();
        let swept = sweep_stale(&store, now).await.unwrap();
        assert_eq!(swept, vec![stale.id]);

        assert!(!store.participant(stale.id).await.unwrap().is_active);
        assert!(store.participant(fresh.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn swept_participants_are_not_resurrected() {
        let store = MemStore::new();
        mock_chrono::set_now(0);
        let p = presence::join_session(&store, 1, true).await.unwrap();

        let now = DateTime::<Utc>::from_timestamp(300, 0).unwrap();
        sweep_stale(&store, now).await.unwrap();
        let again = sweep_stale(&store, now).await.unwrap();
        assert!(again.is_empty());
        assert!(!store.participant(p.id).await.unwrap().is_active);
    }
}
