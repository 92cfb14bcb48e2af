//! Participant presence: heartbeat, explicit leave, active-set reads.
//! Staleness detection belongs to the scheduler, not here.

use crate::server::error::CoreError;
use crate::server::model::participant::Participant;
use crate::server::store::SplitStore;
use crate::server::util::time::helper::now_utc;
use chrono::{DateTime, Utc};

/// Mark the participant seen and active right now. Idempotent.
pub(crate) async fn heartbeat<S: SplitStore>(
    store: &S,
    participant_id: i64,
) -> Result<DateTime<Utc>, CoreError> {
    let now = now_utc();
    if store.touch_participant(participant_id, now, true).await? {
        Ok(now)
    } else {
        Err(CoreError::NotFound)
    }
}

/// Explicit, immediate departure; does not wait for any timeout.
pub(crate) async fn leave<S: SplitStore>(
    store: &S,
    participant_id: i64,
) -> Result<DateTime<Utc>, CoreError> {
    let now = now_utc();
    if store.touch_participant(participant_id, now, false).await? {
        Ok(now)
    } else {
        Err(CoreError::NotFound)
    }
}

pub(crate) async fn active_count<S: SplitStore>(
    store: &S,
    session_id: i64,
) -> Result<u32, CoreError> {
    Ok(store.active_participants(session_id).await?.len() as u32)
}

/// Create the participant row for a diner joining the session.
pub(crate) async fn join_session<S: SplitStore>(
    store: &S,
    session_id: i64,
    is_host: bool,
) -> Result<Participant, CoreError> {
    Ok(store.add_participant(session_id, is_host, now_utc()).await?)
}
