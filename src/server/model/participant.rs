use crate::server::util::time::format_ts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A diner in a table session. Never hard-deleted while the session is open;
/// `is_active` flips on leave or heartbeat timeout.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Participant {
    pub id: i64,
    pub session_id: i64,
    pub is_host: bool,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl Participant {
    /// The single authoritative ordering for remainder assignment: hosts
    /// before guests, then earliest join, then id so the order stays total
    /// even when two devices report the same join instant.
    pub fn canonical_cmp(a: &Participant, b: &Participant) -> Ordering {
        b.is_host
            .cmp(&a.is_host)
            .then_with(|| a.joined_at.cmp(&b.joined_at))
            .then_with(|| a.id.cmp(&b.id))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ParticipantView {
    pub id: i64,
    pub session_id: i64,
    pub is_host: bool,
    pub is_active: bool,
    pub joined_at: String,
    pub last_seen_at: String,
}

impl From<&Participant> for ParticipantView {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id,
            session_id: p.session_id,
            is_host: p.is_host,
            is_active: p.is_active,
            joined_at: format_ts(p.joined_at),
            last_seen_at: format_ts(p.last_seen_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct JoinSessionRequest {
    #[serde(default)]
    pub is_host: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct JoinSessionResponse {
    pub participant: ParticipantView,
}

#[derive(Debug, Serialize)]
pub(crate) struct PresenceResponse {
    pub timestamp: String,
}
