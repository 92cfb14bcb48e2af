use serde::{Deserialize, Serialize};

/// One claimable line on a shared bill. `version` is bumped on every
/// successful mutation and is the compare-and-swap token for claims.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct BillItem {
    pub id: i64,
    pub session_id: i64,
    pub unit_price_cents: i64,
    pub total_quantity: i32,
    pub claimed_quantity: i32,
    pub claimed_by: Option<i64>,
    pub version: i64,
}

impl BillItem {
    /// Price of the whole line, independent of claim state.
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.total_quantity as i64
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClaimRequest {
    pub participant_id: i64,
    pub quantity: i32,
    pub expected_version: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClaimResponse {
    pub success: bool,
    pub new_version: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ClaimRejectedResponse {
    pub reason: &'static str,
    pub requested: i32,
    pub available: i32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReleaseRequest {
    pub participant_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReleaseResponse {
    pub success: bool,
    pub new_version: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetSessionItemsResponse {
    pub items: Vec<BillItem>,
}
