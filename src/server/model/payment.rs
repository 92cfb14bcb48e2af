use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum SplitMethod {
    /// Equal split over whoever is active right now; strictly re-validated.
    DynamicEqual,
    /// Pay for your claimed items.
    ByItem,
    /// Free-form amount agreed at the table.
    Custom,
}

/// Transient validation request; never persisted.
#[derive(Debug, Deserialize)]
pub(crate) struct PaymentIntent {
    pub session_id: i64,
    pub participant_id: i64,
    pub amount_cents: i64,
    pub split_method: SplitMethod,
    pub expected_participant_count: Option<u32>,
    pub bill_total_cents: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ValidationAcceptedResponse {
    pub accepted: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetSplitPreviewResponse {
    pub bill_total_cents: i64,
    pub participant_count: u32,
    pub base_amount_cents: i64,
    pub remainder_cents: i64,
    pub shares: Vec<crate::server::split::Share>,
}
