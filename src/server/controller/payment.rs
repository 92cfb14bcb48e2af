use crate::server::controller::error::CustomError;
use crate::server::error::CoreError;
use crate::server::model::payment::{
    GetSplitPreviewResponse, PaymentIntent, ValidationAcceptedResponse,
};
use crate::server::payment::{self, Rejection, Verdict};
use crate::server::split;
use crate::server::state::AppState;
use crate::server::store::SplitStore;
use actix_web::{get, post, web, HttpResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ValidationRejectedResponse {
    accepted: bool,
    #[serde(flatten)]
    rejection: Rejection,
}

#[post("/v1/payment/validate")]
/// Re-verify a proposed payment amount against live claim/presence state
async fn validate_intent(
    body: web::Json<PaymentIntent>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let verdict = payment::validate(data.store(), &body).await?;
    Ok(match verdict {
        Verdict::Accepted => {
            HttpResponse::Ok().json(ValidationAcceptedResponse { accepted: true })
        }
        Verdict::Rejected(rejection) => {
            HttpResponse::UnprocessableEntity().json(ValidationRejectedResponse {
                accepted: false,
                rejection,
            })
        }
    })
}

#[get("/v1/session/{id}/split")]
/// Authoritative equal-split preview: bill total from the ledger, shares from
/// the same ordering the validator trusts
async fn get_split_preview(
    id: web::Path<i64>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let session_id = id.into_inner();
    let store = data.store();
    let items = store
        .session_items(session_id, 0, i64::MAX)
        .await
        .map_err(CoreError::from)?;
    let bill_total_cents = items.iter().map(|i| i.line_total_cents()).sum::<i64>();
    let participants = store
        .active_participants(session_id)
        .await
        .map_err(CoreError::from)?;

    let participant_count = participants.len() as u32;
    let result = split::compute_split(bill_total_cents, participant_count)?;
    let shares = split::shares(bill_total_cents, participants)?;
    Ok(HttpResponse::Ok().json(GetSplitPreviewResponse {
        bill_total_cents,
        participant_count,
        base_amount_cents: result.base_amount_cents,
        remainder_cents: result.remainder_cents,
        shares,
    }))
}
