use crate::server::controller::error::CustomError;
use crate::server::ledger::{self, ClaimOutcome};
use crate::server::model::item::{
    ClaimRejectedResponse, ClaimRequest, ClaimResponse, GetSessionItemsResponse, ReleaseRequest,
    ReleaseResponse,
};
use crate::server::model::CommonRequestParams;
use crate::server::state::AppState;
use crate::server::store::SplitStore;
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse, Responder};
use anyhow::Context;

#[post("/v1/item/{id}/claim")]
/// Claim a quantity of one bill item; 409 with the live version on conflict
async fn claim_item(
    id: web::Path<i64>,
    body: web::Json<ClaimRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, CustomError> {
    let outcome = ledger::claim(data.store(), id.into_inner(), &body).await?;
    Ok(match outcome {
        ClaimOutcome::Applied { new_version } => HttpResponse::Ok().json(ClaimResponse {
            success: true,
            new_version,
        }),
        ClaimOutcome::VersionConflict { current_version } => {
            HttpResponse::Conflict().json(ClaimResponse {
                success: false,
                new_version: current_version,
            })
        }
        ClaimOutcome::ExceedsAvailable {
            requested,
            available,
        } => HttpResponse::UnprocessableEntity().json(ClaimRejectedResponse {
            reason: "QUANTITY_EXCEEDS_AVAILABLE",
            requested,
            available,
        }),
    })
}

#[delete("/v1/item/{id}/claim")]
/// Release a held claim; only the owner may release
async fn release_item(
    id: web::Path<i64>,
    body: web::Json<ReleaseRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let new_version = ledger::release(data.store(), id.into_inner(), body.participant_id).await?;
    Ok(web::Json(ReleaseResponse {
        success: true,
        new_version,
    }))
}

#[get("/v1/session/{id}/items")]
/// Current claim state of every line on the session's bill; the refetch
/// surface clients use after a version conflict
async fn get_session_items(
    id: web::Path<i64>,
    req: HttpRequest,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let maybe_queries = web::Query::<CommonRequestParams>::from_query(req.query_string())
        .context("failed to parse query string");
    let Ok(queries) = maybe_queries else {
        return Err(CustomError::BadRequest);
    };
    let CommonRequestParams { page, page_size } = queries.into_inner();
    let (page, page_size) = (page.unwrap_or(0) as i64, page_size.unwrap_or(20) as i64);

    let items = data
        .store()
        .session_items(id.into_inner(), page * page_size, page_size)
        .await
        .map_err(crate::server::error::CoreError::from)?;
    Ok(web::Json(GetSessionItemsResponse { items }))
}
