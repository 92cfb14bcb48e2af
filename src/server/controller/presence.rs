use crate::server::controller::error::CustomError;
use crate::server::model::participant::{
    JoinSessionRequest, JoinSessionResponse, ParticipantView, PresenceResponse,
};
use crate::server::presence;
use crate::server::state::AppState;
use crate::server::util::time::format_ts;
use actix_web::{post, web, Responder};
use log::info;

#[post("/v1/participant/{id}/heartbeat")]
async fn heartbeat(
    id: web::Path<i64>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let seen_at = presence::heartbeat(data.store(), id.into_inner()).await?;
    Ok(web::Json(PresenceResponse {
        timestamp: format_ts(seen_at),
    }))
}

#[post("/v1/participant/{id}/leave")]
async fn leave(
    id: web::Path<i64>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let left_at = presence::leave(data.store(), id.into_inner()).await?;
    Ok(web::Json(PresenceResponse {
        timestamp: format_ts(left_at),
    }))
}

#[post("/v1/session/{id}/participants")]
/// A diner joins the table session
async fn join_session(
    id: web::Path<i64>,
    body: web::Json<JoinSessionRequest>,
    data: web::Data<AppState>,
) -> Result<impl Responder, CustomError> {
    let participant = presence::join_session(data.store(), id.into_inner(), body.is_host).await?;
    info!(
        "participant={} joined session={} host={}",
        participant.id, participant.session_id, participant.is_host
    );
    Ok(web::Json(JoinSessionResponse {
        participant: ParticipantView::from(&participant),
    }))
}
