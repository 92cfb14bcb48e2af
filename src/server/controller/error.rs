use crate::server::error::CoreError;
use crate::server::store::StoreError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{error, HttpResponse};
use derive_more::{Display, Error};
use log::error;

#[derive(Debug, Display, Error)]
pub(crate) enum CustomError {
    #[display("server is busy")]
    ServerIsBusy,
    #[display("invalid request")]
    BadRequest,
    #[display("database error")]
    DbError,
    #[display("timeout occurred")]
    Timeout,
    #[display("resource not found")]
    ResourceNotFound,
    #[display("permission denied")]
    PermissionDenied,
}

impl error::ResponseError for CustomError {
    fn status_code(&self) -> StatusCode {
        match *self {
            CustomError::DbError => StatusCode::INTERNAL_SERVER_ERROR,
            CustomError::ServerIsBusy => StatusCode::SERVICE_UNAVAILABLE,
            CustomError::BadRequest => StatusCode::BAD_REQUEST,
            CustomError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            CustomError::ResourceNotFound => StatusCode::NOT_FOUND,
            CustomError::PermissionDenied => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::html())
            .body(self.to_string())
    }
}

impl From<CoreError> for CustomError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NotFound => CustomError::ResourceNotFound,
            CoreError::PermissionDenied => CustomError::PermissionDenied,
            CoreError::InvalidArgument(_) => CustomError::BadRequest,
            CoreError::Store(StoreError::Unavailable) => CustomError::ServerIsBusy,
            CoreError::Store(StoreError::Db(db)) => {
                error!("storage failed, {}", db);
                CustomError::DbError
            }
        }
    }
}
