//! main file for the server

mod controller;
mod database;
mod error;
mod ledger;
pub mod model;
mod payment;
mod presence;
mod scheduler;
mod split;
mod state;
mod store;
mod util;

use crate::server::controller::claims::{claim_item, get_session_items, release_item};
use crate::server::controller::payment::{get_split_preview, validate_intent};
use crate::server::controller::presence::{heartbeat, join_session, leave};
use crate::server::database::pool::Pool;
use crate::server::model::config::ServerConfig;
use crate::server::state::AppState;
use crate::server::store::pg::PgStore;
use actix_web::{middleware::Logger, web, App, HttpServer};
use tokio_util::sync::CancellationToken;

pub(crate) const DB_TIMEOUT_SECONDS: u64 = 3;

/// Run the server
pub async fn run(config: ServerConfig) -> std::io::Result<()> {
    let read_pool = Pool::connect("read", config.db_read_conn_str.as_str())
        .await
        .map_err(std::io::Error::other)?;
    let write_pool = Pool::connect("write", config.db_write_conn_str.as_str())
        .await
        .map_err(std::io::Error::other)?;
    let pg_store = PgStore::new(read_pool, write_pool);

    let cancel_token = CancellationToken::new();
    let sweeper = tokio::spawn(scheduler::job::presence_sweeper(
        pg_store.clone(),
        cancel_token.clone(),
    ));

    #[cfg(not(test))]
    let state = web::Data::new(AppState::new(pg_store));
    #[cfg(test)]
    let state = web::Data::new(AppState::new(store::memory::MemStore::new()));
    let result = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .service(claim_item)
            .service(release_item)
            .service(get_session_items)
            .service(heartbeat)
            .service(leave)
            .service(join_session)
            .service(validate_intent)
            .service(get_split_preview)
    })
    .bind(config.addr)?
    .run()
    .await;

    cancel_token.cancel();
    sweeper.await.ok();
    result
}
