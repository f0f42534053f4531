use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::db::StorageBackend;

/// Liveness probe, mounted outside `/api` so it never needs a token.
///
/// Besides the status it reports the crate version and which store the server was started
/// with, so a deployment that silently fell back to memory is visible from outside.
#[get("/health")]
pub async fn health(storage: web::Data<StorageBackend>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": *storage.get_ref(),
        "timestamp": Utc::now()
    }))
}
