use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

use crate::db;

/// Health check endpoint
///
/// Reports liveness plus database connectivity.
#[get("/health")]
pub async fn health(pool: web::Data<PgPool>) -> impl Responder {
    let db_ok = db::check_connection(&pool).await;

    HttpResponse::Ok().json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": if db_ok { "connected" } else { "disconnected" },
        "timestamp": Utc::now()
    }))
}
