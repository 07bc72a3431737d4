//! Client-side token handling tests against an in-process stub API.
//!
//! These spin a real actix server on an ephemeral port, so they run
//! without any external services.

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

use donelist::auth::TokenPair;
use donelist::client::{ApiClient, ClientError};

struct StubApi {
    addr: SocketAddr,
    task_calls: web::Data<AtomicUsize>,
    refresh_calls: web::Data<AtomicUsize>,
}

async fn tasks_handler(req: HttpRequest, calls: web::Data<AtomicUsize>) -> HttpResponse {
    calls.fetch_add(1, Ordering::SeqCst);
    let auth = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if auth == "Bearer good-access" {
        HttpResponse::Ok().json(json!({ "items": [], "total": 0, "limit": 20, "offset": 0 }))
    } else {
        HttpResponse::Unauthorized().json(json!({ "error": "Invalid token" }))
    }
}

async fn refresh_handler(
    body: web::Json<serde_json::Value>,
    calls: web::Data<AtomicUsize>,
) -> HttpResponse {
    calls.fetch_add(1, Ordering::SeqCst);
    if body["refresh_token"] == "valid-refresh" {
        HttpResponse::Ok().json(json!({
            "access_token": "good-access",
            "refresh_token": "valid-refresh-2",
            "token_type": "bearer"
        }))
    } else {
        HttpResponse::Unauthorized().json(json!({ "error": "Invalid refresh token" }))
    }
}

async fn always_unauthorized(calls: web::Data<AtomicUsize>) -> HttpResponse {
    calls.fetch_add(1, Ordering::SeqCst);
    HttpResponse::Unauthorized().json(json!({ "error": "Invalid token" }))
}

async fn start_stub() -> StubApi {
    let task_calls = web::Data::new(AtomicUsize::new(0));
    let refresh_calls = web::Data::new(AtomicUsize::new(0));

    let server = {
        let task_calls = task_calls.clone();
        let refresh_calls = refresh_calls.clone();
        HttpServer::new(move || {
            App::new()
                .app_data(task_calls.clone())
                .route("/api/tasks", web::get().to(tasks_handler))
                .service(
                    web::resource("/api/locked")
                        .app_data(task_calls.clone())
                        .route(web::get().to(always_unauthorized)),
                )
                .service(
                    web::resource("/api/auth/refresh")
                        .app_data(refresh_calls.clone())
                        .route(web::post().to(refresh_handler)),
                )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("failed to bind stub server")
    };
    let addr = server.addrs()[0];
    actix_rt::spawn(server.run());

    StubApi {
        addr,
        task_calls,
        refresh_calls,
    }
}

fn stale_pair() -> TokenPair {
    TokenPair {
        access_token: "stale-access".into(),
        refresh_token: "valid-refresh".into(),
        token_type: "bearer".into(),
    }
}

#[actix_rt::test]
async fn test_client_refreshes_once_and_retries() {
    let stub = start_stub().await;
    let client = ApiClient::new(&format!("http://{}", stub.addr));
    client.set_tokens(stale_pair());

    let resp = client.get("/api/tasks").await.expect("request failed");
    assert!(resp.status().is_success());

    // One rejected attempt, one refresh, one successful retry.
    assert_eq!(stub.task_calls.load(Ordering::SeqCst), 2);
    assert_eq!(stub.refresh_calls.load(Ordering::SeqCst), 1);

    // The rotated pair replaced the stale one.
    let tokens = client.tokens().expect("tokens should be present");
    assert_eq!(tokens.access_token, "good-access");
    assert_eq!(tokens.refresh_token, "valid-refresh-2");
}

#[actix_rt::test]
async fn test_client_failed_refresh_clears_tokens() {
    let stub = start_stub().await;
    let client = ApiClient::new(&format!("http://{}", stub.addr));
    client.set_tokens(TokenPair {
        access_token: "stale-access".into(),
        refresh_token: "revoked-refresh".into(),
        token_type: "bearer".into(),
    });

    let err = client.get("/api/tasks").await.unwrap_err();
    assert!(matches!(err, ClientError::AuthRequired));
    assert!(client.tokens().is_none(), "stale pair must be discarded");

    // No retry happened after the failed refresh.
    assert_eq!(stub.task_calls.load(Ordering::SeqCst), 1);
    assert_eq!(stub.refresh_calls.load(Ordering::SeqCst), 1);
}

#[actix_rt::test]
async fn test_client_retries_at_most_once() {
    let stub = start_stub().await;
    let client = ApiClient::new(&format!("http://{}", stub.addr));
    client.set_tokens(stale_pair());

    // The endpoint rejects even refreshed credentials; the second 401 is
    // returned rather than looping.
    let resp = client.get("/api/locked").await.expect("request failed");
    assert_eq!(resp.status().as_u16(), 401);
    assert_eq!(stub.task_calls.load(Ordering::SeqCst), 2);
    assert_eq!(stub.refresh_calls.load(Ordering::SeqCst), 1);
}

#[actix_rt::test]
async fn test_client_rejects_without_tokens() {
    let stub = start_stub().await;
    let client = ApiClient::new(&format!("http://{}", stub.addr));

    let err = client.get("/api/tasks").await.unwrap_err();
    assert!(matches!(err, ClientError::AuthRequired));
    assert_eq!(stub.task_calls.load(Ordering::SeqCst), 0);
}
