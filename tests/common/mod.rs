#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, App};
use serde_json::{json, Value};
use taskledger::auth::AuthResponse;
use taskledger::routes;
use taskledger::AppState;

pub const TEST_SECRET: &str = "integration_test_secret_0123456789abcdef";

/// Lowest bcrypt cost, keeps the suite fast.
pub const TEST_COST: u32 = 4;

pub fn test_state() -> AppState {
    AppState::in_memory(TEST_SECRET, TEST_COST)
}

pub async fn init_app(
    state: &AppState,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    let state = state.clone();
    test::init_service(
        App::new()
            .configure(move |cfg| routes::configure_app(cfg, &state))
            .wrap(Logger::default()),
    )
    .await
}

/// Sends a request and returns status plus the parsed JSON body (`Null` when empty).
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: test::TestRequest,
) -> (StatusCode, Value) {
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            panic!(
                "non-JSON body ({}): {:?}",
                e,
                String::from_utf8_lossy(&body)
            )
        })
    };
    (status, json)
}

pub fn authed(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.append_header((header::AUTHORIZATION, format!("Bearer {}", token)))
}

pub async fn register(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    password: &str,
) -> AuthResponse {
    let req = test::TestRequest::post().uri("/api/register").set_json(json!({
        "name": name,
        "email": email,
        "password": password
    }));
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
    serde_json::from_value(body).expect("Failed to parse registration response")
}
