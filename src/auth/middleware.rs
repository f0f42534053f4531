use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::{extractors::AuthenticatedUser, token::TokenService};
use crate::error::AppError;

/// Routes under the guarded scope that do not require a token.
pub const PUBLIC_PATHS: &[&str] = &["/api/register", "/api/login"];

/// Gate in front of every protected route.
///
/// Reads `Authorization: Bearer <token>`, verifies it with the `TokenService` registered as
/// app data and stores the resolved `AuthenticatedUser` in the request extensions.
/// Requests without a valid token never reach the handler; they are answered with a 401
/// JSON body right here.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

/// Pulls the token out of an `Authorization` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| AppError::Unauthorized("Not authorized, token missing".into()))?;

    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::InternalServerError("TokenService is not registered".into()))?;

    let user_id = tokens.verify(token)?;
    Ok(AuthenticatedUser::new(user_id))
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !PUBLIC_PATHS.contains(&req.path()) {
            match authenticate(&req) {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                }
                Err(app_err) => {
                    log::debug!("rejected {} {}: {}", req.method(), req.path(), app_err);
                    let res = req.error_response(app_err).map_into_right_body();
                    return Box::pin(async move { Ok(res) });
                }
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{
        call_and_read_body, call_service, init_service, read_body_json, TestRequest,
    };
    use actix_web::{get, http::StatusCode, App, HttpResponse, Responder};
    use uuid::Uuid;

    const SECRET: &str = "middleware_test_secret_0123456789abcdef";

    #[get("/whoami")]
    async fn whoami(user: AuthenticatedUser) -> impl Responder {
        HttpResponse::Ok().body(user.user_id().to_string())
    }

    #[get("/login")]
    async fn open() -> impl Responder {
        HttpResponse::Ok().finish()
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc.def"), None);
    }

    #[actix_rt::test]
    async fn test_guard_accepts_valid_token_and_rejects_others() {
        let tokens = TokenService::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = tokens.issue(user_id).unwrap();

        let app = init_service(
            App::new().app_data(web::Data::new(tokens)).service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .service(whoami)
                    .service(open),
            ),
        )
        .await;

        let req = TestRequest::get()
            .uri("/api/whoami")
            .append_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let body = call_and_read_body(&app, req).await;
        assert_eq!(body, user_id.to_string());

        let req = TestRequest::get().uri("/api/whoami").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = read_body_json(resp).await;
        assert_eq!(json["success"], false);

        let req = TestRequest::get()
            .uri("/api/whoami")
            .append_header((header::AUTHORIZATION, "Bearer garbage"))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = TestRequest::get().uri("/api/login").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
