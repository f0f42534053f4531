pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::state::AppState;

/// Turns unreadable JSON bodies into the usual 400 validation response.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("rejected request body: {}", err);
    AppError::ValidationError("Invalid request body".into()).into()
}

/// Everything an `App` serves: the shared services, `/health`, and the guarded `/api` scope.
///
/// The server binary and the integration tests both build their app through this, so the
/// routes under test are the routes in production. Outer middleware (CORS, access log) is
/// left to the caller.
pub fn configure_app(cfg: &mut web::ServiceConfig, state: &AppState) {
    state.configure(cfg);
    cfg.service(health::health).service(
        web::scope("/api")
            .wrap(AuthMiddleware)
            .configure(config),
    );
}

/// Registers every `/api` route. Mount it inside a scope wrapped with `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(auth::register)
        .service(auth::login)
        .service(auth::me)
        .service(auth::update_profile)
        .service(auth::change_password)
        .service(
            web::scope("/tasks")
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
