use crate::{
    auth::{
        AuthResponse, AuthenticatedUser, LoginRequest, PasswordChangeRequest,
        ProfileUpdateRequest, RegisterRequest,
    },
    error::AppError,
    users::UserDirectory,
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use serde_json::json;

/// Register a new user
///
/// Creates a new account and returns a session token with the public user.
#[post("/register")]
pub async fn register(
    users: web::Data<UserDirectory>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let session = users.register(register_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(AuthResponse {
        success: true,
        token: session.token,
        user: session.user,
    }))
}

/// Login user
///
/// Authenticates by email and password and returns a fresh session token.
#[post("/login")]
pub async fn login(
    users: web::Data<UserDirectory>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let session = users.authenticate(login_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        success: true,
        token: session.token,
        user: session.user,
    }))
}

/// Name and email of the caller.
#[get("/me")]
pub async fn me(
    users: web::Data<UserDirectory>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let profile = users.get_profile(caller).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "user": profile })))
}

#[put("/profile")]
pub async fn update_profile(
    users: web::Data<UserDirectory>,
    caller: AuthenticatedUser,
    profile_data: web::Json<ProfileUpdateRequest>,
) -> Result<impl Responder, AppError> {
    let user = users
        .update_profile(caller, profile_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": user
    })))
}

#[put("/password")]
pub async fn change_password(
    users: web::Data<UserDirectory>,
    caller: AuthenticatedUser,
    password_data: web::Json<PasswordChangeRequest>,
) -> Result<impl Responder, AppError> {
    users
        .change_password(caller, password_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password updated successfully"
    })))
}
