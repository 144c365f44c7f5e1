//! Registration, login, and session routes

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::{NewUser, UserResponse};
use crate::session::SESSION_COOKIE;
use crate::state::AppState;
use crate::validation::{validate_email, validate_name, validate_password};

/// Request for user registration
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Request for user login
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build()
}

/// Register a new member and start a session
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&payload.email).map_err(ApiError::Validation)?;
    validate_password(&payload.password).map_err(ApiError::Validation)?;
    validate_name("First name", &payload.first_name).map_err(ApiError::Validation)?;
    validate_name("Last name", &payload.last_name).map_err(ApiError::Validation)?;

    if state
        .user_repository
        .find_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Validation("Email is already registered".to_string()));
    }

    let user = state
        .user_repository
        .create(&NewUser {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
        })
        .await?;

    let token = state.session_manager.create_session(user.id).await?;

    info!("Registered new member {}", user.id);

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(token)),
        Json(UserResponse::from(user)),
    ))
}

/// Log a member in and start a session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !state.user_repository.verify_password(&user, &payload.password)? {
        return Err(ApiError::Unauthorized);
    }

    let token = state.session_manager.create_session(user.id).await?;

    info!("User {} logged in", user.id);

    Ok((
        StatusCode::OK,
        jar.add(session_cookie(token)),
        Json(UserResponse::from(user)),
    ))
}

/// Destroy the current session
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.session_manager.destroy(cookie.value()).await?;
    }

    Ok((
        jar.remove(Cookie::from(SESSION_COOKIE)),
        Json(json!({"message": "Logged out successfully"})),
    ))
}

/// Return the authenticated user
pub async fn current_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(current.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(UserResponse::from(user)))
}
