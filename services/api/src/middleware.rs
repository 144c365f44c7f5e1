//! Session authentication middleware
//!
//! Authentication is modeled as an injected current-user capability:
//! the middleware resolves the session cookie and places a `CurrentUser`
//! in the request extensions, and handlers take it from there. Nothing
//! downstream touches the cookie or Redis.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::error;
use uuid::Uuid;

use crate::{error::ApiError, models::UserRole, session::SESSION_COOKIE, state::AppState};

/// Authenticated user resolved from the session cookie
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Resolve the session cookie into a `CurrentUser` extension
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(ApiError::Unauthorized)?;

    let user_id = state
        .session_manager
        .resolve(&token)
        .await
        .map_err(|e| {
            error!("failed to resolve session: {:?}", e);
            ApiError::Internal
        })?
        .ok_or(ApiError::Unauthorized)?;

    let user = state
        .user_repository
        .find_by_id(user_id)
        .await
        .map_err(|e| {
            error!("failed to load session user: {:?}", e);
            ApiError::Internal
        })?
        .ok_or(ApiError::Unauthorized)?;

    let current = CurrentUser {
        id: user.id,
        role: user.role(),
    };
    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}

/// Reject non-admin users; layered inside `auth_middleware`
pub async fn require_admin(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let current = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(ApiError::Unauthorized)?;

    if !current.is_admin() {
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_role_is_admin() {
        let id = Uuid::new_v4();
        assert!(CurrentUser { id, role: UserRole::Admin }.is_admin());
        assert!(!CurrentUser { id, role: UserRole::Member }.is_admin());
        assert!(!CurrentUser { id, role: UserRole::Staff }.is_admin());
    }
}
