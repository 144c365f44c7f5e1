//! Membership routes

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Return the member's membership
pub async fn current_membership(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let membership = state
        .membership_repository
        .find_by_user(current.id)
        .await?
        .ok_or(ApiError::NotFound("Membership"))?;

    Ok(Json(membership))
}

/// List membership plans on offer
pub async fn list_plans(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let plans = state.plan_repository.list_active().await?;

    Ok(Json(plans))
}
