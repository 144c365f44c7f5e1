//! Notification routes

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// List notifications visible to the member
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let notifications = state
        .notification_repository
        .list_for_user(current.id)
        .await?;

    Ok(Json(notifications))
}

/// Mark a notification (targeted or broadcast) as read for the member
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let notification = state
        .notification_repository
        .mark_read(id, current.id)
        .await?
        .ok_or(ApiError::NotFound("Notification"))?;

    Ok(Json(notification))
}
