//! Admin routes: member listing, pricing management, notifications,
//! and dashboard analytics

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::UserResponse;
use crate::models::membership::PlanPayload;
use crate::models::notification::NewNotification;
use crate::models::punch_card::TemplatePayload;
use crate::state::AppState;

/// List all users
pub async fn list_members(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = state.user_repository.list_all().await?;
    let members: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(Json(members))
}

/// List all membership plans, including retired ones
pub async fn list_plans(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let plans = state.plan_repository.list_all().await?;

    Ok(Json(plans))
}

/// Create a membership plan
pub async fn create_plan(
    State(state): State<AppState>,
    Json(payload): Json<PlanPayload>,
) -> ApiResult<impl IntoResponse> {
    validate_plan(&payload)?;

    let plan = state.plan_repository.create(&payload).await?;

    Ok((StatusCode::CREATED, Json(plan)))
}

/// Update a membership plan
pub async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlanPayload>,
) -> ApiResult<impl IntoResponse> {
    validate_plan(&payload)?;

    let plan = state
        .plan_repository
        .update(id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Membership plan"))?;

    Ok(Json(plan))
}

/// Delete a membership plan
pub async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if !state.plan_repository.delete(id).await? {
        return Err(ApiError::NotFound("Membership plan"));
    }

    Ok(Json(json!({"message": "Plan deleted"})))
}

/// List all punch card templates
pub async fn list_templates(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let templates = state.template_repository.list_all().await?;

    Ok(Json(templates))
}

/// Create a punch card template
pub async fn create_template(
    State(state): State<AppState>,
    Json(payload): Json<TemplatePayload>,
) -> ApiResult<impl IntoResponse> {
    validate_template(&payload)?;

    let template = state.template_repository.create(&payload).await?;

    Ok((StatusCode::CREATED, Json(template)))
}

/// Update a punch card template
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TemplatePayload>,
) -> ApiResult<impl IntoResponse> {
    validate_template(&payload)?;

    let template = state
        .template_repository
        .update(id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Punch card template"))?;

    Ok(Json(template))
}

/// Delete a punch card template
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if !state.template_repository.delete(id).await? {
        return Err(ApiError::NotFound("Punch card template"));
    }

    Ok(Json(json!({"message": "Template deleted"})))
}

/// Create a notification, targeted or broadcast
pub async fn create_notification(
    State(state): State<AppState>,
    Json(payload): Json<NewNotification>,
) -> ApiResult<impl IntoResponse> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }

    let notification = state.notification_repository.create(&payload).await?;

    Ok((StatusCode::CREATED, Json(notification)))
}

/// Dashboard summary figures
pub async fn analytics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let summary = state.analytics_repository.summary().await?;

    Ok(Json(summary))
}

fn validate_plan(payload: &PlanPayload) -> ApiResult<()> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }
    if payload.price_cents < 0 {
        return Err(ApiError::Validation("Price must not be negative".to_string()));
    }
    if payload.duration_days <= 0 {
        return Err(ApiError::Validation(
            "Duration must be at least one day".to_string(),
        ));
    }

    Ok(())
}

fn validate_template(payload: &TemplatePayload) -> ApiResult<()> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Name is required".to_string()));
    }
    if payload.punches <= 0 {
        return Err(ApiError::Validation(
            "Punches must be greater than zero".to_string(),
        ));
    }
    if payload.price_cents < 0 {
        return Err(ApiError::Validation("Price must not be negative".to_string()));
    }

    Ok(())
}
