//! Punch card routes

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::NewPunchCard;
use crate::repositories::ConsumeError;
use crate::state::AppState;
use crate::validation::validate_new_punch_card;

/// List the member's punch cards
pub async fn list_punch_cards(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let cards = state.punch_card_repository.list_by_user(current.id).await?;

    Ok(Json(cards))
}

/// Create a punch card for the member
pub async fn create_punch_card(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<NewPunchCard>,
) -> ApiResult<impl IntoResponse> {
    validate_new_punch_card(&payload).map_err(ApiError::Validation)?;

    let card = state
        .punch_card_repository
        .create(current.id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(card)))
}

/// Consume one visit from an owned punch card
pub async fn use_punch(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let card = state
        .punch_card_repository
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Punch card"))?;

    if card.user_id != current.id {
        return Err(ApiError::Forbidden);
    }

    let updated = state
        .punch_card_repository
        .consume_one(id)
        .await
        .map_err(|e| match e {
            ConsumeError::NotFound => ApiError::NotFound("Punch card"),
            ConsumeError::NoRemainingPunches => ApiError::NoRemainingPunches,
            ConsumeError::Database(err) => {
                tracing::error!("failed to consume punch: {}", err);
                ApiError::Internal
            }
        })?;

    Ok(Json(updated))
}

/// List punch card templates on offer
pub async fn list_templates(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let templates = state.template_repository.list_active().await?;

    Ok(Json(templates))
}
