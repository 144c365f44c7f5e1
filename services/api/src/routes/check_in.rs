//! Check-in routes

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::checkin::CheckInOutcome;
use crate::error::ApiResult;
use crate::middleware::CurrentUser;
use crate::models::CheckInMethod;
use crate::state::AppState;

/// Request body for a check-in; an empty body means a QR check-in with
/// no location.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub location: Option<String>,
    pub method: Option<CheckInMethod>,
}

/// Check the member in, consuming a day pass before falling back to the
/// membership.
pub async fn check_in(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    payload: Option<Json<CheckInRequest>>,
) -> ApiResult<impl IntoResponse> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let method = payload.method.unwrap_or(CheckInMethod::Qr);

    let outcome = state
        .check_in_resolver
        .check_in(current.id, payload.location, method)
        .await?;

    let body = match outcome {
        CheckInOutcome::DayPassUsed {
            check_in,
            remaining_visits,
            package_name,
        } => json!({
            "checkIn": check_in,
            "message": format!(
                "Checked in with day pass '{}'. {} visits remaining.",
                package_name, remaining_visits
            ),
            "dayPassUsed": true,
            "remainingVisits": remaining_visits,
            "packageName": package_name,
        }),
        CheckInOutcome::MembershipUsed { check_in } => json!({
            "checkIn": check_in,
            "message": "Checked in successfully",
            "membershipUsed": true,
        }),
    };

    Ok((StatusCode::CREATED, Json(body)))
}

/// List the member's check-in history
pub async fn list_check_ins(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let check_ins = state.check_in_repository.list_by_user(current.id).await?;

    Ok(Json(check_ins))
}
