//! API error types and their HTTP mapping

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::checkin::CheckInError;

/// Errors surfaced by route handlers
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed input against the schema
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid session
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated user does not own the referenced entity
    #[error("Forbidden")]
    Forbidden,

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Neither an active membership nor a usable punch card at check-in
    #[error("No active membership or day passes. Please purchase a membership or day pass to check in.")]
    NoActiveEntitlement,

    /// Punch card exists but has no balance left
    #[error("No remaining punches on this card")]
    NoRemainingPunches,

    /// Payment provider failure; details stay in the logs
    #[error("Payment provider error: {0}")]
    Provider(String),

    /// Any other failure
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::NoActiveEntitlement
            | ApiError::NoRemainingPunches => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Provider(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal detail never goes over the wire.
        let message = match &self {
            ApiError::Provider(e) => {
                tracing::error!("payment provider error: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

impl From<CheckInError> for ApiError {
    fn from(err: CheckInError) -> Self {
        match err {
            CheckInError::NoActiveEntitlement => ApiError::NoActiveEntitlement,
            CheckInError::NoRemainingPunches => ApiError::NoRemainingPunches,
            CheckInError::NotFound => ApiError::NotFound("Punch card"),
            CheckInError::Store(e) => {
                tracing::error!("check-in store error: {:?}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("unexpected error: {:?}", err);
        ApiError::Internal
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_taxonomy() {
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotFound("Punch card").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::NoActiveEntitlement.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NoRemainingPunches.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_failures_collapse_to_internal() {
        let err = ApiError::from(anyhow::anyhow!("connection refused"));
        assert!(matches!(err, ApiError::Internal));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn no_entitlement_message_tells_user_to_purchase() {
        let message = ApiError::NoActiveEntitlement.to_string();
        assert!(message.contains("purchase"));
    }

    #[test]
    fn check_in_errors_map_onto_api_errors() {
        assert!(matches!(
            ApiError::from(CheckInError::NoActiveEntitlement),
            ApiError::NoActiveEntitlement
        ));
        assert!(matches!(
            ApiError::from(CheckInError::NoRemainingPunches),
            ApiError::NoRemainingPunches
        ));
        assert!(matches!(
            ApiError::from(CheckInError::NotFound),
            ApiError::NotFound("Punch card")
        ));
    }
}
