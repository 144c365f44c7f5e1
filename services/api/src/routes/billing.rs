//! Purchase, payment, and payment method routes
//!
//! Purchases create a pending payment plus a provider payment intent;
//! entitlements are only granted when the payment is confirmed
//! (payment success activates the membership / creates the punch card).

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::models::billing::NewPaymentMethod;
use crate::models::{NewPayment, PaymentPurpose, PaymentStatus, User};
use crate::state::AppState;

/// Request to purchase a membership plan
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseMembershipRequest {
    pub plan_id: Uuid,
    pub payment_method_id: Option<Uuid>,
}

/// Request to purchase a punch card from a template
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasePunchCardRequest {
    pub template_id: Uuid,
    pub payment_method_id: Option<Uuid>,
}

/// Look up the provider customer for a user, creating it on first use.
async fn ensure_customer(state: &AppState, user: &User) -> ApiResult<String> {
    if let Some(customer_id) = &user.billing_customer_id {
        return Ok(customer_id.clone());
    }

    let name = format!("{} {}", user.first_name, user.last_name);
    let customer = state
        .billing_client
        .create_customer(&user.email, &name)
        .await
        .map_err(|e| ApiError::Provider(e.to_string()))?;

    state
        .user_repository
        .set_billing_customer(user.id, &customer.id)
        .await?;

    Ok(customer.id)
}

/// Resolve an optional stored payment method to its provider reference,
/// enforcing ownership.
async fn resolve_method(
    state: &AppState,
    current: &CurrentUser,
    method_id: Option<Uuid>,
) -> ApiResult<Option<String>> {
    let Some(method_id) = method_id else {
        return Ok(None);
    };

    let method = state
        .payment_method_repository
        .find_by_id(method_id)
        .await?
        .ok_or(ApiError::NotFound("Payment method"))?;

    if method.user_id != current.id {
        return Err(ApiError::Forbidden);
    }

    Ok(Some(method.provider_method_id))
}

/// Start a membership purchase
pub async fn purchase_membership(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<PurchaseMembershipRequest>,
) -> ApiResult<impl IntoResponse> {
    let plan = state
        .plan_repository
        .find_by_id(payload.plan_id)
        .await?
        .filter(|p| p.active)
        .ok_or(ApiError::NotFound("Membership plan"))?;

    let user = state
        .user_repository
        .find_by_id(current.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let customer_id = ensure_customer(&state, &user).await?;
    let provider_method = resolve_method(&state, &current, payload.payment_method_id).await?;

    let intent = state
        .billing_client
        .create_payment_intent(&customer_id, plan.price_cents, provider_method.as_deref())
        .await
        .map_err(|e| ApiError::Provider(e.to_string()))?;

    let payment = state
        .payment_repository
        .create_pending(&NewPayment {
            user_id: current.id,
            amount_cents: plan.price_cents,
            currency: state.billing_client.currency().to_string(),
            provider_intent_id: Some(intent.id),
            purpose: PaymentPurpose::Membership,
            reference_id: plan.id,
        })
        .await?;

    info!("User {} started membership purchase of plan {}", current.id, plan.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "payment": payment,
            "clientSecret": intent.client_secret,
        })),
    ))
}

/// Start a punch card purchase
pub async fn purchase_punch_card(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<PurchasePunchCardRequest>,
) -> ApiResult<impl IntoResponse> {
    let template = state
        .template_repository
        .find_by_id(payload.template_id)
        .await?
        .filter(|t| t.active)
        .ok_or(ApiError::NotFound("Punch card template"))?;

    let user = state
        .user_repository
        .find_by_id(current.id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let customer_id = ensure_customer(&state, &user).await?;
    let provider_method = resolve_method(&state, &current, payload.payment_method_id).await?;

    let intent = state
        .billing_client
        .create_payment_intent(&customer_id, template.price_cents, provider_method.as_deref())
        .await
        .map_err(|e| ApiError::Provider(e.to_string()))?;

    let payment = state
        .payment_repository
        .create_pending(&NewPayment {
            user_id: current.id,
            amount_cents: template.price_cents,
            currency: state.billing_client.currency().to_string(),
            provider_intent_id: Some(intent.id),
            purpose: PaymentPurpose::PunchCard,
            reference_id: template.id,
        })
        .await?;

    info!(
        "User {} started punch card purchase of template {}",
        current.id, template.id
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "payment": payment,
            "clientSecret": intent.client_secret,
        })),
    ))
}

/// Confirm a payment and grant the purchased entitlement
pub async fn confirm_payment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let payment = state
        .payment_repository
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Payment"))?;

    if payment.user_id != current.id {
        return Err(ApiError::Forbidden);
    }

    // Confirming twice must not grant the entitlement twice.
    if payment.status() == PaymentStatus::Succeeded {
        return Ok(Json(json!({ "payment": payment })));
    }

    // The entitlement is granted first and the status flipped last, so
    // a failed grant leaves the payment pending and the confirm
    // retryable instead of stranding a succeeded payment with nothing
    // granted.
    let body = match payment.purpose() {
        Some(PaymentPurpose::Membership) => {
            let plan = state
                .plan_repository
                .find_by_id(payment.reference_id)
                .await?
                .ok_or(ApiError::NotFound("Membership plan"))?;

            let membership = state
                .membership_repository
                .activate_for_plan(current.id, &plan)
                .await?;

            let payment = state
                .payment_repository
                .set_status(id, PaymentStatus::Succeeded)
                .await?
                .ok_or(ApiError::NotFound("Payment"))?;

            json!({ "payment": payment, "membership": membership })
        }
        Some(PaymentPurpose::PunchCard) => {
            let template = state
                .template_repository
                .find_by_id(payment.reference_id)
                .await?
                .ok_or(ApiError::NotFound("Punch card template"))?;

            let card = state
                .punch_card_repository
                .create_from_template(current.id, &template)
                .await?;

            let payment = state
                .payment_repository
                .set_status(id, PaymentStatus::Succeeded)
                .await?
                .ok_or(ApiError::NotFound("Payment"))?;

            json!({ "payment": payment, "punchCard": card })
        }
        None => {
            tracing::error!("payment {} has unknown purpose '{}'", payment.id, payment.purpose);
            return Err(ApiError::Internal);
        }
    };

    info!("Payment {} confirmed for user {}", id, current.id);

    Ok(Json(body))
}

/// List the member's payments
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let payments = state.payment_repository.list_by_user(current.id).await?;

    Ok(Json(payments))
}

/// List the member's stored payment methods
pub async fn list_payment_methods(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let methods = state
        .payment_method_repository
        .list_by_user(current.id)
        .await?;

    Ok(Json(methods))
}

/// Store a payment method
pub async fn create_payment_method(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<NewPaymentMethod>,
) -> ApiResult<impl IntoResponse> {
    if payload.provider_method_id.trim().is_empty() {
        return Err(ApiError::Validation(
            "Provider method id is required".to_string(),
        ));
    }

    let method = state
        .payment_method_repository
        .create(current.id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(method)))
}

/// Delete an owned payment method
pub async fn delete_payment_method(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let method = state
        .payment_method_repository
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Payment method"))?;

    if method.user_id != current.id {
        return Err(ApiError::Forbidden);
    }

    state.payment_method_repository.delete(id).await?;

    Ok(Json(json!({"message": "Payment method deleted"})))
}
