//! API routes

use axum::{
    Json, Router,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;

use crate::middleware::{auth_middleware, require_admin};
use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod billing;
pub mod check_in;
pub mod memberships;
pub mod notifications;
pub mod punch_cards;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/members", get(admin::list_members))
        .route("/plans", get(admin::list_plans).post(admin::create_plan))
        .route(
            "/plans/:id",
            put(admin::update_plan).delete(admin::delete_plan),
        )
        .route(
            "/punch-card-templates",
            get(admin::list_templates).post(admin::create_template),
        )
        .route(
            "/punch-card-templates/:id",
            put(admin::update_template).delete(admin::delete_template),
        )
        .route("/notifications", post(admin::create_notification))
        .route("/analytics", get(admin::analytics))
        .route_layer(middleware::from_fn(require_admin));

    let member_routes = Router::new()
        .route("/user", get(auth::current_user))
        .route("/check-in", post(check_in::check_in))
        .route("/check-ins", get(check_in::list_check_ins))
        .route(
            "/punch-cards",
            get(punch_cards::list_punch_cards).post(punch_cards::create_punch_card),
        )
        .route("/punch-cards/purchase", post(billing::purchase_punch_card))
        .route("/punch-cards/:id/use", post(punch_cards::use_punch))
        .route("/membership", get(memberships::current_membership))
        .route("/memberships/purchase", post(billing::purchase_membership))
        .route("/plans", get(memberships::list_plans))
        .route("/punch-card-templates", get(punch_cards::list_templates))
        .route("/payments", get(billing::list_payments))
        .route("/payments/:id/confirm", post(billing::confirm_payment))
        .route(
            "/payment-methods",
            get(billing::list_payment_methods).post(billing::create_payment_method),
        )
        .route("/payment-methods/:id", delete(billing::delete_payment_method))
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/:id/read", post(notifications::mark_read))
        .nest("/admin", admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .merge(member_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "membership-api"
    }))
}
