//! HTTP API

pub mod health;
pub mod members;
pub mod webhook;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use shared::error::{AppError, ErrorCode};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::registration::RegistrationError;
use crate::state::AppState;

/// Request body limit
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let members = Router::new()
        .route(
            "/api/membres",
            post(members::create_member).get(members::list_members),
        )
        .route("/api/send-membership-email", post(members::create_member))
        .route("/api/membres/{id}", get(members::get_member))
        .route("/api/membres/{id}/carte", get(members::member_card));

    let webhook = Router::new().route("/webhook/helloasso", post(webhook::handle_helloasso));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(members)
        .merge(webhook)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::with_message(ErrorCode::NotFound, "Page non trouvée")
}

impl From<RegistrationError> for AppError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(errors) => {
                tracing::debug!(count = errors.len(), "Registration rejected by validation");
                AppError::validation(ErrorCode::ValidationFailed.message())
                    .with_details(serde_json::json!(errors))
            }
            RegistrationError::Render { member_id, source } => {
                tracing::error!(member_id = %member_id, error = %source, "Membership card rendering failed");
                AppError::render()
            }
            RegistrationError::Persistence { member_id, source } => {
                tracing::error!(member_id = %member_id, error = %source, "Member record not persisted");
                AppError::database()
            }
        }
    }
}
