//! Member API handlers
//!
//! POST /api/membres            - register a member (alias: /api/send-membership-email)
//! GET  /api/membres            - list members
//! GET  /api/membres/{id}       - fetch one member
//! GET  /api/membres/{id}/carte - membership card PDF

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use shared::error::{AppError, AppResult};
use shared::models::MemberRegistration;

use crate::notify::template::card_filename;
use crate::registration::Delivery;
use crate::state::AppState;
use crate::store::StoreError;

const DELIVERY_WARNING: &str =
    "Membre créé mais l'email n'a pas pu être envoyé. Votre pass vous sera transmis autrement.";

fn store_failure(err: StoreError) -> AppError {
    tracing::error!(error = %err, "Record store failure");
    AppError::database()
}

// ── POST /api/membres ──

pub async fn create_member(
    State(state): State<AppState>,
    payload: Result<Json<MemberRegistration>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let Json(registration) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Unreadable registration body");
        AppError::invalid_request("Corps de requête JSON invalide")
    })?;

    let outcome = state.pipeline.register(registration).await?;
    let record = &outcome.record;

    let mut body = json!({
        "success": true,
        "message": "Membre créé avec succès",
        "memberId": record.id,
        "qrCode": record.qr_code_data,
        "emailSent": outcome.delivery.is_sent(),
    });
    if let Delivery::Failed { .. } = outcome.delivery {
        body["warning"] = json!(DELIVERY_WARNING);
    }

    Ok((StatusCode::CREATED, Json(body)))
}

// ── GET /api/membres ──

pub async fn list_members(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let members = state.store().list().await.map_err(store_failure)?;
    Ok(Json(json!({
        "success": true,
        "total": members.len(),
        "members": members,
    })))
}

// ── GET /api/membres/{id} ──

pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    match state.store().get(&id).await.map_err(store_failure)? {
        Some(member) => Ok(Json(json!({ "success": true, "member": member }))),
        None => {
            tracing::debug!(member_id = %id, "Member not found");
            Err(AppError::not_found("Membre"))
        }
    }
}

// ── GET /api/membres/{id}/carte ──

pub async fn member_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let record = state
        .store()
        .get(&id)
        .await
        .map_err(store_failure)?
        .ok_or_else(|| AppError::not_found("Membre"))?;

    let pdf = state.pipeline.render_card(&record).await.map_err(|e| {
        tracing::error!(member_id = %id, error = %e, "Membership card rendering failed");
        AppError::render()
    })?;

    let filename: String = card_filename(&record)
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    let disposition = format!("inline; filename=\"{filename}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}
