//! HelloAsso webhook handler
//!
//! POST /webhook/helloasso - an "Order" notification registers the payer as
//! a member. Always answers 200 so the provider does not retry, except when
//! the registration fails internally.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use shared::error::{AppError, AppResult};
use shared::models::MemberRegistration;

use crate::registration::RegistrationError;
use crate::state::AppState;

const DEFAULT_MEMBERSHIP_TYPE: &str = "annuel";
const DEFAULT_COUNTRY: &str = "France";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Notification {
    #[serde(default)]
    event_type: String,
    #[serde(default)]
    data: Option<OrderData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OrderData {
    payer: Option<Payer>,
    items: Vec<OrderItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Payer {
    email: String,
    first_name: String,
    last_name: String,
    address: String,
    city: String,
    zip_code: String,
    country: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OrderItem {
    name: String,
}

impl OrderData {
    /// Registration for the payer; payment implies accepted conditions
    fn to_registration(&self) -> Option<MemberRegistration> {
        let payer = self.payer.as_ref()?;
        let type_membre = self
            .items
            .first()
            .map(|item| item.name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_MEMBERSHIP_TYPE);
        let pays = match payer.country.trim() {
            "" | "FRA" | "FR" => DEFAULT_COUNTRY,
            other => other,
        };

        Some(MemberRegistration {
            prenom: payer.first_name.clone(),
            nom: payer.last_name.clone(),
            email: payer.email.clone(),
            telephone: None,
            adresse: payer.address.clone(),
            code_postal: payer.zip_code.clone(),
            ville: payer.city.clone(),
            pays: pays.to_string(),
            type_membre: type_membre.to_string(),
            conditions: true,
        })
    }
}

fn ignored(reason: &str) -> Json<Value> {
    Json(json!({ "success": true, "processed": false, "ignored": true, "reason": reason }))
}

pub async fn handle_helloasso(State(state): State<AppState>, body: Bytes) -> AppResult<Json<Value>> {
    let notification: Notification = match serde_json::from_slice(&body) {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(%e, "Failed to parse HelloAsso webhook JSON");
            return Ok(ignored("invalid payload"));
        }
    };

    tracing::info!(event_type = %notification.event_type, "Received HelloAsso webhook");
    if notification.event_type != "Order" {
        return Ok(ignored("unhandled event type"));
    }

    let Some(registration) = notification
        .data
        .as_ref()
        .and_then(OrderData::to_registration)
    else {
        tracing::warn!("HelloAsso order without payer");
        return Ok(ignored("missing payer"));
    };

    match state.pipeline.register(registration).await {
        Ok(outcome) => {
            tracing::info!(member_id = %outcome.record.id, "Member registered from HelloAsso order");
            Ok(Json(json!({
                "success": true,
                "processed": true,
                "memberId": outcome.record.id,
                "emailSent": outcome.delivery.is_sent(),
            })))
        }
        Err(RegistrationError::Validation(errors)) => {
            let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
            tracing::warn!(?fields, "HelloAsso payer data failed validation");
            Ok(ignored("invalid payer data"))
        }
        Err(e) => Err(AppError::from(e)),
    }
}
