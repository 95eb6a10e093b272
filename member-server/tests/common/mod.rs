//! Shared helpers for the HTTP integration tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use member_server::notify::{DeliveryError, Mailer, Notifier, OutgoingMail, Sender};
use member_server::{AppState, MemberStore, RegistrationPipeline, api};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt;

/// Relay that keeps every message
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, _from: &Sender, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        self.sent.lock().await.push(mail.clone());
        Ok(())
    }
}

pub fn sender() -> Sender {
    Sender {
        name: "4nap - Fort Napoléon".into(),
        address: "noreply@4nap.fr".into(),
    }
}

pub fn app(store: Arc<dyn MemberStore>, relay: Option<Arc<dyn Mailer>>, temp: &Path) -> Router {
    let pipeline = RegistrationPipeline::new(store, Notifier::new(relay, sender()), temp);
    api::create_router(AppState::from_pipeline(pipeline, "test"))
}

pub fn jean() -> Value {
    json!({
        "prenom": "Jean",
        "nom": "Dupont",
        "email": "jean@test.fr",
        "adresse": "12 rue de la mer",
        "codePostal": "83500",
        "ville": "La Seyne",
        "pays": "France",
        "typeMembre": "annuel",
        "conditions": true
    })
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Status and raw body bytes
pub async fn send_raw(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

/// Status and JSON body (`Null` when the body is not JSON)
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send_raw(app, req).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// Decode the text held in a `data:image/png;base64,...` QR code
pub fn decode_qr_data_url(data_url: &str) -> String {
    let b64 = data_url
        .strip_prefix("data:image/png;base64,")
        .expect("PNG data URL");
    let png = base64::engine::general_purpose::STANDARD
        .decode(b64)
        .unwrap();
    let gray = image::load_from_memory(&png).unwrap().to_luma8();
    let (w, h) = gray.dimensions();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w as usize, h as usize, |x, y| {
        gray.get_pixel(x as u32, y as u32).0[0]
    });
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1, "one QR code in the image");
    grids[0].decode().unwrap().1
}

pub fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut d| d.next().is_none())
        .unwrap_or(true)
}
