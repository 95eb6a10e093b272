//! Firestore record store via REST API (no SDK dependency)
//!
//! Each member is one document in the configured collection, keyed by
//! member id. Records are converted to Firestore typed values field by
//! field; nested objects become `mapValue`, arrays `arrayValue`.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{Map, Value, json};
use shared::models::MemberRecord;

use super::{MemberStore, StoreError, StoreResult};
use crate::config::FirestoreConfig;

const PAGE_SIZE: u32 = 300;
const MAX_DOCUMENT_ID_LEN: usize = 128;

pub struct FirestoreStore {
    client: reqwest::Client,
    documents_url: String,
    access_token: Option<String>,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            documents_url: format!(
                "{}/v1/projects/{}/databases/(default)/documents/{}",
                config.base_url.trim_end_matches('/'),
                config.project_id,
                config.collection
            ),
            access_token: config.access_token.clone(),
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// URL of the document `id`, or `None` when `id` cannot name a single
    /// document of the collection
    fn document_url(&self, id: &str) -> Option<String> {
        is_document_id(id).then(|| format!("{}/{}", self.documents_url, id))
    }
}

/// Member ids are UUIDs; anything outside `[A-Za-z0-9_-]` could address
/// another path of the database
fn is_document_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_DOCUMENT_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_'))
}

/// Turn a non-success response into a `StoreError::Backend`
async fn backend_error(resp: reqwest::Response) -> StoreError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    StoreError::Backend(format!("HTTP {status}: {body}"))
}

#[async_trait]
impl MemberStore for FirestoreStore {
    async fn create(&self, record: &MemberRecord) -> StoreResult<()> {
        if !is_document_id(&record.id) {
            return Err(StoreError::Backend(format!(
                "invalid document id: {:?}",
                record.id
            )));
        }
        let body = json!({ "fields": record_to_fields(record)? });
        let resp = self
            .request(Method::POST, &self.documents_url)
            .query(&[("documentId", record.id.as_str())])
            .json(&body)
            .send()
            .await?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(StoreError::Duplicate(record.id.clone())),
            _ => Err(backend_error(resp).await),
        }
    }

    async fn get(&self, id: &str) -> StoreResult<Option<MemberRecord>> {
        let Some(url) = self.document_url(id) else {
            tracing::debug!(member_id = %id, "Rejected malformed document id");
            return Ok(None);
        };
        let resp = self.request(Method::GET, &url).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let doc: Value = resp.json().await?;
                document_to_record(&doc).map(Some)
            }
            _ => Err(backend_error(resp).await),
        }
    }

    async fn list(&self) -> StoreResult<Vec<MemberRecord>> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page_size = PAGE_SIZE.to_string();
            let mut query = vec![("pageSize", page_size.as_str())];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let resp = self
                .request(Method::GET, &self.documents_url)
                .query(&query)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(backend_error(resp).await);
            }

            let page: Value = resp.json().await?;
            if let Some(docs) = page["documents"].as_array() {
                for doc in docs {
                    records.push(document_to_record(doc)?);
                }
            }

            match page["nextPageToken"].as_str() {
                Some(next) if !next.is_empty() => page_token = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(records)
    }

    async fn mark_email_delivered(&self, id: &str) -> StoreResult<()> {
        let url = self
            .document_url(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let body = json!({ "fields": { "emailEnvoye": { "booleanValue": true } } });
        let resp = self
            .request(Method::PATCH, &url)
            .query(&[
                ("updateMask.fieldPaths", "emailEnvoye"),
                ("currentDocument.exists", "true"),
            ])
            .json(&body)
            .send()
            .await?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(id.to_string())),
            _ => Err(backend_error(resp).await),
        }
    }

    fn backend(&self) -> &'static str {
        "firestore"
    }
}

// ── Typed value conversion ──

fn record_to_fields(record: &MemberRecord) -> StoreResult<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), to_firestore_value(v)))
            .collect()),
        _ => Err(StoreError::Backend("record is not a JSON object".into())),
    }
}

fn document_to_record(doc: &Value) -> StoreResult<MemberRecord> {
    let fields = doc["fields"]
        .as_object()
        .ok_or_else(|| StoreError::Backend("document has no fields".into()))?;
    let plain: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), from_firestore_value(v)))
        .collect();
    Ok(serde_json::from_value(Value::Object(plain))?)
}

fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // int64 travels as a decimal string
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(to_firestore_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({
            "mapValue": {
                "fields": map
                    .iter()
                    .map(|(k, v)| (k.clone(), to_firestore_value(v)))
                    .collect::<Map<_, _>>()
            }
        }),
    }
}

fn from_firestore_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "stringValue" | "booleanValue" | "doubleValue" | "timestampValue" | "referenceValue" => {
            inner.clone()
        }
        "integerValue" => match inner {
            Value::String(s) => s.parse::<i64>().map(Value::from).unwrap_or(Value::Null),
            other => other.clone(),
        },
        "arrayValue" => Value::Array(
            inner["values"]
                .as_array()
                .map(|items| items.iter().map(from_firestore_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner["fields"]
                .as_object()
                .map(|fields| {
                    fields
                        .iter()
                        .map(|(k, v)| (k.clone(), from_firestore_value(v)))
                        .collect()
                })
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::record;
    use axum::Router;
    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{Method as HttpMethod, Uri};
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[test]
    fn fields_use_typed_values() {
        let fields = record_to_fields(&record("abc")).unwrap();
        assert_eq!(fields["prenom"], json!({ "stringValue": "Jean" }));
        assert_eq!(fields["conditions"], json!({ "booleanValue": true }));
        assert_eq!(fields["emailEnvoye"], json!({ "booleanValue": false }));
        assert_eq!(
            fields["qrPayload"]["mapValue"]["fields"]["timestamp"],
            json!({ "integerValue": "1709287200000" })
        );
        assert!(!fields.contains_key("telephone"));
    }

    #[test]
    fn document_converts_back_to_record() {
        let original = record("abc");
        let doc = json!({
            "name": "projects/p/databases/(default)/documents/membres/abc",
            "fields": record_to_fields(&original).unwrap(),
            "createTime": "2024-03-01T10:00:00Z"
        });
        assert_eq!(document_to_record(&doc).unwrap(), original);
    }

    #[test]
    fn scalar_conversions() {
        assert_eq!(to_firestore_value(&json!(1.5)), json!({ "doubleValue": 1.5 }));
        assert_eq!(to_firestore_value(&json!(null)), json!({ "nullValue": null }));
        assert_eq!(
            to_firestore_value(&json!(["a"])),
            json!({ "arrayValue": { "values": [{ "stringValue": "a" }] } })
        );
        assert_eq!(from_firestore_value(&json!({ "integerValue": "42" })), json!(42));
        assert_eq!(from_firestore_value(&json!({ "arrayValue": {} })), json!([]));
        assert_eq!(from_firestore_value(&json!({ "unknown": 1 })), Value::Null);
    }

    fn config(base_url: &str) -> FirestoreConfig {
        FirestoreConfig {
            project_id: "fort-4nap".into(),
            access_token: None,
            base_url: base_url.into(),
            collection: "membres".into(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn document_url_includes_project_and_collection() {
        let store = FirestoreStore::new(&config("http://localhost:8080/")).unwrap();
        assert_eq!(
            store.document_url("abc").as_deref(),
            Some("http://localhost:8080/v1/projects/fort-4nap/databases/(default)/documents/membres/abc")
        );
    }

    #[test]
    fn ids_outside_the_collection_have_no_url() {
        let store = FirestoreStore::new(&config("http://localhost:8080")).unwrap();
        for id in ["../admins/root", "a/b", "..", "", "a?b", "a%2Fb", "a b"] {
            assert_eq!(store.document_url(id), None, "{id:?}");
        }
        assert!(store.document_url("0b7c6f0e-1d2a-4d53-9a51-2c8f3e9b7a10").is_some());
    }

    // ── REST contract against an in-process server ──

    #[derive(Debug, Clone)]
    struct Seen {
        method: HttpMethod,
        path: String,
        query: String,
        body: Value,
    }

    #[derive(Clone, Default)]
    struct Stub {
        replies: Arc<Mutex<VecDeque<(u16, Value)>>>,
        seen: Arc<Mutex<Vec<Seen>>>,
    }

    async fn answer(
        State(stub): State<Stub>,
        method: HttpMethod,
        uri: Uri,
        body: Bytes,
    ) -> (axum::http::StatusCode, axum::Json<Value>) {
        stub.seen.lock().await.push(Seen {
            method,
            path: uri.path().to_string(),
            query: uri.query().unwrap_or_default().to_string(),
            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        });
        let (status, reply) = stub
            .replies
            .lock()
            .await
            .pop_front()
            .unwrap_or((500, json!({ "error": "no scripted reply" })));
        (
            axum::http::StatusCode::from_u16(status).unwrap(),
            axum::Json(reply),
        )
    }

    /// Serve `replies` in order; returns the store and the request log
    async fn stub_store(replies: Vec<(u16, Value)>) -> (FirestoreStore, Stub) {
        let stub = Stub {
            replies: Arc::new(Mutex::new(replies.into())),
            ..Stub::default()
        };
        let app = Router::new().fallback(answer).with_state(stub.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let store = FirestoreStore::new(&config(&format!("http://{addr}"))).unwrap();
        (store, stub)
    }

    const COLLECTION_PATH: &str = "/v1/projects/fort-4nap/databases/(default)/documents/membres";

    fn document(id: &str) -> Value {
        json!({
            "name": format!("projects/fort-4nap/databases/(default)/documents/membres/{id}"),
            "fields": record_to_fields(&record(id)).unwrap()
        })
    }

    #[tokio::test]
    async fn create_posts_document_id_and_maps_conflict() {
        let (store, stub) = stub_store(vec![
            (200, document("abc")),
            (409, json!({ "error": { "status": "ALREADY_EXISTS" } })),
        ])
        .await;

        store.create(&record("abc")).await.unwrap();
        let err = store.create(&record("abc")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(id) if id == "abc"));

        let seen = stub.seen.lock().await;
        assert_eq!(seen[0].method, HttpMethod::POST);
        assert_eq!(seen[0].path, COLLECTION_PATH);
        assert_eq!(seen[0].query, "documentId=abc");
        assert_eq!(seen[0].body["fields"]["prenom"], json!({ "stringValue": "Jean" }));
    }

    #[tokio::test]
    async fn get_maps_missing_document_to_none() {
        let (store, stub) = stub_store(vec![
            (200, document("abc")),
            (404, json!({ "error": { "status": "NOT_FOUND" } })),
        ])
        .await;

        assert_eq!(store.get("abc").await.unwrap(), Some(record("abc")));
        assert_eq!(store.get("missing").await.unwrap(), None);

        let seen = stub.seen.lock().await;
        assert_eq!(seen[0].path, format!("{COLLECTION_PATH}/abc"));
        assert_eq!(seen[1].path, format!("{COLLECTION_PATH}/missing"));
    }

    #[tokio::test]
    async fn malformed_ids_never_reach_the_server() {
        let (store, stub) = stub_store(Vec::new()).await;

        assert_eq!(store.get("../admins/root").await.unwrap(), None);
        assert_eq!(store.get("a/b").await.unwrap(), None);
        assert!(matches!(
            store.mark_email_delivered("../admins/root").await,
            Err(StoreError::NotFound(_))
        ));
        assert!(store.create(&record("a/b")).await.is_err());
        assert!(stub.seen.lock().await.is_empty());
    }

    #[tokio::test]
    async fn list_follows_page_tokens() {
        let (store, stub) = stub_store(vec![
            (
                200,
                json!({ "documents": [document("a"), document("b")], "nextPageToken": "page-2" }),
            ),
            (200, json!({ "documents": [document("c")] })),
        ])
        .await;

        let ids: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let seen = stub.seen.lock().await;
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].query, "pageSize=300");
        assert_eq!(seen[1].query, "pageSize=300&pageToken=page-2");
    }

    #[tokio::test]
    async fn empty_collection_lists_nothing() {
        let (store, _stub) = stub_store(vec![(200, json!({}))]).await;
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mark_delivered_patches_only_the_flag() {
        let (store, stub) = stub_store(vec![
            (200, document("abc")),
            (404, json!({ "error": { "status": "NOT_FOUND" } })),
        ])
        .await;

        store.mark_email_delivered("abc").await.unwrap();
        assert!(matches!(
            store.mark_email_delivered("gone").await,
            Err(StoreError::NotFound(id)) if id == "gone"
        ));

        let seen = stub.seen.lock().await;
        assert_eq!(seen[0].method, HttpMethod::PATCH);
        assert_eq!(seen[0].path, format!("{COLLECTION_PATH}/abc"));
        assert_eq!(
            seen[0].query,
            "updateMask.fieldPaths=emailEnvoye&currentDocument.exists=true"
        );
        assert_eq!(
            seen[0].body,
            json!({ "fields": { "emailEnvoye": { "booleanValue": true } } })
        );
    }

    #[tokio::test]
    async fn server_errors_are_backend_errors() {
        let (store, _stub) = stub_store(vec![(503, json!({ "error": "unavailable" }))]).await;
        assert!(matches!(store.get("abc").await, Err(StoreError::Backend(_))));
    }
}
