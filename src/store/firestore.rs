use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Number, Value};

use crate::error::SchwabError;
use crate::gcp::AccessTokenSource;

use super::{Document, DocumentRef, DocumentStore};

/// Cloud Firestore over its REST API.
pub struct FirestoreStore {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    database: String,
    auth: Arc<dyn AccessTokenSource>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreStore {
    pub fn new(
        base_url: &str,
        project_id: &str,
        database: &str,
        auth: Arc<dyn AccessTokenSource>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            database: database.to_string(),
            auth,
        }
    }

    fn document_url(&self, doc: &DocumentRef) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents/{}/{}",
            self.base_url, self.project_id, self.database, doc.collection, doc.document
        )
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn read_document(&self, doc: &DocumentRef) -> Result<Option<Document>, SchwabError> {
        let token = self.auth.access_token().await?;
        let url = self.document_url(doc);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| doc.store_error(format!("request failed: {e}")))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(doc.store_error(format!("status {status}: {body}")));
        }

        let document: FirestoreDocument = resp
            .json()
            .await
            .map_err(|e| doc.store_error(format!("unexpected response: {e}")))?;
        let body = decode_fields(&document.fields).map_err(|e| doc.store_error(e))?;
        Ok(Some(body))
    }

    async fn write_document(&self, doc: &DocumentRef, body: &Document) -> Result<(), SchwabError> {
        let fields = encode_fields(body).map_err(|e| doc.store_error(e))?;
        let token = self.auth.access_token().await?;
        let url = self.document_url(doc);
        // PATCH without an update mask replaces every field.
        let resp = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(|e| doc.store_error(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(doc.store_error(format!("write failed with status {status}: {body}")));
        }
        tracing::debug!("Updated {doc} in project {}", self.project_id);
        Ok(())
    }
}

pub fn encode_fields(body: &Map<String, Value>) -> Result<Map<String, Value>, String> {
    body.iter()
        .map(|(k, v)| Ok((k.clone(), encode_value(v)?)))
        .collect()
}

/// Convert plain JSON into a Firestore typed `Value`.
///
/// Unsigned integers beyond `i64::MAX` have no exact Firestore encoding and
/// are rejected.
pub fn encode_value(value: &Value) -> Result<Value, String> {
    let encoded = match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // Firestore carries int64 as a decimal string.
                json!({ "integerValue": i.to_string() })
            } else if n.is_u64() {
                return Err(format!("integer {n} does not fit in a signed 64-bit value"));
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values = items.iter().map(encode_value).collect::<Result<Vec<_>, _>>()?;
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map)? } }),
    };
    Ok(encoded)
}

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, String> {
    fields
        .iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect()
}

/// Convert a Firestore typed `Value` back into plain JSON.
pub fn decode_value(value: &Value) -> Result<Value, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| format!("expected a typed value, got {value}"))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| "empty typed value".to_string())?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| format!("invalid booleanValue {inner}")),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(|i| Value::Number(i.into()))
                .ok_or_else(|| format!("invalid integerValue {inner}"))
        }
        "doubleValue" => match inner {
            // NaN and infinities have no JSON form.
            Value::Number(n) => Ok(n
                .as_f64()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)),
            Value::String(_) => Ok(Value::Null),
            _ => Err(format!("invalid doubleValue {inner}")),
        },
        "stringValue" | "timestampValue" | "bytesValue" | "referenceValue" => Ok(inner.clone()),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Object(fields))
        }
        other => Err(format!("unsupported Firestore value type '{other}'")),
    }
}
