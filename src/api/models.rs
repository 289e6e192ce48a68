use crate::domain::serde_helpers::lenient_timestamp;
use crate::domain::LeadStatus;
use crate::errors::DashError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

// lead (GET /leads -> { data: [lead, ...] })
//  ├── id            string | number
//  ├── name, phone, email, company, website
//  ├── city          string | null
//  ├── status        new | contacted | qualified | converted | lost
//  ├── reviews       integer, may be negative
//  ├── contacted     bool | 0/1 | "0"/"1"
//  ├── notes         string | null
//  └── follow_up_at, created_at, updated_at   ISO timestamps

#[derive(Debug, Clone, Deserialize)]
pub struct WireLead {
    #[serde(default)]
    pub id: Value,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub city: Option<String>,
    pub status: Option<LeadStatus>,
    pub reviews: Option<i64>,
    #[serde(default)]
    pub contacted: Value,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub follow_up_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Strip the `{ "data": ... }` envelope when present.
fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => map.remove("data").unwrap_or(Value::Null),
        other => other,
    }
}

fn parse_json(text: &str) -> Result<Value, DashError> {
    serde_json::from_str(text).map_err(|e| DashError::Decode(format!("invalid JSON: {e}")))
}

pub fn parse_lead_list(text: &str) -> Result<Vec<WireLead>, DashError> {
    let data = unwrap_envelope(parse_json(text)?);
    serde_json::from_value(data).map_err(|e| DashError::Decode(format!("lead list: {e}")))
}

pub fn parse_lead(text: &str) -> Result<WireLead, DashError> {
    let data = unwrap_envelope(parse_json(text)?);
    serde_json::from_value(data).map_err(|e| DashError::Decode(format!("lead: {e}")))
}

/// Like [`parse_lead`], but an empty or record-less body is `None`.
pub fn parse_optional_lead(text: &str) -> Result<Option<WireLead>, DashError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    match unwrap_envelope(parse_json(text)?) {
        Value::Object(map) if map.contains_key("id") => serde_json::from_value(Value::Object(map))
            .map(Some)
            .map_err(|e| DashError::Decode(format!("lead: {e}"))),
        _ => Ok(None),
    }
}

/// Best human-readable message from an error response body.
pub fn api_error_message(text: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        for key in ["message", "error"] {
            if let Some(Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "(no body)".to_string()
    } else {
        trimmed.to_string()
    }
}
