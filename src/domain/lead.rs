// src/domain/lead.rs

use crate::api::models::WireLead;
use crate::domain::call_log::CallLog;
use crate::errors::DashError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::str::FromStr;

/// City bucket for leads the backend has no city for.
pub const UNKNOWN_CITY: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeadStatus {
    #[default]
    #[serde(rename = "new", alias = "New")]
    New,
    #[serde(rename = "contacted", alias = "Contacted")]
    Contacted,
    #[serde(rename = "qualified", alias = "Qualified")]
    Qualified,
    #[serde(rename = "converted", alias = "Converted")]
    Converted,
    #[serde(rename = "lost", alias = "Lost")]
    Lost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Converted,
        LeadStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Converted => "converted",
            LeadStatus::Lost => "lost",
        }
    }
}

impl FromStr for LeadStatus {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        LeadStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| DashError::BadRequest(format!("unknown lead status '{}'", s.trim())))
    }
}

/// A lead as held in memory: wire quirks normalised, call logs merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    /// Never empty: missing cities are stored as [`UNKNOWN_CITY`].
    pub city: String,
    pub status: LeadStatus,
    /// As stored upstream; may be negative. Rank and display by magnitude.
    pub reviews: i64,
    pub contacted: bool,
    pub notes: Option<String>,
    pub follow_up_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub call_logs: Vec<CallLog>,
}

/// Strict boolean for the `contacted` flag, which arrives as
/// `true`, `1`, `"1"` or `"true"` depending on the backend path.
pub fn decode_contacted(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => {
            let s = s.trim();
            s == "1" || s.eq_ignore_ascii_case("true")
        }
        _ => false,
    }
}

/// Server ids are opaque; some routes send them as numbers.
pub fn decode_id(raw: &Value) -> Result<String, DashError> {
    match raw {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(DashError::Decode(format!("lead has no usable id: {other}"))),
    }
}

/// Missing or blank cities become [`UNKNOWN_CITY`].
pub fn normalize_city(city: Option<&str>) -> String {
    match city {
        Some(c) if !c.trim().is_empty() => c.to_string(),
        _ => UNKNOWN_CITY.to_string(),
    }
}

/// City as the backend wants it: the placeholder bucket goes back out as null.
fn outbound_city(city: &str) -> Value {
    if city.trim().is_empty() || city == UNKNOWN_CITY {
        Value::Null
    } else {
        Value::String(city.to_string())
    }
}

impl Lead {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: String::new(),
            email: None,
            company: None,
            website: None,
            city: UNKNOWN_CITY.to_string(),
            status: LeadStatus::New,
            reviews: 0,
            contacted: false,
            notes: None,
            follow_up_at: None,
            created_at: None,
            updated_at: None,
            call_logs: Vec::new(),
        }
    }

    /// Boundary decode of a backend record. Call logs are merged in separately.
    pub fn from_wire(wire: WireLead) -> Result<Self, DashError> {
        let id = decode_id(&wire.id)?;
        let name = wire
            .name
            .ok_or_else(|| DashError::Decode(format!("lead {id} has no name")))?;

        Ok(Lead {
            name,
            phone: wire.phone.unwrap_or_default(),
            email: wire.email,
            company: wire.company,
            website: wire.website,
            city: normalize_city(wire.city.as_deref()),
            status: wire.status.unwrap_or_default(),
            reviews: wire.reviews.unwrap_or(0),
            contacted: decode_contacted(&wire.contacted),
            notes: wire.notes,
            follow_up_at: wire.follow_up_at,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
            call_logs: Vec::new(),
            id,
        })
    }

    /// Full-record body for `PUT /leads/:id`.
    pub fn to_payload(&self) -> Value {
        json!({
            "name": self.name,
            "phone": self.phone,
            "email": self.email,
            "company": self.company,
            "website": self.website,
            "city": outbound_city(&self.city),
            "status": self.status,
            "reviews": self.reviews,
            "contacted": self.contacted,
            "notes": self.notes,
            "follow_up_at": self.follow_up_at,
        })
    }

    pub fn display_reviews(&self) -> u64 {
        self.reviews.unsigned_abs()
    }

    /// Most recent call by call date, regardless of insertion order.
    pub fn latest_call_log(&self) -> Option<&CallLog> {
        self.call_logs.iter().max_by_key(|log| log.call_date)
    }

    /// The note shown in list rows: the latest call's note, else the lead's own.
    pub fn note_preview(&self) -> Option<&str> {
        match self.latest_call_log() {
            Some(log) if !log.notes.is_empty() => Some(log.notes.as_str()),
            _ => self.notes.as_deref(),
        }
    }
}

/// Fields for `POST /leads`. Name and phone are the only required ones.
#[derive(Debug, Clone, Default)]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub city: Option<String>,
    pub status: LeadStatus,
    pub reviews: i64,
    pub notes: Option<String>,
}

impl NewLead {
    pub fn to_payload(&self) -> Value {
        let city = normalize_city(self.city.as_deref());
        json!({
            "name": self.name,
            "phone": self.phone,
            "email": self.email,
            "company": self.company,
            "website": self.website,
            "city": outbound_city(&city),
            "status": self.status,
            "reviews": self.reviews,
            "contacted": false,
            "notes": self.notes,
        })
    }
}

/// A subset of lead fields. Unset fields are left alone both in memory and on the wire.
/// Nullable fields use `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub status: Option<LeadStatus>,
    pub reviews: Option<i64>,
    pub contacted: Option<bool>,
    pub notes: Option<Option<String>>,
    pub follow_up_at: Option<Option<DateTime<Utc>>>,
}

impl LeadPatch {
    pub fn contacted(value: bool) -> Self {
        Self {
            contacted: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, lead: &mut Lead) {
        if let Some(name) = &self.name {
            lead.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            lead.phone = phone.clone();
        }
        if let Some(email) = &self.email {
            lead.email = email.clone();
        }
        if let Some(company) = &self.company {
            lead.company = company.clone();
        }
        if let Some(website) = &self.website {
            lead.website = website.clone();
        }
        if let Some(city) = &self.city {
            lead.city = normalize_city(city.as_deref());
        }
        if let Some(status) = self.status {
            lead.status = status;
        }
        if let Some(reviews) = self.reviews {
            lead.reviews = reviews;
        }
        if let Some(contacted) = self.contacted {
            lead.contacted = contacted;
        }
        if let Some(notes) = &self.notes {
            lead.notes = notes.clone();
        }
        if let Some(follow_up_at) = self.follow_up_at {
            lead.follow_up_at = follow_up_at;
        }
    }

    /// Field-scoped body: only the fields this patch sets.
    pub fn to_payload(&self) -> Value {
        let mut body = Map::new();
        if let Some(name) = &self.name {
            body.insert("name".into(), json!(name));
        }
        if let Some(phone) = &self.phone {
            body.insert("phone".into(), json!(phone));
        }
        if let Some(email) = &self.email {
            body.insert("email".into(), json!(email));
        }
        if let Some(company) = &self.company {
            body.insert("company".into(), json!(company));
        }
        if let Some(website) = &self.website {
            body.insert("website".into(), json!(website));
        }
        if let Some(city) = &self.city {
            body.insert("city".into(), outbound_city(&normalize_city(city.as_deref())));
        }
        if let Some(status) = self.status {
            body.insert("status".into(), json!(status));
        }
        if let Some(reviews) = self.reviews {
            body.insert("reviews".into(), json!(reviews));
        }
        if let Some(contacted) = self.contacted {
            body.insert("contacted".into(), json!(contacted));
        }
        if let Some(notes) = &self.notes {
            body.insert("notes".into(), json!(notes));
        }
        if let Some(follow_up_at) = self.follow_up_at {
            body.insert("follow_up_at".into(), json!(follow_up_at));
        }
        Value::Object(body)
    }
}
