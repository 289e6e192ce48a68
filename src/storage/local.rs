// src/storage/local.rs
//
// Browser-style local storage: string keys, string values, last write wins.

use crate::domain::{CallLog, Filters, SortState};
use crate::errors::DashError;
use crate::storage::connection::Database;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const KEY_TOKEN: &str = "token";
pub const KEY_USER: &str = "user";
pub const KEY_CURRENT_AREA: &str = "currentArea";
pub const KEY_VIEW_STATE: &str = "viewState";
pub const KEY_CALL_LOGS: &str = "callLogs";
pub const KEY_CALL_LOGS_UNREADABLE: &str = "callLogs_unreadable";
const LAST_CALLED_PREFIX: &str = "lastCalledIndex_";

/// Lead id to that lead's call logs.
pub type CallLogMap = BTreeMap<String, Vec<CallLog>>;

/// Filters and sort of the listing last shown for `area`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredView {
    pub area: String,
    pub filters: Filters,
    pub sort: SortState,
}

#[derive(Debug, Clone)]
pub struct LocalStore {
    db: Database,
}

fn last_called_key(area_id: &str) -> String {
    format!("{LAST_CALLED_PREFIX}{area_id}")
}

impl LocalStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, DashError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| DashError::Storage(format!("read {key} failed: {e}")))
        })
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<(), DashError> {
        self.db.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
                params![key, value],
            )
            .map_err(|e| DashError::Storage(format!("write {key} failed: {e}")))?;
            Ok(())
        })
    }

    pub fn remove_item(&self, key: &str) -> Result<(), DashError> {
        self.db.with_conn(|conn| {
            conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])
                .map_err(|e| DashError::Storage(format!("remove {key} failed: {e}")))?;
            Ok(())
        })
    }

    /// Read a key, treating storage failures as "absent".
    fn read_or_absent(&self, key: &str) -> Option<String> {
        match self.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("ignoring unreadable local key {key}: {e}");
                None
            }
        }
    }

    // === Auth (written by the login flow, only read here) ===

    pub fn auth_token(&self) -> Option<String> {
        self.read_or_absent(KEY_TOKEN).filter(|t| !t.trim().is_empty())
    }

    /// `id` of the serialized user object, string or number.
    pub fn auth_user_id(&self) -> Option<String> {
        let raw = self.read_or_absent(KEY_USER)?;
        let user: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("ignoring malformed stored user: {e}");
                return None;
            }
        };
        match user.get("id")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    // === View state ===

    pub fn current_area(&self) -> Option<String> {
        self.read_or_absent(KEY_CURRENT_AREA).filter(|a| !a.is_empty())
    }

    pub fn set_current_area(&self, area_id: &str) -> Result<(), DashError> {
        self.set_item(KEY_CURRENT_AREA, area_id)
    }

    pub fn clear_current_area(&self) -> Result<(), DashError> {
        self.remove_item(KEY_CURRENT_AREA)
    }

    pub fn last_called_index(&self, area_id: &str) -> Option<usize> {
        self.read_or_absent(&last_called_key(area_id))
            .and_then(|raw| raw.trim().parse().ok())
    }

    pub fn set_last_called_index(&self, area_id: &str, index: usize) -> Result<(), DashError> {
        self.set_item(&last_called_key(area_id), &index.to_string())
    }

    pub fn clear_last_called_index(&self, area_id: &str) -> Result<(), DashError> {
        self.remove_item(&last_called_key(area_id))
    }

    /// The saved view, only if it was saved for `area`.
    pub fn view_state(&self, area_id: &str) -> Option<StoredView> {
        let raw = self.read_or_absent(KEY_VIEW_STATE)?;
        match serde_json::from_str::<StoredView>(&raw) {
            Ok(view) if view.area == area_id => Some(view),
            Ok(_) => None,
            Err(e) => {
                log::warn!("ignoring malformed stored view state: {e}");
                None
            }
        }
    }

    pub fn set_view_state(&self, view: &StoredView) -> Result<(), DashError> {
        let raw = serde_json::to_string(view)
            .map_err(|e| DashError::Storage(format!("encode view state failed: {e}")))?;
        self.set_item(KEY_VIEW_STATE, &raw)
    }

    pub fn clear_view_state(&self) -> Result<(), DashError> {
        self.remove_item(KEY_VIEW_STATE)
    }

    // === Call logs ===

    /// Every persisted call log, keyed by lead id. Entries that do not decode
    /// are skipped here but stay in storage.
    pub fn call_log_map(&self) -> CallLogMap {
        let Some(raw) = self.read_or_absent(KEY_CALL_LOGS) else {
            return CallLogMap::new();
        };
        let Some(stored) = parse_call_log_object(&raw) else {
            return CallLogMap::new();
        };

        let mut map = CallLogMap::new();
        for (lead_id, entries) in stored {
            let (logs, skipped) = split_entries(entries);
            if !skipped.is_empty() {
                log::warn!("skipping {} unreadable call logs of lead {lead_id}", skipped.len());
            }
            if !logs.is_empty() {
                map.insert(lead_id, logs);
            }
        }
        map
    }

    /// Replace one lead's logs. Other leads' entries, and this lead's
    /// entries that never decoded, are written back untouched.
    pub fn save_call_logs_for(&self, lead_id: &str, logs: &[CallLog]) -> Result<(), DashError> {
        let mut stored = self.call_log_object_for_write()?;

        let kept = stored
            .remove(lead_id)
            .map(|entries| split_entries(entries).1)
            .unwrap_or_default();
        let mut entries = logs
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DashError::Storage(format!("encode call logs failed: {e}")))?;
        entries.extend(kept);

        if !entries.is_empty() {
            stored.insert(lead_id.to_string(), Value::Array(entries));
        }
        self.write_call_log_object(&stored)
    }

    /// Forget everything stored for a lead, readable or not.
    pub fn drop_call_logs_for(&self, lead_id: &str) -> Result<(), DashError> {
        let mut stored = self.call_log_object_for_write()?;
        if stored.remove(lead_id).is_none() {
            return Ok(());
        }
        self.write_call_log_object(&stored)
    }

    /// The raw map to merge into. A blob that is not a JSON object is moved
    /// to `callLogs_unreadable` first so the rewrite never destroys it.
    fn call_log_object_for_write(&self) -> Result<Map<String, Value>, DashError> {
        let Some(raw) = self.get_item(KEY_CALL_LOGS)? else {
            return Ok(Map::new());
        };
        match parse_call_log_object(&raw) {
            Some(stored) => Ok(stored),
            None => {
                self.set_item(KEY_CALL_LOGS_UNREADABLE, &raw)?;
                Ok(Map::new())
            }
        }
    }

    fn write_call_log_object(&self, stored: &Map<String, Value>) -> Result<(), DashError> {
        let raw = serde_json::to_string(stored)
            .map_err(|e| DashError::Storage(format!("encode call logs failed: {e}")))?;
        self.set_item(KEY_CALL_LOGS, &raw)
    }
}

fn parse_call_log_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            log::warn!("ignoring stored call logs: not a JSON object");
            None
        }
        Err(e) => {
            log::warn!("ignoring malformed stored call logs: {e}");
            None
        }
    }
}

/// Decode one lead's entries, returning the logs and the raw values that failed.
fn split_entries(entries: Value) -> (Vec<CallLog>, Vec<Value>) {
    let items = match entries {
        Value::Array(items) => items,
        other => vec![other],
    };
    let mut logs = Vec::new();
    let mut skipped = Vec::new();
    for item in items {
        match serde_json::from_value::<CallLog>(item.clone()) {
            Ok(entry) => logs.push(entry),
            Err(e) => {
                log::debug!("undecodable call log kept as-is: {e}");
                skipped.push(item);
            }
        }
    }
    (logs, skipped)
}
