// errors.rs
use std::fmt;

/// Errors raised by the lead controller and the layers under it
/// (backend REST calls, local storage, wire decoding).
#[derive(Debug)]
pub enum DashError {
    Network(String),
    Api { status: u16, body: String },
    Decode(String),
    Storage(String),
    NotFound(String),
    BadRequest(String),
}

impl fmt::Display for DashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashError::Network(msg) => write!(f, "Network error: {msg}"),
            DashError::Api { status, body } => write!(f, "API error {status}: {body}"),
            DashError::Decode(msg) => write!(f, "Unexpected response: {msg}"),
            DashError::Storage(msg) => write!(f, "Local storage error: {msg}"),
            DashError::NotFound(what) => write!(f, "Not found: {what}"),
            DashError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
        }
    }
}

impl std::error::Error for DashError {}

impl From<rusqlite::Error> for DashError {
    fn from(e: rusqlite::Error) -> Self {
        DashError::Storage(e.to_string())
    }
}
