// src/api/client.rs

use crate::api::models::{api_error_message, parse_lead, parse_lead_list, parse_optional_lead, WireLead};
use crate::errors::DashError;
use crate::storage::LocalStore;
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("rankrent/", env!("CARGO_PKG_VERSION"));

/// The slice of the backend the lead controller depends on.
pub trait LeadsApi {
    fn list_leads(&self) -> Result<Vec<WireLead>, DashError>;
    fn create_lead(&self, body: &Value) -> Result<WireLead, DashError>;
    /// Backend merges partial bodies. Returns the stored record when the response carries one.
    fn update_lead(&self, id: &str, body: &Value) -> Result<Option<WireLead>, DashError>;
    fn delete_lead(&self, id: &str) -> Result<(), DashError>;
}

pub struct HttpLeadsApi {
    base: Url,
    client: Client,
    local: LocalStore,
}

impl HttpLeadsApi {
    pub fn new(base_url: &str, local: LocalStore) -> Result<Self, DashError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| DashError::BadRequest(format!("invalid API url {base_url}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        // Requests run until the server answers; there is no client-side timeout.
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| DashError::Network(e.to_string()))?;

        Ok(Self { base, client, local })
    }

    fn leads_url(&self, id: Option<&str>) -> Result<Url, DashError> {
        let mut url = self
            .base
            .join("leads")
            .map_err(|e| DashError::BadRequest(e.to_string()))?;
        if let Some(id) = id {
            url.path_segments_mut()
                .map_err(|_| DashError::BadRequest(format!("cannot add path to {}", self.base)))?
                .push(id);
        }
        Ok(url)
    }

    /// Bearer token and `X-User-ID` from local storage; each is omitted when absent.
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let mut req = req;
        if let Some(token) = self.local.auth_token() {
            req = req.bearer_auth(token);
        }
        if let Some(user_id) = self.local.auth_user_id() {
            req = req.header("X-User-ID", user_id);
        }
        req
    }

    fn send(&self, req: RequestBuilder) -> Result<String, DashError> {
        let resp = self
            .authorize(req)
            .send()
            .map_err(|e| DashError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| DashError::Network(format!("reading response failed: {e}")))?;

        if !status.is_success() {
            return Err(DashError::Api {
                status: status.as_u16(),
                body: api_error_message(&text),
            });
        }
        Ok(text)
    }
}

impl LeadsApi for HttpLeadsApi {
    fn list_leads(&self) -> Result<Vec<WireLead>, DashError> {
        let url = self.leads_url(None)?;
        let text = self.send(self.client.get(url))?;
        parse_lead_list(&text)
    }

    fn create_lead(&self, body: &Value) -> Result<WireLead, DashError> {
        let url = self.leads_url(None)?;
        let text = self.send(self.client.post(url).json(body))?;
        parse_lead(&text)
    }

    fn update_lead(&self, id: &str, body: &Value) -> Result<Option<WireLead>, DashError> {
        let url = self.leads_url(Some(id))?;
        let text = self.send(self.client.put(url).json(body))?;
        parse_optional_lead(&text)
    }

    fn delete_lead(&self, id: &str) -> Result<(), DashError> {
        let url = self.leads_url(Some(id))?;
        self.send(self.client.delete(url))?;
        Ok(())
    }
}
