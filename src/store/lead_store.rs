// src/store/lead_store.rs

use crate::api::{LeadsApi, WireLead};
use crate::domain::{area_slug, Filters, Lead, LeadPatch, NewLead, SortState};
use crate::errors::DashError;
use crate::storage::LocalStore;

/// In-memory lead collection plus the per-area view state around it.
///
/// Writes go to the backend first and only touch memory once the round
/// trip succeeded. Failures are kept in [`LeadStore::error`] and returned.
/// Concurrent edits are last-write-wins; there is no version check.
/// Backend calls block until answered, so no loading flag is kept.
pub struct LeadStore<A: LeadsApi> {
    pub(super) api: A,
    pub(super) local: LocalStore,
    pub(super) leads: Vec<Lead>,
    pub(super) error: Option<String>,
    pub(super) current_area: Option<String>,
    pub(super) filters: Filters,
    pub(super) sort: SortState,
    pub(super) last_called_index: Option<usize>,
}

impl<A: LeadsApi> LeadStore<A> {
    pub fn new(api: A, local: LocalStore) -> Self {
        Self {
            api,
            local,
            leads: Vec::new(),
            error: None,
            current_area: None,
            filters: Filters::default(),
            sort: SortState::default(),
            last_called_index: None,
        }
    }

    /// Restore the persisted active area, its view and its scroll pointer.
    pub fn init(&mut self) {
        self.current_area = self.local.current_area();
        if let Some(area) = self.current_area.as_deref() {
            self.last_called_index = self.local.last_called_index(area);
            if let Some(view) = self.local.view_state(area) {
                self.filters = view.filters;
                self.sort = view.sort;
            }
        }
        log::debug!(
            "lead store restored area={:?} sort={} last_called={:?}",
            self.current_area,
            self.sort,
            self.last_called_index
        );
    }

    /// Flush area, view and scroll pointer to local storage and drop the store.
    pub fn dispose(self) {
        let Some(area) = self.current_area.as_deref() else {
            return;
        };
        if let Err(e) = self.local.set_current_area(area) {
            log::warn!("could not persist current area on dispose: {e}");
        }
        if let Err(e) = self.persist_view() {
            log::warn!("could not persist view on dispose: {e}");
        }
        if let Some(index) = self.last_called_index {
            if let Err(e) = self.local.set_last_called_index(area, index) {
                log::warn!("could not persist last called index on dispose: {e}");
            }
        }
    }

    // === Accessors ===

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn lead(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // === Failure bookkeeping ===

    /// Store a failure's message in the shared error slot and hand it back.
    pub(super) fn fail(&mut self, op: &str, err: DashError) -> DashError {
        log::warn!("{op} failed: {err}");
        self.error = Some(err.to_string());
        err
    }

    pub(super) fn index_of(&mut self, op: &str, id: &str) -> Result<usize, DashError> {
        let found = self.leads.iter().position(|l| l.id == id);
        match found {
            Some(i) => Ok(i),
            None => Err(self.fail(op, DashError::NotFound(format!("lead {id}")))),
        }
    }

    // === Load ===

    /// Fetch every lead, merge in local call logs and replace the collection.
    /// Failures are reported through [`LeadStore::error`] only.
    pub fn load(&mut self) {
        self.error = None;

        let result = self.api.list_leads().and_then(|wire| {
            wire.into_iter()
                .map(Lead::from_wire)
                .collect::<Result<Vec<_>, _>>()
        });

        match result {
            Ok(mut leads) => {
                let mut stored_logs = self.local.call_log_map();
                for lead in &mut leads {
                    if let Some(logs) = stored_logs.remove(&lead.id) {
                        lead.call_logs = logs;
                    }
                }
                log::debug!("loaded {} leads", leads.len());
                self.leads = leads;

                if self.current_area.is_none() {
                    if let Some(first) = self.leads.first() {
                        let area = area_slug(&first.city);
                        if let Err(e) = self.set_current_area(&area) {
                            log::warn!("could not select initial area {area}: {e}");
                        }
                    }
                }
            }
            Err(e) => {
                self.fail("load leads", e);
            }
        }
    }

    /// Background reload. Its own failure never replaces the current error.
    pub fn refresh_quietly(&mut self) {
        let previous = self.error.clone();
        self.load();
        if let Some(err) = self.error.take() {
            log::warn!("background refresh ignored: {err}");
        }
        self.error = previous;
    }

    // === Writes ===

    pub fn create(&mut self, new_lead: &NewLead) -> Result<Lead, DashError> {
        let result = self.api.create_lead(&new_lead.to_payload()).and_then(Lead::from_wire);
        match result {
            Ok(lead) => {
                log::debug!("created lead {}", lead.id);
                self.leads.push(lead.clone());
                Ok(lead)
            }
            Err(e) => Err(self.fail("create lead", e)),
        }
    }

    /// Send the merged full record; memory only changes once the backend accepted it.
    pub fn update(&mut self, id: &str, patch: &LeadPatch) -> Result<Lead, DashError> {
        let idx = self.index_of("update lead", id)?;
        let mut merged = self.leads[idx].clone();
        patch.apply_to(&mut merged);
        self.put_full(idx, merged)
    }

    fn put_full(&mut self, idx: usize, merged: Lead) -> Result<Lead, DashError> {
        let result = self.api.update_lead(&merged.id, &merged.to_payload());
        match result {
            Ok(response) => {
                let stored = resolve_response(response, merged);
                self.leads[idx] = stored.clone();
                log::debug!("updated lead {}", stored.id);
                Ok(stored)
            }
            Err(e) => Err(self.fail("update lead", e)),
        }
    }

    /// Remote delete first; the lead stays in memory if that fails.
    pub fn delete(&mut self, id: &str) -> Result<(), DashError> {
        if let Err(e) = self.api.delete_lead(id) {
            return Err(self.fail("delete lead", e));
        }

        self.leads.retain(|l| l.id != id);
        if let Err(e) = self.local.drop_call_logs_for(id) {
            log::warn!("could not drop call logs of deleted lead {id}: {e}");
        }
        log::debug!("deleted lead {id}");
        Ok(())
    }

    /// Flip `contacted`, sending only that field so other fields are not clobbered.
    pub fn toggle_contacted(&mut self, id: &str) -> Result<bool, DashError> {
        let idx = self.index_of("toggle contacted", id)?;
        let patch = LeadPatch::contacted(!self.leads[idx].contacted);
        self.patch_remote("toggle contacted", id, &patch)?;

        patch.apply_to(&mut self.leads[idx]);
        Ok(self.leads[idx].contacted)
    }

    /// Field-scoped PUT. The response body is not merged back.
    pub(super) fn patch_remote(&mut self, op: &str, id: &str, patch: &LeadPatch) -> Result<(), DashError> {
        let result = self.api.update_lead(id, &patch.to_payload());
        result.map(|_| ()).map_err(|e| self.fail(op, e))
    }
}

/// Prefer the record the backend echoed back; fall back to what was sent.
fn resolve_response(response: Option<WireLead>, sent: Lead) -> Lead {
    match response.map(Lead::from_wire) {
        Some(Ok(mut stored)) => {
            stored.call_logs = sent.call_logs;
            stored
        }
        Some(Err(e)) => {
            log::debug!("update response not usable, keeping sent record: {e}");
            sent
        }
        None => sent,
    }
}
