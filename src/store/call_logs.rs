// src/store/call_logs.rs
//
// Call logs live only in local storage. Adding or re-noting one also
// pushes the matching lead fields to the backend, and memory only
// changes after that call succeeded.

use chrono::{DateTime, Utc};

use super::LeadStore;
use crate::api::LeadsApi;
use crate::domain::{CallLog, CallLogUpdate, LeadPatch, NewCallLog};
use crate::errors::DashError;

impl<A: LeadsApi> LeadStore<A> {
    /// Record a call: marks the lead contacted and copies the note onto it.
    pub fn add_call_log(
        &mut self,
        lead_id: &str,
        input: NewCallLog,
        now: DateTime<Utc>,
    ) -> Result<CallLog, DashError> {
        let idx = self.index_of("add call log", lead_id)?;
        let mut entry = CallLog::new(lead_id, input, now);
        entry.dedupe_id(&self.leads[idx].call_logs);

        let patch = LeadPatch {
            contacted: Some(true),
            notes: Some(Some(entry.notes.clone())),
            ..LeadPatch::default()
        };
        self.patch_remote("add call log", lead_id, &patch)?;

        let lead = &mut self.leads[idx];
        lead.call_logs.push(entry.clone());
        patch.apply_to(lead);
        self.persist_call_logs(idx)?;

        log::debug!("logged call {} on lead {lead_id}", entry.id);
        Ok(entry)
    }

    /// Edit a call. Only a notes change goes to the backend.
    pub fn update_call_log(
        &mut self,
        lead_id: &str,
        log_id: &str,
        update: CallLogUpdate,
        now: DateTime<Utc>,
    ) -> Result<CallLog, DashError> {
        let idx = self.index_of("update call log", lead_id)?;
        let log_idx = self.log_index_of("update call log", idx, log_id)?;

        if self.leads[idx].call_logs[log_idx].notes_change(&update) {
            let patch = LeadPatch {
                notes: Some(update.notes.clone()),
                ..LeadPatch::default()
            };
            self.patch_remote("update call log", lead_id, &patch)?;
            patch.apply_to(&mut self.leads[idx]);
        }

        let entry = &mut self.leads[idx].call_logs[log_idx];
        entry.apply(update, now);
        let updated = entry.clone();
        self.persist_call_logs(idx)?;
        Ok(updated)
    }

    /// Local-only removal.
    pub fn delete_call_log(&mut self, lead_id: &str, log_id: &str) -> Result<(), DashError> {
        let idx = self.index_of("delete call log", lead_id)?;
        let log_idx = self.log_index_of("delete call log", idx, log_id)?;

        self.leads[idx].call_logs.remove(log_idx);
        self.persist_call_logs(idx)
    }

    fn log_index_of(&mut self, op: &str, lead_idx: usize, log_id: &str) -> Result<usize, DashError> {
        let found = self.leads[lead_idx]
            .call_logs
            .iter()
            .position(|l| l.id == log_id);
        match found {
            Some(i) => Ok(i),
            None => Err(self.fail(op, DashError::NotFound(format!("call log {log_id}")))),
        }
    }

    fn persist_call_logs(&mut self, idx: usize) -> Result<(), DashError> {
        let lead = &self.leads[idx];
        let result = self.local.save_call_logs_for(&lead.id, &lead.call_logs);
        result.map_err(|e| self.fail("save call logs", e))
    }
}
