// src/store/view_state.rs

use chrono::{DateTime, Utc};

use super::LeadStore;
use crate::api::LeadsApi;
use crate::domain::{
    area_leads, apply_view, is_follow_up_due, partition_areas, AreaData, Filters, Lead, SortField,
    SortState,
};
use crate::errors::DashError;
use crate::storage::local::StoredView;

impl<A: LeadsApi> LeadStore<A> {
    pub fn areas(&self) -> Vec<AreaData<'_>> {
        partition_areas(&self.leads)
    }

    pub fn current_area(&self) -> Option<&str> {
        self.current_area.as_deref()
    }

    /// Switch area. Resets filters, sort and the scroll pointer, then persists the choice.
    pub fn set_current_area(&mut self, area_id: &str) -> Result<(), DashError> {
        let previous = self.current_area.replace(area_id.to_string());
        self.filters = Filters::default();
        self.sort = SortState::default();
        self.last_called_index = None;

        if let Some(prev) = previous.as_deref().filter(|p| *p != area_id) {
            if let Err(e) = self.local.clear_last_called_index(prev) {
                log::warn!("could not clear last called index of {prev}: {e}");
            }
        }
        if let Err(e) = self.local.clear_view_state() {
            log::warn!("could not clear saved view: {e}");
        }

        let result = self.local.set_current_area(area_id);
        result.map_err(|e| self.fail("save current area", e))
    }

    pub fn current_area_leads(&self) -> Vec<&Lead> {
        match self.current_area.as_deref() {
            Some(area) => area_leads(&self.leads, area),
            None => Vec::new(),
        }
    }

    /// The rows on screen. Rebuilt from scratch on every call.
    pub fn displayed_leads(&self) -> Vec<&Lead> {
        apply_view(&self.current_area_leads(), &self.filters, &self.sort)
    }

    /// Leads across every area whose latest call's follow-up has come due.
    pub fn due_leads(&self, now: DateTime<Utc>) -> Vec<&Lead> {
        self.leads
            .iter()
            .filter(|lead| is_follow_up_due(lead, now))
            .collect()
    }

    pub fn filters(&self) -> Filters {
        self.filters
    }

    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters;
    }

    pub fn toggle_contacted_only(&mut self) {
        self.filters.show_contacted_only = !self.filters.show_contacted_only;
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    pub fn handle_sort(&mut self, field: SortField) {
        self.sort.handle_sort(field);
    }

    pub fn clear_sort(&mut self) {
        self.sort.field = None;
    }

    pub fn last_called_index(&self) -> Option<usize> {
        self.last_called_index
    }

    /// Remember the row a call was started from, surviving a reload.
    /// The view is saved with it so the row points at the same lead afterwards.
    pub fn set_last_called_index(&mut self, index: usize) -> Result<(), DashError> {
        let Some(area) = self.current_area.clone() else {
            return Err(self.fail(
                "set last called index",
                DashError::BadRequest("no area selected".into()),
            ));
        };
        self.last_called_index = Some(index);
        let result = self
            .local
            .set_last_called_index(&area, index)
            .and_then(|()| self.persist_view());
        result.map_err(|e| self.fail("save last called index", e))
    }

    /// Save the current filters and sort for the active area.
    pub(super) fn persist_view(&self) -> Result<(), DashError> {
        let Some(area) = self.current_area.clone() else {
            return Ok(());
        };
        self.local.set_view_state(&StoredView {
            area,
            filters: self.filters,
            sort: self.sort,
        })
    }

    /// Hand out the scroll pointer once, then forget it.
    pub fn take_last_called_index(&mut self) -> Option<usize> {
        let index = self.last_called_index.take()?;
        if let Some(area) = self.current_area.as_deref() {
            if let Err(e) = self.local.clear_last_called_index(area) {
                log::warn!("could not clear last called index of {area}: {e}");
            }
        }
        Some(index)
    }

    /// Drop cached leads and view state. Call logs survive; local storage is their only copy.
    pub fn clear_cache(&mut self) {
        if let Some(area) = self.current_area.take() {
            if let Err(e) = self.local.clear_last_called_index(&area) {
                log::warn!("could not clear last called index of {area}: {e}");
            }
        }
        if let Err(e) = self.local.clear_current_area() {
            log::warn!("could not clear current area: {e}");
        }
        if let Err(e) = self.local.clear_view_state() {
            log::warn!("could not clear saved view: {e}");
        }
        self.leads.clear();
        self.filters = Filters::default();
        self.sort = SortState::default();
        self.last_called_index = None;
        self.error = None;
    }
}
