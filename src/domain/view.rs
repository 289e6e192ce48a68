// src/domain/view.rs

use crate::domain::lead::Lead;
use crate::errors::DashError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub show_contacted_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    Reviews,
    Phone,
    Website,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Reviews => "reviews",
            SortField::Phone => "phone",
            SortField::Website => "website",
        }
    }

    /// Field comparator, always ascending.
    /// Phone numbers compare raw, so differently formatted numbers do not line up.
    pub fn compare(self, a: &Lead, b: &Lead) -> Ordering {
        match self {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Website => {
                let wa = a.website.as_deref().unwrap_or("").to_lowercase();
                let wb = b.website.as_deref().unwrap_or("").to_lowercase();
                wa.cmp(&wb)
            }
            SortField::Phone => a.phone.cmp(&b.phone),
            SortField::Reviews => a.display_reviews().cmp(&b.display_reviews()),
        }
    }
}

impl FromStr for SortField {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "reviews" => Ok(SortField::Reviews),
            "phone" => Ok(SortField::Phone),
            "website" => Ok(SortField::Website),
            other => Err(DashError::BadRequest(format!("cannot sort by '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    /// `None` keeps store order.
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: Some(SortField::Reviews),
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for SortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "{} {}", field.as_str(), self.direction.as_str()),
            None => f.write_str("unsorted"),
        }
    }
}

impl SortState {
    /// Column-header click: same field flips direction, a new field starts ascending.
    pub fn handle_sort(&mut self, field: SortField) {
        if self.field == Some(field) {
            self.direction = self.direction.toggled();
        } else {
            self.field = Some(field);
            self.direction = SortDirection::Asc;
        }
    }
}

pub fn apply_filters<'a>(leads: &[&'a Lead], filters: &Filters) -> Vec<&'a Lead> {
    leads
        .iter()
        .copied()
        .filter(|lead| !filters.show_contacted_only || lead.contacted)
        .collect()
}

/// Filter, then stable-sort. Ties keep their input order in both directions.
pub fn apply_view<'a>(leads: &[&'a Lead], filters: &Filters, sort: &SortState) -> Vec<&'a Lead> {
    let mut out = apply_filters(leads, filters);
    if let Some(field) = sort.field {
        out.sort_by(|a, b| {
            let ord = field.compare(a, b);
            match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }
    out
}
