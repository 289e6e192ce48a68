// src/domain/call_log.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::serde_helpers::{flexible_timestamp, lenient_timestamp};
use crate::errors::DashError;

/// The fixed set of outcomes a caller can record. Each one schedules a follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallOutcome {
    #[serde(rename = "follow_up_1_day")]
    FollowUp1Day,
    #[serde(rename = "follow_up_72_hours")]
    FollowUp72Hours,
    #[serde(rename = "follow_up_next_week")]
    FollowUpNextWeek,
    #[serde(rename = "follow_up_next_month")]
    FollowUpNextMonth,
    #[serde(rename = "follow_up_3_months")]
    FollowUp3Months,
}

impl CallOutcome {
    pub const ALL: [CallOutcome; 5] = [
        CallOutcome::FollowUp1Day,
        CallOutcome::FollowUp72Hours,
        CallOutcome::FollowUpNextWeek,
        CallOutcome::FollowUpNextMonth,
        CallOutcome::FollowUp3Months,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CallOutcome::FollowUp1Day => "follow_up_1_day",
            CallOutcome::FollowUp72Hours => "follow_up_72_hours",
            CallOutcome::FollowUpNextWeek => "follow_up_next_week",
            CallOutcome::FollowUpNextMonth => "follow_up_next_month",
            CallOutcome::FollowUp3Months => "follow_up_3_months",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CallOutcome::FollowUp1Day => "Follow up in 1 day",
            CallOutcome::FollowUp72Hours => "Follow up in 72 hours",
            CallOutcome::FollowUpNextWeek => "Follow up next week",
            CallOutcome::FollowUpNextMonth => "Follow up next month",
            CallOutcome::FollowUp3Months => "Follow up in 3 months",
        }
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallOutcome {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        CallOutcome::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| DashError::BadRequest(format!("unknown call outcome '{s}'")))
    }
}

/// One outreach attempt on a lead. Only ever stored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallLog {
    pub id: String,
    pub lead_id: String,
    pub outcome: CallOutcome,
    #[serde(default)]
    pub notes: String,
    #[serde(deserialize_with = "flexible_timestamp")]
    pub call_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub next_follow_up: Option<DateTime<Utc>>,
    /// Call length in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct NewCallLog {
    pub outcome: CallOutcome,
    pub notes: String,
    /// Overrides the outcome-derived follow-up when set.
    pub next_follow_up: Option<DateTime<Utc>>,
    pub duration: Option<u32>,
}

impl NewCallLog {
    pub fn new(outcome: CallOutcome, notes: impl Into<String>) -> Self {
        Self {
            outcome,
            notes: notes.into(),
            next_follow_up: None,
            duration: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallLogUpdate {
    pub outcome: Option<CallOutcome>,
    pub notes: Option<String>,
}

impl CallLog {
    pub fn new(lead_id: &str, input: NewCallLog, now: DateTime<Utc>) -> Self {
        let next_follow_up = input
            .next_follow_up
            .or_else(|| input.outcome.follow_up_from(now));

        Self {
            id: format!("call_{}", now.timestamp_millis()),
            lead_id: lead_id.to_string(),
            outcome: input.outcome,
            notes: input.notes,
            call_date: now,
            next_follow_up,
            duration: input.duration,
        }
    }

    /// Suffix the id (`_2`, `_3`, ...) until no log in `existing` shares it.
    pub fn dedupe_id(&mut self, existing: &[CallLog]) {
        let base = self.id.clone();
        let mut n = 1;
        while existing.iter().any(|l| l.id == self.id) {
            n += 1;
            self.id = format!("{base}_{n}");
        }
    }

    /// True when applying `update` would change the notes text.
    pub fn notes_change(&self, update: &CallLogUpdate) -> bool {
        update.notes.as_ref().is_some_and(|n| n != &self.notes)
    }

    /// Apply an edit. A changed outcome reschedules the follow-up from `now`.
    pub fn apply(&mut self, update: CallLogUpdate, now: DateTime<Utc>) {
        if let Some(outcome) = update.outcome {
            if outcome != self.outcome {
                self.outcome = outcome;
                self.next_follow_up = outcome.follow_up_from(now);
            }
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
    }
}

/// Logs newest first by call date. Ties keep their stored order.
pub fn sorted_call_logs(logs: &[CallLog]) -> Vec<&CallLog> {
    let mut out: Vec<&CallLog> = logs.iter().collect();
    out.sort_by(|a, b| b.call_date.cmp(&a.call_date));
    out
}
