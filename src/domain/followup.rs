// src/domain/followup.rs

use chrono::{DateTime, Duration, Months, Utc};

use crate::domain::call_log::CallOutcome;
use crate::domain::lead::Lead;

impl CallOutcome {
    /// When the next follow-up is due for a call logged at `now`.
    ///
    /// Calendar-month outcomes clamp to the last day of the target month,
    /// so Jan 31 + 1 month lands on Feb 29 in a leap year.
    pub fn follow_up_from(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            CallOutcome::FollowUp1Day => now.checked_add_signed(Duration::days(1)),
            CallOutcome::FollowUp72Hours => now.checked_add_signed(Duration::days(3)),
            CallOutcome::FollowUpNextWeek => now.checked_add_signed(Duration::days(7)),
            CallOutcome::FollowUpNextMonth => now.checked_add_months(Months::new(1)),
            CallOutcome::FollowUp3Months => now.checked_add_months(Months::new(3)),
        }
    }
}

/// Follow-up for a raw outcome string. Unrecognised outcomes schedule nothing.
pub fn next_follow_up(outcome: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    outcome
        .parse::<CallOutcome>()
        .ok()
        .and_then(|o| o.follow_up_from(now))
}

/// The follow-up moment of the lead's most recent call, by call date.
pub fn current_follow_up(lead: &Lead) -> Option<DateTime<Utc>> {
    lead.latest_call_log().and_then(|log| log.next_follow_up)
}

/// A lead is due once its current follow-up moment is at or before `now`.
/// Leads without call logs are never due.
pub fn is_follow_up_due(lead: &Lead, now: DateTime<Utc>) -> bool {
    current_follow_up(lead).is_some_and(|at| at <= now)
}
