pub mod area;
pub mod call_log;
pub mod followup;
pub mod lead;
pub mod serde_helpers;
pub mod view;

pub use area::{area_leads, area_slug, partition_areas, AreaData};
pub use call_log::{sorted_call_logs, CallLog, CallLogUpdate, CallOutcome, NewCallLog};
pub use followup::{current_follow_up, is_follow_up_due, next_follow_up};
pub use lead::{
    decode_contacted, decode_id, normalize_city, Lead, LeadPatch, LeadStatus, NewLead, UNKNOWN_CITY,
};
pub use view::{apply_filters, apply_view, Filters, SortDirection, SortField, SortState};
