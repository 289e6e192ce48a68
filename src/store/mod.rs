mod call_logs;
mod lead_store;
mod view_state;

pub use lead_store::LeadStore;
