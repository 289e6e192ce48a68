mod client;
pub mod models;

pub use client::{HttpLeadsApi, LeadsApi};
pub use models::WireLead;
