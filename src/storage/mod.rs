pub mod connection;
pub mod local;

pub use connection::{init_db, Database};
pub use local::LocalStore;
