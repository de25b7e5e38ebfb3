//! Thread-safe in-memory collaborators.
//!
//! Used by the keeper binary for dry runs against a configured venue
//! snapshot and by the handler tests.

mod data_store;
mod event_log;
mod oracle;
mod role_store;
mod settlement;

pub use data_store::InMemoryDataStore;
pub use event_log::EventLog;
pub use oracle::InMemoryOracle;
pub use role_store::InMemoryRoleStore;
pub use settlement::{InMemoryOrderVault, InMemoryReferralStorage, InMemorySwapHandler};
