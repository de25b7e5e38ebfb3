//! Venue collaborators consumed by the liquidation handler.
//!
//! Each collaborator is an independently addressable component reached
//! through a narrow trait. The handler only calls the operations defined
//! here; storage layout, price aggregation and settlement arithmetic stay
//! behind the trait boundary.
//!
//! # Collaborators
//!
//! - [`DataStore`]: positions, orders, nonce and boolean flags, with
//!   checkpoint/revert for whole-call atomicity
//! - [`RoleStore`]: `(account, role)` membership
//! - [`Oracle`]: prices that are authoritative for the current call
//! - [`EventEmitter`]: event sink
//! - [`OrderVault`], [`SwapHandler`], [`ReferralStorage`]: settlement
//!   helpers handed to execution strategies
//!
//! [`Contracts`] bundles shared handles to all of them. The `memory`
//! module provides thread-safe in-memory implementations used by the
//! keeper binary and by tests.

pub mod contracts;
pub mod data_store;
pub mod error;
pub mod event_emitter;
pub mod memory;
pub mod oracle;
pub mod referral;
pub mod role_store;
pub mod swap;
pub mod vault;

pub use contracts::Contracts;
pub use data_store::{Checkpoint, DataStore};
pub use error::{VenueError, VenueResult};
pub use event_emitter::EventEmitter;
pub use oracle::Oracle;
pub use referral::ReferralStorage;
pub use role_store::RoleStore;
pub use swap::{SwapHandler, SwapParams};
pub use vault::OrderVault;

pub use memory::{
    EventLog, InMemoryDataStore, InMemoryOracle, InMemoryOrderVault, InMemoryReferralStorage,
    InMemoryRoleStore, InMemorySwapHandler,
};
