//! Keeper for perpliq liquidations.
//!
//! Reads a job file, stands up an in-memory venue with the configured
//! roles, positions and kill switches, and drives the liquidation handler
//! through each job:
//! - `liquidation` jobs close a position in full
//! - `adl` jobs reduce a position by a fixed USD amount

pub mod app;
pub mod config;
pub mod error;

pub use app::{JobOutcome, Keeper, RunSummary};
pub use config::{Job, JobOperation, KeeperConfig, OperationKind};
pub use error::{KeeperError, KeeperResult};
