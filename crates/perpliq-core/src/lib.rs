//! Core domain types for perpliq.
//!
//! This crate provides the vocabulary shared by the venue collaborators and
//! the liquidation handler:
//! - `Price`, `Usd`, `TokenAmount`: precision-safe numeric types
//! - `PriceProps`, `PriceSet`: oracle price batches supplied per call
//! - `Order`, `OrderKey`, `OrderType`: order records created by the handler
//! - `Position`, `PositionDescriptor`: positions targeted for liquidation
//! - `Role`: permission identifiers checked against the role store
//! - `keys`: keccak256-derived data-store keys (order keys, feature flags)
//! - `Event`: events emitted to the event sink

pub mod decimal;
pub mod error;
pub mod event;
pub mod keys;
pub mod order;
pub mod position;
pub mod price;
pub mod role;

pub use alloy::primitives::{Address, B256};

pub use decimal::{Price, TokenAmount, Usd};
pub use error::{CoreError, Result};
pub use event::{Event, EventKind};
pub use order::{
    DecreasePositionSwapType, Order, OrderKey, OrderStatus, OrderType, SecondaryOrderType,
};
pub use position::{Position, PositionDescriptor};
pub use price::{PriceProps, PriceSet};
pub use role::Role;

/// Parse a hex string (with or without `0x`) into an [`Address`].
pub fn parse_address(s: &str) -> Result<Address> {
    s.trim()
        .parse::<Address>()
        .map_err(|e| CoreError::InvalidAddress(format!("{s}: {e}")))
}
