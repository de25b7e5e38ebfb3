//! Venue error types.

use perpliq_core::{Address, OrderKey, TokenAmount};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VenueError {
    #[error("Order already exists: {0}")]
    OrderAlreadyExists(OrderKey),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderKey),

    #[error("Price already set for token {0}")]
    PriceAlreadySet(Address),

    #[error("Checkpoint held by another caller")]
    CheckpointBusy,

    #[error("Checkpoint {requested} is not the innermost open checkpoint ({open} open)")]
    CheckpointOutOfOrder { requested: usize, open: usize },

    #[error("Insufficient swap output: got {actual}, minimum {minimum}")]
    InsufficientSwapOutput {
        actual: TokenAmount,
        minimum: TokenAmount,
    },

    #[error("Swap failed: {0}")]
    SwapFailed(String),
}

pub type VenueResult<T> = Result<T, VenueError>;
