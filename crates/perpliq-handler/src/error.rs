//! Handler error types.

use perpliq_core::{Address, OrderKey, OrderStatus, OrderType, PositionDescriptor, Role, Usd, B256};
use perpliq_venue::VenueError;
use thiserror::Error;

use crate::strategy::StrategyKind;

/// Compute budget exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("compute budget exceeded: {used} of {limit} units")]
pub struct BudgetExceeded {
    pub used: u64,
    pub limit: u64,
}

/// Failure reported by an execution strategy.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Order {0} is frozen")]
    OrderFrozen(OrderKey),

    #[error("Order {key} is {status:?}, expected pending")]
    OrderNotPending { key: OrderKey, status: OrderStatus },

    #[error("No price for token {0} in the current window")]
    MissingPrice(Address),

    #[error("Position not found for order {0}")]
    PositionNotFound(OrderKey),

    #[error("Size delta {requested} exceeds position size {available}")]
    SizeDeltaExceedsPosition { requested: Usd, available: Usd },

    #[error("Execution price {execution_price} violates acceptable price {acceptable_price}")]
    AcceptablePriceNotMet {
        execution_price: perpliq_core::Price,
        acceptable_price: perpliq_core::Price,
    },

    #[error("Arithmetic overflow computing {0}")]
    Overflow(&'static str),

    #[error("Invalid swap path: {0}")]
    InvalidSwapPath(String),

    #[error("No strategy registered for {0}")]
    NoStrategy(StrategyKind),

    #[error(transparent)]
    Budget(#[from] BudgetExceeded),

    #[error(transparent)]
    Venue(#[from] VenueError),

    #[error("{0}")]
    Other(String),
}

/// Reasons a handler call is aborted.
///
/// Every variant is terminal for the call. Variants raised after the
/// exclusion guard is acquired also roll back all effects of the call.
#[derive(Debug, Error)]
pub enum LiquidationError {
    #[error("Unauthorized: {account} lacks role {role}")]
    Unauthorized { account: Address, role: Role },

    #[error("Reentrancy detected: a guarded operation is already in progress")]
    ReentrancyDetected,

    #[error("Feature disabled for order type {order_type} (key {key})")]
    FeatureDisabled { order_type: OrderType, key: B256 },

    #[error("Order not found: {0}")]
    OrderNotFound(OrderKey),

    #[error("Order {key} is not executable: {reason}")]
    OrderNotExecutable { key: OrderKey, reason: String },

    #[error("Execution failed: {0}")]
    ExecutionFailed(#[source] StrategyError),

    #[error("Invalid price set: {0}")]
    InvalidPriceSet(String),

    #[error("Empty position: {0}")]
    EmptyPosition(PositionDescriptor),

    #[error("Invalid size delta: {0}")]
    InvalidSizeDelta(String),

    #[error("Compute budget exceeded: used {used} of {limit} units")]
    ComputeBudgetExceeded { used: u64, limit: u64 },

    #[error("Price window leak: {0} token prices outstanding")]
    PriceWindowLeak(usize),

    #[error("Venue error: {0}")]
    Venue(#[from] VenueError),
}

impl LiquidationError {
    /// Stable label for metrics and abort events.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::ReentrancyDetected => "reentrancy_detected",
            Self::FeatureDisabled { .. } => "feature_disabled",
            Self::OrderNotFound(_) => "order_not_found",
            Self::OrderNotExecutable { .. } => "order_not_executable",
            Self::ExecutionFailed(_) => "execution_failed",
            Self::InvalidPriceSet(_) => "invalid_price_set",
            Self::EmptyPosition(_) => "empty_position",
            Self::InvalidSizeDelta(_) => "invalid_size_delta",
            Self::ComputeBudgetExceeded { .. } => "compute_budget_exceeded",
            Self::PriceWindowLeak(_) => "price_window_leak",
            Self::Venue(_) => "venue_error",
        }
    }
}

impl From<BudgetExceeded> for LiquidationError {
    fn from(e: BudgetExceeded) -> Self {
        Self::ComputeBudgetExceeded {
            used: e.used,
            limit: e.limit,
        }
    }
}

impl From<StrategyError> for LiquidationError {
    /// Budget exhaustion inside a strategy stays a budget abort.
    fn from(e: StrategyError) -> Self {
        match e {
            StrategyError::Budget(budget) => budget.into(),
            other => Self::ExecutionFailed(other),
        }
    }
}

pub type HandlerResult<T> = Result<T, LiquidationError>;
