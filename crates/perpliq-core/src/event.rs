//! Events emitted to the event sink.

use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};

use crate::decimal::{Price, TokenAmount, Usd};
use crate::order::{OrderKey, OrderType, SecondaryOrderType};

/// Event payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// An order was persisted.
    OrderCreated {
        key: OrderKey,
        account: Address,
        market: Address,
        order_type: OrderType,
        size_delta_usd: Usd,
    },
    /// An order was consumed by its strategy.
    OrderExecuted {
        key: OrderKey,
        secondary_order_type: SecondaryOrderType,
    },
    /// A price became authoritative for the current call.
    OraclePriceUpdate {
        token: Address,
        min: Price,
        max: Price,
    },
    PositionIncrease {
        order_key: OrderKey,
        account: Address,
        market: Address,
        size_delta_usd: Usd,
        execution_price: Price,
        referral_code: Option<B256>,
    },
    PositionDecrease {
        order_key: OrderKey,
        account: Address,
        market: Address,
        size_delta_usd: Usd,
        remaining_size_usd: Usd,
        execution_price: Price,
        referral_code: Option<B256>,
    },
    SwapExecuted {
        order_key: OrderKey,
        token_in: Address,
        token_out: Address,
        amount_out: TokenAmount,
    },
    /// A handler call failed and all of its effects were discarded.
    LiquidationAborted {
        account: Address,
        market: Address,
        reason: String,
    },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OrderCreated { .. } => "OrderCreated",
            Self::OrderExecuted { .. } => "OrderExecuted",
            Self::OraclePriceUpdate { .. } => "OraclePriceUpdate",
            Self::PositionIncrease { .. } => "PositionIncrease",
            Self::PositionDecrease { .. } => "PositionDecrease",
            Self::SwapExecuted { .. } => "SwapExecuted",
            Self::LiquidationAborted { .. } => "LiquidationAborted",
        }
    }
}

/// A timestamped event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub emitted_at: DateTime<Utc>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            emitted_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl From<EventKind> for Event {
    fn from(kind: EventKind) -> Self {
        Self::new(kind)
    }
}
