//! Order records and their classification.
//!
//! Orders are created by handlers, persisted in the data store and consumed
//! by an order-type-specific execution strategy.

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::decimal::{Price, TokenAmount, Usd};
use crate::error::CoreError;

/// Unique key of an order, derived from the data-store nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderKey(B256);

impl OrderKey {
    pub fn new(key: B256) -> Self {
        Self(key)
    }
}

impl From<B256> for OrderKey {
    fn from(key: B256) -> Self {
        Self(key)
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Primary order type.
///
/// Discriminants are part of the feature-flag key encoding and must not
/// be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum OrderType {
    MarketSwap = 0,
    LimitSwap = 1,
    MarketIncrease = 2,
    LimitIncrease = 3,
    MarketDecrease = 4,
    LimitDecrease = 5,
    StopLossDecrease = 6,
    Liquidation = 7,
}

impl OrderType {
    pub const ALL: [OrderType; 8] = [
        Self::MarketSwap,
        Self::LimitSwap,
        Self::MarketIncrease,
        Self::LimitIncrease,
        Self::MarketDecrease,
        Self::LimitDecrease,
        Self::StopLossDecrease,
        Self::Liquidation,
    ];

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn is_swap(&self) -> bool {
        matches!(self, Self::MarketSwap | Self::LimitSwap)
    }

    pub fn is_increase(&self) -> bool {
        matches!(self, Self::MarketIncrease | Self::LimitIncrease)
    }

    /// Liquidations are decrease orders.
    pub fn is_decrease(&self) -> bool {
        matches!(
            self,
            Self::MarketDecrease | Self::LimitDecrease | Self::StopLossDecrease | Self::Liquidation
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarketSwap => "market_swap",
            Self::LimitSwap => "limit_swap",
            Self::MarketIncrease => "market_increase",
            Self::LimitIncrease => "limit_increase",
            Self::MarketDecrease => "market_decrease",
            Self::LimitDecrease => "limit_decrease",
            Self::StopLossDecrease => "stop_loss_decrease",
            Self::Liquidation => "liquidation",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::InvalidOrderType(s.to_string()))
    }
}

/// Secondary classification carried through execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryOrderType {
    #[default]
    None,
    Liquidation,
    Adl,
}

impl fmt::Display for SecondaryOrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Liquidation => write!(f, "liquidation"),
            Self::Adl => write!(f, "adl"),
        }
    }
}

/// How realized PnL and collateral are swapped on decrease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecreasePositionSwapType {
    #[default]
    NoSwap,
    SwapPnlTokenToCollateralToken,
    SwapCollateralTokenToPnlToken,
}

/// Lifecycle status, written only by the data store and strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Executed,
}

/// An order record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub key: OrderKey,
    pub account: Address,
    pub receiver: Address,
    pub market: Address,
    pub initial_collateral_token: Address,
    pub swap_path: Vec<Address>,
    pub size_delta_usd: Usd,
    pub initial_collateral_delta_amount: TokenAmount,
    pub trigger_price: Price,
    pub acceptable_price: Price,
    pub execution_fee: TokenAmount,
    pub callback_gas_limit: u64,
    pub min_output_amount: TokenAmount,
    pub updated_at_block: u64,
    pub order_type: OrderType,
    pub decrease_position_swap_type: DecreasePositionSwapType,
    pub is_long: bool,
    pub should_unwrap_native_token: bool,
    pub is_frozen: bool,
    pub status: OrderStatus,
}

impl Order {
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    pub fn is_executed(&self) -> bool {
        self.status == OrderStatus::Executed
    }
}
