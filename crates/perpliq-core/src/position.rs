//! Positions and the descriptor used to target them.

use alloy::primitives::{Address, B256};
use std::fmt;

use crate::decimal::{TokenAmount, Usd};
use crate::keys;

/// Identifies a position by its four key fields.
///
/// Only read by handlers; it never carries order parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionDescriptor {
    pub account: Address,
    pub market: Address,
    pub collateral_token: Address,
    pub is_long: bool,
}

impl PositionDescriptor {
    pub fn new(account: Address, market: Address, collateral_token: Address, is_long: bool) -> Self {
        Self {
            account,
            market,
            collateral_token,
            is_long,
        }
    }

    /// Data-store key of the position.
    pub fn key(&self) -> B256 {
        keys::position_key(self.account, self.market, self.collateral_token, self.is_long)
    }
}

impl fmt::Display for PositionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.account,
            self.market,
            self.collateral_token,
            if self.is_long { "long" } else { "short" }
        )
    }
}

/// A position record as held by the data store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub account: Address,
    pub market: Address,
    pub collateral_token: Address,
    pub is_long: bool,
    pub size_in_usd: Usd,
    pub size_in_tokens: TokenAmount,
    pub collateral_amount: TokenAmount,
    pub increased_at_block: u64,
    pub decreased_at_block: u64,
}

impl Position {
    /// Empty position for `descriptor`, used when an increase opens it.
    pub fn empty(descriptor: &PositionDescriptor) -> Self {
        Self {
            account: descriptor.account,
            market: descriptor.market,
            collateral_token: descriptor.collateral_token,
            is_long: descriptor.is_long,
            size_in_usd: Usd::ZERO,
            size_in_tokens: TokenAmount::ZERO,
            collateral_amount: TokenAmount::ZERO,
            increased_at_block: 0,
            decreased_at_block: 0,
        }
    }

    pub fn descriptor(&self) -> PositionDescriptor {
        PositionDescriptor::new(self.account, self.market, self.collateral_token, self.is_long)
    }

    pub fn key(&self) -> B256 {
        self.descriptor().key()
    }

    pub fn is_empty(&self) -> bool {
        self.size_in_usd.is_zero()
    }
}
