//! Swap engine interface.

use perpliq_core::{Address, OrderKey, PriceProps, TokenAmount};

use crate::error::VenueResult;

/// One hop of a swap, priced with the current window's prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapParams {
    pub order_key: OrderKey,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: TokenAmount,
    pub min_output_amount: TokenAmount,
    pub price_in: PriceProps,
    pub price_out: PriceProps,
    pub receiver: Address,
}

pub trait SwapHandler: Send + Sync {
    /// Output amount `swap` would return for `params`, without executing.
    /// Fails exactly when `swap` would.
    fn quote(&self, params: &SwapParams) -> VenueResult<TokenAmount>;

    /// Execute the hop and return the output amount.
    fn swap(&self, params: &SwapParams) -> VenueResult<TokenAmount>;
}
