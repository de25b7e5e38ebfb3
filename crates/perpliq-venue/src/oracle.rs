//! Oracle interface.

use perpliq_core::{Address, PriceProps};

use crate::error::VenueResult;

/// Holds the prices that are authoritative for the current call.
///
/// Prices are written once per token per call and cleared when the call's
/// price window closes.
pub trait Oracle: Send + Sync {
    /// Set the primary price of `token`. Fails if a price is already set.
    fn set_primary_price(&self, token: Address, props: PriceProps) -> VenueResult<()>;

    fn get_primary_price(&self, token: &Address) -> Option<PriceProps>;

    fn clear_all_prices(&self);

    /// Number of tokens that currently have a price.
    fn tokens_with_prices(&self) -> usize;
}
