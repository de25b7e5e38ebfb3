//! Order vault interface.

use perpliq_core::{Address, TokenAmount};

/// Custodies collateral sent along with orders.
pub trait OrderVault: Send + Sync {
    /// Unaccounted balance of `token`, without claiming it.
    fn pending_transfer_in(&self, token: &Address) -> TokenAmount;

    /// Claim the unaccounted balance of `token` for the current order.
    fn record_transfer_in(&self, token: &Address) -> TokenAmount;
}
