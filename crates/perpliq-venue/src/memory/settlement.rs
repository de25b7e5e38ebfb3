//! In-memory settlement helpers: order vault, swap engine, referrals.

use dashmap::DashMap;
use parking_lot::Mutex;
use perpliq_core::{Address, TokenAmount, B256};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{VenueError, VenueResult};
use crate::referral::ReferralStorage;
use crate::swap::{SwapHandler, SwapParams};
use crate::vault::OrderVault;

// ============================================================================
// InMemoryOrderVault
// ============================================================================

/// Vault tracking recorded balances and not-yet-recorded deposits.
#[derive(Debug, Default)]
pub struct InMemoryOrderVault {
    /// Deposited but not yet claimed by an order.
    unrecorded: DashMap<Address, TokenAmount>,
    /// Balances claimed by executed orders.
    balances: DashMap<Address, TokenAmount>,
}

impl InMemoryOrderVault {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a token deposit into the vault.
    pub fn deposit(&self, token: Address, amount: TokenAmount) {
        let mut entry = self.unrecorded.entry(token).or_insert(TokenAmount::ZERO);
        *entry = *entry + amount;
    }

    #[must_use]
    pub fn balance(&self, token: &Address) -> TokenAmount {
        self.balances
            .get(token)
            .map(|b| *b)
            .unwrap_or(TokenAmount::ZERO)
    }
}

impl OrderVault for InMemoryOrderVault {
    fn pending_transfer_in(&self, token: &Address) -> TokenAmount {
        self.unrecorded
            .get(token)
            .map(|amount| *amount)
            .unwrap_or(TokenAmount::ZERO)
    }

    fn record_transfer_in(&self, token: &Address) -> TokenAmount {
        let amount = self
            .unrecorded
            .remove(token)
            .map(|(_, amount)| amount)
            .unwrap_or(TokenAmount::ZERO);
        let mut balance = self.balances.entry(*token).or_insert(TokenAmount::ZERO);
        *balance = *balance + amount;
        amount
    }
}

// ============================================================================
// InMemorySwapHandler
// ============================================================================

/// Prices each hop at `amount_in * price_in.min / price_out.max`.
#[derive(Debug, Default)]
pub struct InMemorySwapHandler {
    executed: Mutex<Vec<SwapParams>>,
}

impl InMemorySwapHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hops executed so far.
    #[must_use]
    pub fn executed(&self) -> Vec<SwapParams> {
        self.executed.lock().clone()
    }
}

impl SwapHandler for InMemorySwapHandler {
    fn quote(&self, params: &SwapParams) -> VenueResult<TokenAmount> {
        let price_out = params.price_out.max.inner();
        if price_out.is_zero() {
            return Err(VenueError::SwapFailed(format!(
                "zero output price for {}",
                params.token_out
            )));
        }

        let amount_out = params
            .amount_in
            .inner()
            .checked_mul(params.price_in.min.inner())
            .and_then(|v| v.checked_div(price_out))
            .ok_or_else(|| VenueError::SwapFailed("overflow computing output".to_string()))?;
        let amount_out = TokenAmount::new(amount_out.max(Decimal::ZERO));

        if amount_out < params.min_output_amount {
            return Err(VenueError::InsufficientSwapOutput {
                actual: amount_out,
                minimum: params.min_output_amount,
            });
        }

        Ok(amount_out)
    }

    fn swap(&self, params: &SwapParams) -> VenueResult<TokenAmount> {
        let amount_out = self.quote(params)?;
        self.executed.lock().push(params.clone());
        debug!(token_in = %params.token_in, token_out = %params.token_out, %amount_out, "Swap executed");
        Ok(amount_out)
    }
}

// ============================================================================
// InMemoryReferralStorage
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryReferralStorage {
    codes: DashMap<Address, B256>,
}

impl InMemoryReferralStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_trader_referral_code(&self, account: Address, code: B256) {
        self.codes.insert(account, code);
    }
}

impl ReferralStorage for InMemoryReferralStorage {
    fn trader_referral_code(&self, account: &Address) -> Option<B256> {
        self.codes.get(account).map(|code| *code)
    }
}
