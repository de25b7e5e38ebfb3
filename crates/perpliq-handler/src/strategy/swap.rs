//! Multi-hop swaps along an order's swap path.

use perpliq_core::{Address, EventKind, Order, PriceProps, TokenAmount};
use perpliq_venue::SwapParams;
use tracing::{debug, info};

use super::{finalize_order, validate_executable, OrderStrategy};
use crate::context::ExecutionContext;
use crate::error::StrategyError;

const SWAP_BASE_COST: u64 = 10_000;
const SWAP_HOP_COST: u64 = 25_000;

/// Swaps the order's collateral through each token of `swap_path`; the
/// last entry is the output token.
#[derive(Debug, Default, Clone, Copy)]
pub struct SwapStrategy;

impl SwapStrategy {
    /// Resolve every hop and its prices before anything moves.
    fn plan(
        ctx: &ExecutionContext,
        token_in: Address,
        path: &[Address],
    ) -> Result<Vec<(Address, Address, PriceProps, PriceProps)>, StrategyError> {
        if path.is_empty() {
            return Err(StrategyError::InvalidSwapPath("empty swap path".to_string()));
        }

        let mut hops = Vec::with_capacity(path.len());
        let mut from = token_in;
        for &to in path {
            if to == from {
                return Err(StrategyError::InvalidSwapPath(format!(
                    "hop swaps {from} into itself"
                )));
            }
            hops.push((from, to, ctx.price(&from)?, ctx.price(&to)?));
            from = to;
        }
        Ok(hops)
    }

    /// Quote the whole path, chaining each hop's output into the next.
    /// Only the last hop carries the order's minimum output.
    fn quote_path(
        ctx: &ExecutionContext,
        order: &Order,
        amount_in: TokenAmount,
        hops: Vec<(Address, Address, PriceProps, PriceProps)>,
    ) -> Result<Vec<SwapParams>, StrategyError> {
        let last = hops.len().saturating_sub(1);
        let mut amount = amount_in;
        let mut quoted = Vec::with_capacity(hops.len());
        for (i, (token_in, token_out, price_in, price_out)) in hops.into_iter().enumerate() {
            let params = SwapParams {
                order_key: ctx.key,
                token_in,
                token_out,
                amount_in: amount,
                min_output_amount: if i == last {
                    order.min_output_amount
                } else {
                    TokenAmount::ZERO
                },
                price_in,
                price_out,
                receiver: order.receiver,
            };
            amount = ctx.contracts.swap_handler.quote(&params)?;
            quoted.push(params);
        }
        Ok(quoted)
    }
}

impl OrderStrategy for SwapStrategy {
    fn name(&self) -> &'static str {
        "swap"
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<(), StrategyError> {
        let hop_count = ctx.order.swap_path.len() as u64;
        let cost = SWAP_BASE_COST.saturating_add(SWAP_HOP_COST.saturating_mul(hop_count));
        let order = validate_executable(ctx, cost)?;

        let hops = Self::plan(ctx, order.initial_collateral_token, &order.swap_path)?;
        let vault = ctx.contracts.order_vault.as_ref();
        let mut amount_in = vault.pending_transfer_in(&order.initial_collateral_token);
        if amount_in.is_zero() {
            amount_in = order.initial_collateral_delta_amount;
        }
        let quoted = Self::quote_path(ctx, order, amount_in, hops)?;

        // Every hop is quoted; from here on only the venue can fail.
        vault.record_transfer_in(&order.initial_collateral_token);
        let mut amount = amount_in;
        for (i, mut params) in quoted.into_iter().enumerate() {
            params.amount_in = amount;
            amount = ctx.contracts.swap_handler.swap(&params)?;
            debug!(
                key = %ctx.key,
                hop = i,
                token_in = %params.token_in,
                token_out = %params.token_out,
                amount_out = %amount,
                "Swap hop"
            );

            ctx.emit(EventKind::SwapExecuted {
                order_key: ctx.key,
                token_in: params.token_in,
                token_out: params.token_out,
                amount_out: amount,
            });
        }

        finalize_order(ctx)?;
        info!(key = %ctx.key, amount_out = %amount, "Swap executed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::{context, set_price, stored_order};
    use crate::testutil::{fixture, COLLATERAL, MARKET};
    use perpliq_core::{OrderType, Price};
    use perpliq_venue::{DataStore, OrderVault, VenueError};
    use rust_decimal_macros::dec;

    const USDC: Address = Address::new([0xe1; 20]);

    #[test]
    fn test_two_hop_swap() {
        let f = fixture();
        set_price(&f, COLLATERAL, Price::new(dec!(100)));
        set_price(&f, MARKET, Price::new(dec!(50)));
        set_price(&f, USDC, Price::new(dec!(1)));
        f.vault.deposit(COLLATERAL, TokenAmount::new(dec!(2)));
        let mut order = stored_order(&f, OrderType::MarketSwap, true);
        order.swap_path = vec![MARKET, USDC];
        order.min_output_amount = TokenAmount::new(dec!(200));
        let key = order.key;

        SwapStrategy.execute(&context(&f, order, 100_000)).unwrap();

        let hops = f.swap_handler.executed();
        assert_eq!(hops.len(), 2);
        assert_eq!(hops[0].amount_in, TokenAmount::new(dec!(2)));
        assert_eq!(hops[1].amount_in, TokenAmount::new(dec!(4)));
        assert_eq!(hops[0].min_output_amount, TokenAmount::ZERO);
        assert!(f.data_store.get_order(&key).unwrap().is_executed());
        assert_eq!(
            f.events.names(),
            vec!["SwapExecuted", "SwapExecuted", "OrderExecuted"]
        );
    }

    #[test]
    fn test_empty_path_rejected() {
        let f = fixture();
        set_price(&f, COLLATERAL, Price::new(dec!(100)));
        let order = stored_order(&f, OrderType::MarketSwap, true);

        assert!(matches!(
            SwapStrategy.execute(&context(&f, order, 100_000)),
            Err(StrategyError::InvalidSwapPath(_))
        ));
    }

    #[test]
    fn test_unpriced_hop_rejected_before_swapping() {
        let f = fixture();
        set_price(&f, COLLATERAL, Price::new(dec!(100)));
        set_price(&f, MARKET, Price::new(dec!(50)));
        let mut order = stored_order(&f, OrderType::MarketSwap, true);
        order.swap_path = vec![MARKET, USDC];

        assert!(matches!(
            SwapStrategy.execute(&context(&f, order, 100_000)),
            Err(StrategyError::MissingPrice(t)) if t == USDC
        ));
        assert!(f.swap_handler.executed().is_empty());
    }

    #[test]
    fn test_min_output_enforced_on_last_hop() {
        let f = fixture();
        set_price(&f, COLLATERAL, Price::new(dec!(100)));
        set_price(&f, USDC, Price::new(dec!(1)));
        f.vault.deposit(COLLATERAL, TokenAmount::new(dec!(1)));
        let mut order = stored_order(&f, OrderType::MarketSwap, true);
        order.swap_path = vec![USDC];
        order.min_output_amount = TokenAmount::new(dec!(150));

        assert!(matches!(
            SwapStrategy.execute(&context(&f, order, 100_000)),
            Err(StrategyError::Venue(VenueError::InsufficientSwapOutput { .. }))
        ));
        assert!(f.swap_handler.executed().is_empty());
        assert_eq!(f.vault.pending_transfer_in(&COLLATERAL), TokenAmount::new(dec!(1)));
    }

    #[test]
    fn test_last_hop_shortfall_executes_no_hop() {
        let f = fixture();
        set_price(&f, COLLATERAL, Price::new(dec!(100)));
        set_price(&f, MARKET, Price::new(dec!(50)));
        set_price(&f, USDC, Price::new(dec!(1)));
        f.vault.deposit(COLLATERAL, TokenAmount::new(dec!(2)));
        let mut order = stored_order(&f, OrderType::MarketSwap, true);
        order.swap_path = vec![MARKET, USDC];
        order.min_output_amount = TokenAmount::new(dec!(201));
        let key = order.key;

        assert!(matches!(
            SwapStrategy.execute(&context(&f, order, 100_000)),
            Err(StrategyError::Venue(VenueError::InsufficientSwapOutput { .. }))
        ));
        assert!(f.swap_handler.executed().is_empty());
        assert_eq!(f.vault.balance(&COLLATERAL), TokenAmount::ZERO);
        assert_eq!(f.vault.pending_transfer_in(&COLLATERAL), TokenAmount::new(dec!(2)));
        assert!(f.data_store.get_order(&key).unwrap().is_pending());
        assert!(f.events.is_empty());
    }

    #[test]
    fn test_path_cost_charged_before_swapping() {
        let f = fixture();
        set_price(&f, COLLATERAL, Price::new(dec!(100)));
        set_price(&f, MARKET, Price::new(dec!(50)));
        set_price(&f, USDC, Price::new(dec!(1)));
        f.vault.deposit(COLLATERAL, TokenAmount::new(dec!(2)));
        let mut order = stored_order(&f, OrderType::MarketSwap, true);
        order.swap_path = vec![MARKET, USDC];

        // Covers one hop but not two.
        assert!(matches!(
            SwapStrategy.execute(&context(&f, order, 45_000)),
            Err(StrategyError::Budget(_))
        ));
        assert!(f.swap_handler.executed().is_empty());
        assert_eq!(f.vault.pending_transfer_in(&COLLATERAL), TokenAmount::new(dec!(2)));
    }
}
