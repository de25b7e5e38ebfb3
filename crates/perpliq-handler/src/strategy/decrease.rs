//! Position decrease, used by liquidations and ADL.

use perpliq_core::{EventKind, PositionDescriptor, Price, TokenAmount, Usd};
use tracing::{debug, info};

use super::{finalize_order, validate_executable, OrderStrategy};
use crate::context::ExecutionContext;
use crate::error::StrategyError;

const DECREASE_COST: u64 = 40_000;

/// Closes all or part of the order's position at the window price.
#[derive(Debug, Default, Clone, Copy)]
pub struct DecreaseStrategy;

impl OrderStrategy for DecreaseStrategy {
    fn name(&self) -> &'static str {
        "decrease"
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<(), StrategyError> {
        let order = validate_executable(ctx, DECREASE_COST)?;

        let descriptor = PositionDescriptor::new(
            order.account,
            order.market,
            order.initial_collateral_token,
            order.is_long,
        );
        let data_store = ctx.data_store();
        let mut position = data_store
            .get_position(&descriptor.key())
            .filter(|p| !p.is_empty())
            .ok_or(StrategyError::PositionNotFound(ctx.key))?;

        if order.size_delta_usd > position.size_in_usd {
            return Err(StrategyError::SizeDeltaExceedsPosition {
                requested: order.size_delta_usd,
                available: position.size_in_usd,
            });
        }

        // Closing a long sells at the low side of the spread, a short buys
        // back at the high side.
        let execution_price = ctx
            .price(&order.initial_collateral_token)?
            .pick(!order.is_long);
        check_acceptable_price(order.is_long, execution_price, order.acceptable_price)?;

        let remaining = position
            .size_in_usd
            .checked_sub(order.size_delta_usd)
            .ok_or(StrategyError::Overflow("remaining size"))?;
        if remaining.is_zero() {
            data_store.remove_position(&descriptor.key());
            debug!(key = %ctx.key, position = %descriptor, "Position closed");
        } else {
            let tokens_closed =
                tokens_closed(position.size_in_tokens, order.size_delta_usd, position.size_in_usd)?;
            position.size_in_tokens = position
                .size_in_tokens
                .checked_sub(tokens_closed)
                .ok_or(StrategyError::Overflow("remaining tokens"))?;
            position.size_in_usd = remaining;
            position.decreased_at_block = data_store.current_block();
            data_store.set_position(position);
            debug!(key = %ctx.key, %remaining, "Position reduced");
        }

        ctx.emit(EventKind::PositionDecrease {
            order_key: ctx.key,
            account: order.account,
            market: order.market,
            size_delta_usd: order.size_delta_usd,
            remaining_size_usd: remaining,
            execution_price,
            referral_code: ctx.contracts.referral_storage.trader_referral_code(&order.account),
        });

        finalize_order(ctx)?;
        info!(
            key = %ctx.key,
            size_delta_usd = %order.size_delta_usd,
            %execution_price,
            secondary = %ctx.secondary_order_type,
            "Decrease executed"
        );
        Ok(())
    }
}

/// `size_in_tokens * size_delta_usd / size_in_usd`, the tokens released by
/// closing `size_delta_usd` of the position.
fn tokens_closed(
    size_in_tokens: TokenAmount,
    size_delta_usd: Usd,
    size_in_usd: Usd,
) -> Result<TokenAmount, StrategyError> {
    size_in_tokens
        .inner()
        .checked_mul(size_delta_usd.inner())
        .and_then(|scaled| scaled.checked_div(size_in_usd.inner()))
        .map(TokenAmount::new)
        .ok_or(StrategyError::Overflow("tokens closed"))
}

/// Longs must sell at or above, shorts buy at or below, the acceptable price.
fn check_acceptable_price(
    is_long: bool,
    execution_price: Price,
    acceptable_price: Price,
) -> Result<(), StrategyError> {
    let ok = if is_long {
        execution_price >= acceptable_price
    } else {
        execution_price <= acceptable_price
    };
    if ok {
        Ok(())
    } else {
        Err(StrategyError::AcceptablePriceNotMet {
            execution_price,
            acceptable_price,
        })
    }
}
