//! Position increase.

use perpliq_core::{EventKind, Position, PositionDescriptor, TokenAmount};
use tracing::{info, warn};

use super::{finalize_order, validate_executable, OrderStrategy};
use crate::context::ExecutionContext;
use crate::error::StrategyError;

const INCREASE_COST: u64 = 50_000;

/// Opens or grows the order's position with the collateral sent to the vault.
#[derive(Debug, Default, Clone, Copy)]
pub struct IncreaseStrategy;

impl OrderStrategy for IncreaseStrategy {
    fn name(&self) -> &'static str {
        "increase"
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<(), StrategyError> {
        let order = validate_executable(ctx, INCREASE_COST)?;

        // Opening a long buys at the high side, a short sells at the low side.
        let execution_price = ctx
            .price(&order.initial_collateral_token)?
            .pick(order.is_long);
        let within_limit = if order.is_long {
            execution_price <= order.acceptable_price
        } else {
            execution_price >= order.acceptable_price
        };
        if !within_limit {
            return Err(StrategyError::AcceptablePriceNotMet {
                execution_price,
                acceptable_price: order.acceptable_price,
            });
        }
        if !execution_price.is_positive() {
            return Err(StrategyError::Other(format!(
                "non-positive execution price {execution_price}"
            )));
        }

        let descriptor = PositionDescriptor::new(
            order.account,
            order.market,
            order.initial_collateral_token,
            order.is_long,
        );
        let data_store = ctx.data_store();
        let mut position = data_store
            .get_position(&descriptor.key())
            .unwrap_or_else(|| Position::empty(&descriptor));

        // Settle the new position fully before claiming the vault deposit.
        let collateral = ctx
            .contracts
            .order_vault
            .pending_transfer_in(&order.initial_collateral_token);
        let tokens_opened = order
            .size_delta_usd
            .inner()
            .checked_div(execution_price.inner())
            .map(TokenAmount::new)
            .ok_or(StrategyError::Overflow("tokens opened"))?;
        position.size_in_usd = position
            .size_in_usd
            .checked_add(order.size_delta_usd)
            .ok_or(StrategyError::Overflow("position size"))?;
        position.size_in_tokens = position
            .size_in_tokens
            .checked_add(tokens_opened)
            .ok_or(StrategyError::Overflow("position tokens"))?;
        position.collateral_amount = position
            .collateral_amount
            .checked_add(collateral)
            .ok_or(StrategyError::Overflow("collateral"))?;
        position.increased_at_block = data_store.current_block();
        let size_in_usd = position.size_in_usd;

        let claimed = ctx
            .contracts
            .order_vault
            .record_transfer_in(&order.initial_collateral_token);
        if claimed != collateral {
            warn!(key = %ctx.key, %collateral, %claimed, "Vault balance moved while settling");
        }
        data_store.set_position(position);

        ctx.emit(EventKind::PositionIncrease {
            order_key: ctx.key,
            account: order.account,
            market: order.market,
            size_delta_usd: order.size_delta_usd,
            execution_price,
            referral_code: ctx.contracts.referral_storage.trader_referral_code(&order.account),
        });

        finalize_order(ctx)?;
        info!(
            key = %ctx.key,
            size_delta_usd = %order.size_delta_usd,
            %size_in_usd,
            %collateral,
            "Increase executed"
        );
        Ok(())
    }
}
