//! Fallback for order types without a dedicated strategy.

use tracing::info;

use super::{finalize_order, validate_executable, OrderStrategy};
use crate::context::ExecutionContext;
use crate::error::StrategyError;

const GENERIC_COST: u64 = 5_000;

/// Validates the order against the open window and finalizes it.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericStrategy;

impl OrderStrategy for GenericStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn execute(&self, ctx: &ExecutionContext) -> Result<(), StrategyError> {
        let order = validate_executable(ctx, GENERIC_COST)?;
        ctx.price(&order.initial_collateral_token)?;

        finalize_order(ctx)?;
        info!(key = %ctx.key, order_type = %order.order_type, "Order executed");
        Ok(())
    }
}
