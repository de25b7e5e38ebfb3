//! Per-call execution context handed to strategies.

use perpliq_core::{
    Address, Event, EventKind, Order, OrderKey, PriceProps, PriceSet, SecondaryOrderType,
};
use perpliq_venue::{Contracts, DataStore};
use tracing::debug;

use crate::budget::ComputeMeter;
use crate::error::{HandlerResult, LiquidationError, StrategyError};

/// Everything a strategy needs to execute one order.
///
/// Built fresh for every call and never persisted. `contracts` routes
/// events into the call's buffer, so strategies emit through it like any
/// other sink.
#[derive(Debug)]
pub struct ExecutionContext {
    pub key: OrderKey,
    pub order: Order,
    pub market: Address,
    pub contracts: Contracts,
    pub caller: Address,
    pub secondary_order_type: SecondaryOrderType,
    pub budget: ComputeMeter,
}

impl ExecutionContext {
    pub fn compute_budget_remaining(&self) -> u64 {
        self.budget.remaining()
    }

    /// Charge `units` against the strategy's share of the budget.
    pub fn charge(&self, units: u64) -> Result<(), StrategyError> {
        self.budget.charge(units)?;
        Ok(())
    }

    /// Window price of `token`.
    pub fn price(&self, token: &Address) -> Result<PriceProps, StrategyError> {
        self.contracts
            .oracle
            .get_primary_price(token)
            .ok_or(StrategyError::MissingPrice(*token))
    }

    pub fn data_store(&self) -> &dyn DataStore {
        self.contracts.data_store.as_ref()
    }

    pub fn emit(&self, kind: EventKind) {
        self.contracts.event_emitter.emit(Event::new(kind));
    }
}

/// Reads an order back and assembles its [`ExecutionContext`].
pub struct ExecutionContextBuilder<'a> {
    contracts: &'a Contracts,
}

impl<'a> ExecutionContextBuilder<'a> {
    #[must_use]
    pub fn new(contracts: &'a Contracts) -> Self {
        Self { contracts }
    }

    /// # Errors
    /// - `OrderNotFound` if `order_key` does not resolve
    /// - `OrderNotExecutable` if the order is no longer pending
    /// - `InvalidPriceSet` if a token of `price_set` has no window price
    pub fn build(
        &self,
        order_key: OrderKey,
        price_set: &PriceSet,
        caller: Address,
        compute_budget: u64,
        secondary_order_type: SecondaryOrderType,
    ) -> HandlerResult<ExecutionContext> {
        let data_store = self.contracts.data_store.as_ref();
        let order = data_store
            .get_order(&order_key)
            .ok_or(LiquidationError::OrderNotFound(order_key))?;

        if !order.is_pending() {
            return Err(LiquidationError::OrderNotExecutable {
                key: order_key,
                reason: format!("status is {:?}", order.status),
            });
        }

        if let Some(token) = price_set
            .tokens()
            .find(|token| self.contracts.oracle.get_primary_price(token).is_none())
        {
            return Err(LiquidationError::InvalidPriceSet(format!(
                "token {token} has no price in the open window"
            )));
        }

        debug!(
            key = %order_key,
            order_type = %order.order_type,
            %secondary_order_type,
            compute_budget,
            "Execution context built"
        );

        Ok(ExecutionContext {
            key: order_key,
            market: order.market,
            order,
            contracts: self.contracts.clone(),
            caller,
            secondary_order_type,
            budget: ComputeMeter::new(compute_budget),
        })
    }
}
