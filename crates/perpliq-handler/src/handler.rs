//! Guarded liquidation and ADL entry points.
//!
//! Both entry points run the same protocol, in strict order:
//!
//! 1. authorize the caller against the operation's role
//! 2. acquire the exclusion guard
//! 3. open the price window
//! 4. derive and store the order from live position state
//! 5. read the order back into an execution context
//! 6. check the feature kill switch for the order's type
//! 7. dispatch to the order type's strategy
//! 8. close the price window
//!
//! Everything after step 2 is atomic: the data store is checkpointed and
//! events are buffered. A failure reverts the store, drops the buffered
//! events and emits a single `LiquidationAborted` instead. The checkpoint
//! and the guard are both released on drop, so a panicking strategy
//! unwinds without leaving either behind.

use std::sync::Arc;

use perpliq_core::{
    Address, Event, EventKind, OrderKey, OrderType, PositionDescriptor, PriceSet, Role,
    SecondaryOrderType, Usd, B256,
};
use perpliq_telemetry::Metrics;
use perpliq_venue::Contracts;
use tracing::{debug, info, info_span, warn};

use crate::access::AccessPolicyGate;
use crate::budget::ComputeMeter;
use crate::checkpoint::StoreCheckpoint;
use crate::config::HandlerConfig;
use crate::context::ExecutionContextBuilder;
use crate::error::{HandlerResult, LiquidationError};
use crate::events::EventBuffer;
use crate::feature::FeatureGate;
use crate::guard::ExclusionGuard;
use crate::order_factory::LiquidationOrderFactory;
use crate::price_window::PriceWindow;
use crate::strategy::{StrategyDispatcher, StrategyKind};

/// Which guarded operation a call runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Liquidation,
    Adl { size_delta_usd: Usd },
}

impl Operation {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Liquidation => "liquidation",
            Self::Adl { .. } => "adl",
        }
    }

    fn role(&self) -> Role {
        match self {
            Self::Liquidation => Role::liquidation_keeper(),
            Self::Adl { .. } => Role::adl_keeper(),
        }
    }

    fn secondary_order_type(&self) -> SecondaryOrderType {
        match self {
            Self::Liquidation => SecondaryOrderType::Liquidation,
            Self::Adl { .. } => SecondaryOrderType::Adl,
        }
    }

    fn feature_key(&self, module: Address, order_type: OrderType) -> B256 {
        match self {
            Self::Liquidation => FeatureGate::execute_order_key(module, order_type),
            Self::Adl { .. } => FeatureGate::execute_adl_key(module, order_type),
        }
    }
}

/// Outcome of a successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReceipt {
    pub order_key: OrderKey,
    pub order_type: OrderType,
    pub strategy: StrategyKind,
    pub compute_used: u64,
    pub events_emitted: usize,
}

/// Liquidation handler bound to one set of venue collaborators.
#[derive(Debug)]
pub struct LiquidationHandler {
    address: Address,
    config: HandlerConfig,
    contracts: Contracts,
    dispatcher: StrategyDispatcher,
    guard: ExclusionGuard,
}

impl LiquidationHandler {
    /// `address` identifies this handler in feature-flag keys.
    #[must_use]
    pub fn new(
        address: Address,
        config: HandlerConfig,
        contracts: Contracts,
        dispatcher: StrategyDispatcher,
    ) -> Self {
        info!(
            %address,
            data_store = %contracts.data_store.address(),
            compute_budget = config.compute_budget,
            "Liquidation handler created"
        );
        Self {
            address,
            config,
            contracts,
            dispatcher,
            guard: ExclusionGuard::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn contracts(&self) -> &Contracts {
        &self.contracts
    }

    /// Whether a guarded call is currently running.
    pub fn is_locked(&self) -> bool {
        self.guard.is_in_progress()
    }

    /// Liquidate the position `(account, market, collateral_token, is_long)`
    /// in full, using `price_set` as the authoritative prices.
    ///
    /// Requires the liquidation keeper role.
    pub fn execute_liquidation(
        &self,
        caller: Address,
        account: Address,
        market: Address,
        collateral_token: Address,
        is_long: bool,
        price_set: &PriceSet,
    ) -> HandlerResult<ExecutionReceipt> {
        let position = PositionDescriptor::new(account, market, collateral_token, is_long);
        self.run(Operation::Liquidation, caller, &position, price_set)
    }

    /// Auto-deleverage the position by `size_delta_usd`.
    ///
    /// Requires the ADL keeper role.
    #[allow(clippy::too_many_arguments)]
    pub fn execute_adl(
        &self,
        caller: Address,
        account: Address,
        market: Address,
        collateral_token: Address,
        is_long: bool,
        size_delta_usd: Usd,
        price_set: &PriceSet,
    ) -> HandlerResult<ExecutionReceipt> {
        let position = PositionDescriptor::new(account, market, collateral_token, is_long);
        self.run(Operation::Adl { size_delta_usd }, caller, &position, price_set)
    }

    fn run(
        &self,
        operation: Operation,
        caller: Address,
        position: &PositionDescriptor,
        price_set: &PriceSet,
    ) -> HandlerResult<ExecutionReceipt> {
        let span = info_span!("handler_call", operation = operation.as_str(), %caller, %position);
        let _enter = span.enter();

        let result = self.guarded(operation, caller, position, price_set);
        match &result {
            Ok(receipt) => {
                Metrics::handler_succeeded(operation.as_str());
                Metrics::compute_used(operation.as_str(), receipt.compute_used);
                info!(
                    order_key = %receipt.order_key,
                    strategy = %receipt.strategy,
                    compute_used = receipt.compute_used,
                    events = receipt.events_emitted,
                    "Call succeeded"
                );
            }
            Err(e) => {
                Metrics::handler_rejected(operation.as_str(), e.reason());
                warn!(reason = e.reason(), error = %e, "Call aborted");
            }
        }
        result
    }

    fn guarded(
        &self,
        operation: Operation,
        caller: Address,
        position: &PositionDescriptor,
        price_set: &PriceSet,
    ) -> HandlerResult<ExecutionReceipt> {
        AccessPolicyGate::authorize(
            self.contracts.role_store.as_ref(),
            &caller,
            &operation.role(),
        )?;
        let token = self.guard.enter()?;

        let meter = ComputeMeter::new(self.config.compute_budget);
        let buffer = Arc::new(EventBuffer::new());
        let mut checkpoint = match StoreCheckpoint::open(self.contracts.data_store.as_ref()) {
            Ok(checkpoint) => checkpoint,
            Err(e) => {
                self.emit_aborted(position, &e);
                return Err(e);
            }
        };

        let outcome = self
            .protocol(operation, caller, position, price_set, &meter, &buffer)
            .and_then(|done| {
                checkpoint.commit()?;
                Ok(done)
            });
        let result = match outcome {
            Ok((order_key, order_type, strategy)) => {
                let events_emitted = buffer.flush_to(self.contracts.event_emitter.as_ref());
                Ok(ExecutionReceipt {
                    order_key,
                    order_type,
                    strategy,
                    compute_used: meter.used(),
                    events_emitted,
                })
            }
            Err(e) => {
                let undone = checkpoint.revert();
                let discarded = buffer.discard();
                debug!(undone, discarded, "Call effects rolled back");
                self.emit_aborted(position, &e);
                Err(e)
            }
        };

        token.exit();
        result
    }

    fn emit_aborted(&self, position: &PositionDescriptor, error: &LiquidationError) {
        self.contracts
            .event_emitter
            .emit(Event::new(EventKind::LiquidationAborted {
                account: position.account,
                market: position.market,
                reason: error.reason().to_string(),
            }));
    }

    fn protocol(
        &self,
        operation: Operation,
        caller: Address,
        position: &PositionDescriptor,
        price_set: &PriceSet,
        meter: &ComputeMeter,
        buffer: &Arc<EventBuffer>,
    ) -> HandlerResult<(OrderKey, OrderType, StrategyKind)> {
        let contracts = self.contracts.with_event_emitter(buffer.clone());
        let data_store = contracts.data_store.as_ref();
        let step = self.config.step_cost;

        meter.charge(step)?;
        let window = PriceWindow::open(
            contracts.oracle.as_ref(),
            data_store,
            buffer.as_ref(),
            price_set,
            self.config.max_price_age_blocks,
        )?;

        meter.charge(step)?;
        let order_key = match operation {
            Operation::Liquidation => {
                LiquidationOrderFactory::create(data_store, buffer.as_ref(), position)?
            }
            Operation::Adl { size_delta_usd } => LiquidationOrderFactory::create_adl(
                data_store,
                buffer.as_ref(),
                position,
                size_delta_usd,
            )?,
        };

        // Both remaining steps are paid before the strategy's share is cut.
        meter.charge(step)?;
        meter.charge(step)?;
        let ctx = ExecutionContextBuilder::new(&contracts).build(
            order_key,
            price_set,
            caller,
            meter.remaining(),
            operation.secondary_order_type(),
        )?;
        let order_type = ctx.order.order_type;

        FeatureGate::check(
            data_store,
            operation.feature_key(self.address, order_type),
            order_type,
        )?;

        let dispatched = self.dispatcher.invoke(&ctx);
        meter.charge(ctx.budget.used())?;
        let strategy = dispatched?;

        window.close()?;
        Ok((order_key, order_type, strategy))
    }
}
