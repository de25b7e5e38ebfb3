//! Order-type-specific execution strategies.
//!
//! The dispatcher resolves an order's type to a [`StrategyKind`] through a
//! routing table, then looks the kind up in a registry of
//! [`OrderStrategy`] implementations. Both are fixed at construction, and
//! either can be replaced without touching the handler.

mod decrease;
mod generic;
mod increase;
mod swap;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use perpliq_core::{EventKind, Order, OrderStatus, OrderType};
use perpliq_telemetry::Metrics;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::context::ExecutionContext;
use crate::error::{HandlerResult, StrategyError};

pub use decrease::DecreaseStrategy;
pub use generic::GenericStrategy;
pub use increase::IncreaseStrategy;
pub use swap::SwapStrategy;

/// Executes one kind of order against an [`ExecutionContext`].
#[cfg_attr(test, mockall::automock)]
pub trait OrderStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Apply the order. Must finalize it (status `Executed`) on success.
    fn execute(&self, ctx: &ExecutionContext) -> Result<(), StrategyError>;
}

/// Closed set of strategy slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Generic,
    Increase,
    Decrease,
    Swap,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Increase => "increase",
            Self::Decrease => "decrease",
            Self::Swap => "swap",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Routing
// ============================================================================

/// Order type to strategy kind. Unmapped types route to `Generic`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyRoutes {
    routes: HashMap<OrderType, StrategyKind>,
}

impl StrategyRoutes {
    /// Table with no entries; everything routes to `Generic`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Bind `order_type` to `kind`, replacing any previous binding.
    #[must_use]
    pub fn set(mut self, order_type: OrderType, kind: StrategyKind) -> Self {
        self.routes.insert(order_type, kind);
        self
    }

    pub fn resolve(&self, order_type: OrderType) -> StrategyKind {
        self.routes
            .get(&order_type)
            .copied()
            .unwrap_or(StrategyKind::Generic)
    }
}

impl Default for StrategyRoutes {
    fn default() -> Self {
        OrderType::ALL
            .into_iter()
            .fold(Self::empty(), |routes, order_type| {
                let kind = if order_type.is_swap() {
                    StrategyKind::Swap
                } else if order_type.is_increase() {
                    StrategyKind::Increase
                } else if order_type.is_decrease() {
                    StrategyKind::Decrease
                } else {
                    StrategyKind::Generic
                };
                routes.set(order_type, kind)
            })
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<StrategyKind, Arc<dyn OrderStrategy>>,
}

impl StrategyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the four built-in strategies.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(StrategyKind::Generic, Arc::new(GenericStrategy));
        registry.register(StrategyKind::Increase, Arc::new(IncreaseStrategy));
        registry.register(StrategyKind::Decrease, Arc::new(DecreaseStrategy));
        registry.register(StrategyKind::Swap, Arc::new(SwapStrategy));
        registry
    }

    /// Install `strategy` in slot `kind`, returning the one it replaces.
    pub fn register(
        &mut self,
        kind: StrategyKind,
        strategy: Arc<dyn OrderStrategy>,
    ) -> Option<Arc<dyn OrderStrategy>> {
        debug!(%kind, strategy = strategy.name(), "Strategy registered");
        self.strategies.insert(kind, strategy)
    }

    pub fn get(&self, kind: StrategyKind) -> Option<Arc<dyn OrderStrategy>> {
        self.strategies.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut slots: Vec<_> = self
            .strategies
            .iter()
            .map(|(kind, s)| (kind.as_str(), s.name()))
            .collect();
        slots.sort_unstable();
        f.debug_struct("StrategyRegistry")
            .field("strategies", &slots)
            .finish()
    }
}

// ============================================================================
// Dispatch
// ============================================================================

#[derive(Debug, Clone)]
pub struct StrategyDispatcher {
    routes: StrategyRoutes,
    registry: StrategyRegistry,
}

impl StrategyDispatcher {
    #[must_use]
    pub fn new(routes: StrategyRoutes, registry: StrategyRegistry) -> Self {
        Self { routes, registry }
    }

    /// Default routes over the built-in strategies.
    #[must_use]
    pub fn with_builtin() -> Self {
        Self::new(StrategyRoutes::default(), StrategyRegistry::with_builtin())
    }

    pub fn routes(&self) -> &StrategyRoutes {
        &self.routes
    }

    /// Kind and strategy that would execute `order_type`. A route to an
    /// empty slot falls back to the generic strategy.
    pub fn resolve(
        &self,
        order_type: OrderType,
    ) -> Result<(StrategyKind, Arc<dyn OrderStrategy>), StrategyError> {
        let kind = self.routes.resolve(order_type);
        if let Some(strategy) = self.registry.get(kind) {
            return Ok((kind, strategy));
        }
        warn!(%kind, %order_type, "No strategy in slot, falling back to generic");
        self.registry
            .get(StrategyKind::Generic)
            .map(|strategy| (StrategyKind::Generic, strategy))
            .ok_or(StrategyError::NoStrategy(kind))
    }

    /// Execute `ctx.order` with its resolved strategy.
    ///
    /// # Errors
    /// `ExecutionFailed` wrapping the strategy's failure, or
    /// `ComputeBudgetExceeded` if the strategy ran out of budget.
    pub fn invoke(&self, ctx: &ExecutionContext) -> HandlerResult<StrategyKind> {
        let order_type = ctx.order.order_type;
        let (kind, strategy) = self.resolve(order_type)?;

        Metrics::strategy_dispatched(kind.as_str(), order_type.as_str());
        debug!(
            key = %ctx.key,
            %order_type,
            %kind,
            strategy = strategy.name(),
            "Dispatching order"
        );

        strategy.execute(ctx)?;
        Ok(kind)
    }
}

// ============================================================================
// Shared steps
// ============================================================================

pub(crate) const VALIDATE_COST: u64 = 2_000;
pub(crate) const FINALIZE_COST: u64 = 3_000;

/// Charge the whole cost of executing the order (validation, the
/// strategy's own `execution_cost` and finalization) up front, then
/// reject orders that cannot be executed in their current state.
pub(crate) fn validate_executable(
    ctx: &ExecutionContext,
    execution_cost: u64,
) -> Result<&Order, StrategyError> {
    ctx.charge(
        VALIDATE_COST
            .saturating_add(execution_cost)
            .saturating_add(FINALIZE_COST),
    )?;
    let order = &ctx.order;
    if order.is_frozen {
        return Err(StrategyError::OrderFrozen(ctx.key));
    }
    if !order.is_pending() {
        return Err(StrategyError::OrderNotPending {
            key: ctx.key,
            status: order.status,
        });
    }
    Ok(order)
}

/// Mark the order executed and announce it.
pub(crate) fn finalize_order(ctx: &ExecutionContext) -> Result<(), StrategyError> {
    ctx.data_store()
        .set_order_status(&ctx.key, OrderStatus::Executed)?;
    ctx.emit(EventKind::OrderExecuted {
        key: ctx.key,
        secondary_order_type: ctx.secondary_order_type,
    });
    Ok(())
}
