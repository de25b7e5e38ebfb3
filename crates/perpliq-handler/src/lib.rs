//! Guarded liquidation orchestration for perpliq.
//!
//! [`LiquidationHandler`] is the caller-facing entry point. A call is
//! authorized against a keeper role, serialized by an [`ExclusionGuard`],
//! priced through a scoped [`PriceWindow`], turned into a system-derived
//! order by [`LiquidationOrderFactory`] and executed by the strategy that
//! [`StrategyDispatcher`] resolves for the order's type.
//!
//! Any failure after the guard is acquired leaves no trace besides a
//! single `LiquidationAborted` event.
//!
//! # Example
//!
//! ```ignore
//! let handler = LiquidationHandler::new(
//!     handler_address,
//!     HandlerConfig::default(),
//!     contracts,
//!     StrategyDispatcher::with_builtin(),
//! );
//! let prices = PriceSet::new().with_price(collateral, Price::new(dec!(100)));
//! let receipt = handler.execute_liquidation(keeper, account, market, collateral, true, &prices)?;
//! ```

pub mod access;
pub mod budget;
pub mod checkpoint;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod feature;
pub mod guard;
pub mod handler;
pub mod order_factory;
pub mod price_window;
pub mod strategy;

#[cfg(test)]
mod testutil;

pub use access::AccessPolicyGate;
pub use budget::ComputeMeter;
pub use checkpoint::StoreCheckpoint;
pub use config::HandlerConfig;
pub use context::{ExecutionContext, ExecutionContextBuilder};
pub use error::{BudgetExceeded, HandlerResult, LiquidationError, StrategyError};
pub use events::EventBuffer;
pub use feature::FeatureGate;
pub use guard::{ExclusionGuard, ExclusionToken};
pub use handler::{ExecutionReceipt, LiquidationHandler};
pub use order_factory::LiquidationOrderFactory;
pub use price_window::{OpenPriceWindow, PriceWindow};
pub use strategy::{
    DecreaseStrategy, GenericStrategy, IncreaseStrategy, OrderStrategy, StrategyDispatcher,
    StrategyKind, StrategyRegistry, StrategyRoutes, SwapStrategy,
};
