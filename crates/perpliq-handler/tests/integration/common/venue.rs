//! In-memory venue wired up for handler tests.

use std::sync::Arc;

use perpliq_core::{
    Address, Position, PositionDescriptor, Price, PriceSet, Role, TokenAmount, Usd,
};
use perpliq_handler::{HandlerConfig, LiquidationHandler, StrategyDispatcher};
use perpliq_venue::{
    Contracts, DataStore, EventLog, InMemoryDataStore, InMemoryOracle, InMemoryOrderVault,
    InMemoryReferralStorage, InMemoryRoleStore, InMemorySwapHandler,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const ACCOUNT: Address = Address::new([0xa1; 20]);
pub const MARKET: Address = Address::new([0xb2; 20]);
pub const COLLATERAL: Address = Address::new([0xc3; 20]);
pub const KEEPER: Address = Address::new([0x4b; 20]);
pub const HANDLER: Address = Address::new([0x1f; 20]);
pub const STORE: Address = Address::new([0xd5; 20]);

pub struct Venue {
    pub data_store: Arc<InMemoryDataStore>,
    pub role_store: Arc<InMemoryRoleStore>,
    pub events: Arc<EventLog>,
    pub oracle: Arc<InMemoryOracle>,
    pub vault: Arc<InMemoryOrderVault>,
    pub swap_handler: Arc<InMemorySwapHandler>,
    pub contracts: Contracts,
}

impl Venue {
    pub fn new() -> Self {
        let data_store = Arc::new(InMemoryDataStore::new(STORE));
        data_store.set_current_block(1_000);
        let role_store = Arc::new(InMemoryRoleStore::new());
        role_store.grant_role(KEEPER, &Role::liquidation_keeper());
        role_store.grant_role(KEEPER, &Role::adl_keeper());
        let events = Arc::new(EventLog::new());
        let oracle = Arc::new(InMemoryOracle::new());
        let vault = Arc::new(InMemoryOrderVault::new());
        let swap_handler = Arc::new(InMemorySwapHandler::new());

        let contracts = Contracts {
            data_store: data_store.clone(),
            role_store: role_store.clone(),
            event_emitter: events.clone(),
            order_vault: vault.clone(),
            oracle: oracle.clone(),
            swap_handler: swap_handler.clone(),
            referral_storage: Arc::new(InMemoryReferralStorage::new()),
        };

        Self {
            data_store,
            role_store,
            events,
            oracle,
            vault,
            swap_handler,
            contracts,
        }
    }

    pub fn handler(&self, dispatcher: StrategyDispatcher) -> Arc<LiquidationHandler> {
        self.handler_with_config(dispatcher, HandlerConfig::default())
    }

    pub fn handler_with_config(
        &self,
        dispatcher: StrategyDispatcher,
        config: HandlerConfig,
    ) -> Arc<LiquidationHandler> {
        Arc::new(LiquidationHandler::new(
            HANDLER,
            config,
            self.contracts.clone(),
            dispatcher,
        ))
    }

    /// Long position of `size` USD in (ACCOUNT, MARKET, COLLATERAL).
    pub fn seed_long(&self, size: Decimal) -> PositionDescriptor {
        let descriptor = PositionDescriptor::new(ACCOUNT, MARKET, COLLATERAL, true);
        let mut position = Position::empty(&descriptor);
        position.size_in_usd = Usd::new(size);
        position.size_in_tokens = TokenAmount::new(size / dec!(100));
        position.collateral_amount = TokenAmount::new(dec!(5));
        position.increased_at_block = 900;
        self.data_store.set_position(position);
        descriptor
    }

    pub fn position(&self, descriptor: &PositionDescriptor) -> Option<Position> {
        self.data_store.get_position(&descriptor.key())
    }
}

/// `{COLLATERAL: 100}`
pub fn prices() -> PriceSet {
    PriceSet::new().with_price(COLLATERAL, Price::new(dec!(100)))
}
