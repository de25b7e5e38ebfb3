//! Shared fixtures for unit tests.

use std::sync::Arc;

use perpliq_core::{Address, Position, PositionDescriptor, TokenAmount, Usd};
use perpliq_venue::{
    Contracts, DataStore, EventLog, InMemoryDataStore, InMemoryOracle, InMemoryOrderVault,
    InMemoryReferralStorage, InMemoryRoleStore, InMemorySwapHandler,
};
use rust_decimal::Decimal;

pub const ACCOUNT: Address = Address::new([0xa1; 20]);
pub const MARKET: Address = Address::new([0xb2; 20]);
pub const COLLATERAL: Address = Address::new([0xc3; 20]);
pub const STORE: Address = Address::new([0xd5; 20]);

pub struct Fixture {
    pub data_store: Arc<InMemoryDataStore>,
    pub role_store: Arc<InMemoryRoleStore>,
    pub events: Arc<EventLog>,
    pub vault: Arc<InMemoryOrderVault>,
    pub oracle: Arc<InMemoryOracle>,
    pub swap_handler: Arc<InMemorySwapHandler>,
    pub referrals: Arc<InMemoryReferralStorage>,
    pub contracts: Contracts,
}

pub fn fixture() -> Fixture {
    let data_store = Arc::new(InMemoryDataStore::new(STORE));
    data_store.set_current_block(100);
    let role_store = Arc::new(InMemoryRoleStore::new());
    let events = Arc::new(EventLog::new());
    let vault = Arc::new(InMemoryOrderVault::new());
    let oracle = Arc::new(InMemoryOracle::new());
    let swap_handler = Arc::new(InMemorySwapHandler::new());
    let referrals = Arc::new(InMemoryReferralStorage::new());

    let contracts = Contracts {
        data_store: data_store.clone(),
        role_store: role_store.clone(),
        event_emitter: events.clone(),
        order_vault: vault.clone(),
        oracle: oracle.clone(),
        swap_handler: swap_handler.clone(),
        referral_storage: referrals.clone(),
    };

    Fixture {
        data_store,
        role_store,
        events,
        vault,
        oracle,
        swap_handler,
        referrals,
        contracts,
    }
}

/// Store a position of `size` USD backed by `size / 100` tokens.
pub fn seed_position(f: &Fixture, descriptor: &PositionDescriptor, size: Decimal) {
    let mut position = Position::empty(descriptor);
    position.size_in_usd = Usd::new(size);
    position.size_in_tokens = TokenAmount::new(size / Decimal::ONE_HUNDRED);
    position.collateral_amount = TokenAmount::new(Decimal::TEN);
    position.increased_at_block = 1;
    f.data_store.set_position(position);
}
