//! In-memory oracle price table.

use std::collections::HashMap;

use parking_lot::RwLock;
use perpliq_core::{Address, PriceProps};
use tracing::debug;

use crate::error::{VenueError, VenueResult};
use crate::oracle::Oracle;

#[derive(Debug, Default)]
pub struct InMemoryOracle {
    prices: RwLock<HashMap<Address, PriceProps>>,
}

impl InMemoryOracle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Oracle for InMemoryOracle {
    fn set_primary_price(&self, token: Address, props: PriceProps) -> VenueResult<()> {
        let mut prices = self.prices.write();
        if prices.contains_key(&token) {
            return Err(VenueError::PriceAlreadySet(token));
        }
        prices.insert(token, props);
        Ok(())
    }

    fn get_primary_price(&self, token: &Address) -> Option<PriceProps> {
        self.prices.read().get(token).copied()
    }

    fn clear_all_prices(&self) {
        let mut prices = self.prices.write();
        let cleared = prices.len();
        prices.clear();
        debug!(cleared, "Oracle prices cleared");
    }

    fn tokens_with_prices(&self) -> usize {
        self.prices.read().len()
    }
}
