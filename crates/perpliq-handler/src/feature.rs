//! Administrative kill switches keyed by (handler, order type).

use perpliq_core::{keys, Address, OrderType, B256};
use perpliq_venue::DataStore;
use tracing::warn;

use crate::error::{HandlerResult, LiquidationError};

pub struct FeatureGate;

impl FeatureGate {
    /// Key of the execute-order kill switch for `order_type` via `module`.
    pub fn execute_order_key(module: Address, order_type: OrderType) -> B256 {
        keys::execute_order_feature_disabled_key(module, order_type)
    }

    /// Key of the ADL kill switch for `order_type` via `module`.
    pub fn execute_adl_key(module: Address, order_type: OrderType) -> B256 {
        keys::execute_adl_feature_disabled_key(module, order_type)
    }

    /// Fail if the flag at `key` is set.
    pub fn check(data_store: &dyn DataStore, key: B256, order_type: OrderType) -> HandlerResult<()> {
        if data_store.get_bool(&key) {
            warn!(%order_type, %key, "Feature disabled");
            return Err(LiquidationError::FeatureDisabled { order_type, key });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perpliq_venue::InMemoryDataStore;

    #[test]
    fn test_disabled_flag_rejects() {
        let store = InMemoryDataStore::new(Address::repeat_byte(0xd5));
        let module = Address::repeat_byte(0xaa);
        let key = FeatureGate::execute_order_key(module, OrderType::Liquidation);

        assert!(FeatureGate::check(&store, key, OrderType::Liquidation).is_ok());

        store.set_bool(key, true);
        assert!(matches!(
            FeatureGate::check(&store, key, OrderType::Liquidation),
            Err(LiquidationError::FeatureDisabled {
                order_type: OrderType::Liquidation,
                ..
            })
        ));

        let other = FeatureGate::execute_order_key(module, OrderType::MarketDecrease);
        assert!(FeatureGate::check(&store, other, OrderType::MarketDecrease).is_ok());
    }
}
