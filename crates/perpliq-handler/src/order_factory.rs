//! System-derived order creation.
//!
//! Liquidation and ADL orders are built entirely from live position state.
//! Callers only choose which position; they never supply order parameters
//! (apart from the ADL size delta).

use perpliq_core::{
    keys, DecreasePositionSwapType, Event, EventKind, Order, OrderKey, OrderStatus, OrderType,
    Position, PositionDescriptor, Price, TokenAmount, Usd,
};
use perpliq_venue::{DataStore, EventEmitter};
use tracing::{debug, info};

use crate::error::{HandlerResult, LiquidationError};

pub struct LiquidationOrderFactory;

impl LiquidationOrderFactory {
    /// Create a liquidation order closing the whole position.
    ///
    /// # Errors
    /// `EmptyPosition` if the position does not exist or has zero size.
    pub fn create(
        data_store: &dyn DataStore,
        event_emitter: &dyn EventEmitter,
        position: &PositionDescriptor,
    ) -> HandlerResult<OrderKey> {
        let live = Self::load_position(data_store, position)?;
        let size_delta_usd = live.size_in_usd;
        Self::persist(
            data_store,
            event_emitter,
            &live,
            OrderType::Liquidation,
            size_delta_usd,
        )
    }

    /// Create an auto-deleveraging order reducing the position by
    /// `size_delta_usd`.
    ///
    /// # Errors
    /// - `EmptyPosition` if the position does not exist or has zero size
    /// - `InvalidSizeDelta` if the delta is zero or exceeds the position
    pub fn create_adl(
        data_store: &dyn DataStore,
        event_emitter: &dyn EventEmitter,
        position: &PositionDescriptor,
        size_delta_usd: Usd,
    ) -> HandlerResult<OrderKey> {
        let live = Self::load_position(data_store, position)?;
        if !size_delta_usd.is_positive() {
            return Err(LiquidationError::InvalidSizeDelta(format!(
                "size delta must be positive, got {size_delta_usd}"
            )));
        }
        if size_delta_usd > live.size_in_usd {
            return Err(LiquidationError::InvalidSizeDelta(format!(
                "size delta {size_delta_usd} exceeds position size {}",
                live.size_in_usd
            )));
        }
        Self::persist(
            data_store,
            event_emitter,
            &live,
            OrderType::MarketDecrease,
            size_delta_usd,
        )
    }

    /// Next unique order key for `data_store`.
    pub fn next_key(data_store: &dyn DataStore) -> OrderKey {
        let nonce = data_store.increment_nonce();
        OrderKey::new(keys::order_key(data_store.address(), nonce))
    }

    fn load_position(
        data_store: &dyn DataStore,
        position: &PositionDescriptor,
    ) -> HandlerResult<Position> {
        data_store
            .get_position(&position.key())
            .filter(|p| !p.is_empty())
            .ok_or(LiquidationError::EmptyPosition(*position))
    }

    fn persist(
        data_store: &dyn DataStore,
        event_emitter: &dyn EventEmitter,
        position: &Position,
        order_type: OrderType,
        size_delta_usd: Usd,
    ) -> HandlerResult<OrderKey> {
        let key = Self::next_key(data_store);
        let order = Self::decrease_order(
            key,
            position,
            order_type,
            size_delta_usd,
            data_store.current_block(),
        );
        debug!(%key, %order_type, %size_delta_usd, "Order derived from position");

        data_store.insert_order(order)?;
        event_emitter.emit(Event::new(EventKind::OrderCreated {
            key,
            account: position.account,
            market: position.market,
            order_type,
            size_delta_usd,
        }));

        info!(%key, %order_type, account = %position.account, "Order created");
        Ok(key)
    }

    /// Forced decrease at any price: longs accept down to zero, shorts up
    /// to the maximum representable price.
    fn decrease_order(
        key: OrderKey,
        position: &Position,
        order_type: OrderType,
        size_delta_usd: Usd,
        block: u64,
    ) -> Order {
        let acceptable_price = if position.is_long {
            Price::ZERO
        } else {
            Price::MAX
        };

        Order {
            key,
            account: position.account,
            receiver: position.account,
            market: position.market,
            initial_collateral_token: position.collateral_token,
            swap_path: Vec::new(),
            size_delta_usd,
            initial_collateral_delta_amount: TokenAmount::ZERO,
            trigger_price: Price::ZERO,
            acceptable_price,
            execution_fee: TokenAmount::ZERO,
            callback_gas_limit: 0,
            min_output_amount: TokenAmount::ZERO,
            updated_at_block: block,
            order_type,
            decrease_position_swap_type: DecreasePositionSwapType::SwapPnlTokenToCollateralToken,
            is_long: position.is_long,
            should_unwrap_native_token: false,
            is_frozen: false,
            status: OrderStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perpliq_core::Address;
    use perpliq_venue::{EventLog, InMemoryDataStore};
    use rust_decimal_macros::dec;

    fn descriptor(is_long: bool) -> PositionDescriptor {
        PositionDescriptor::new(
            Address::repeat_byte(0xa1),
            Address::repeat_byte(0xb2),
            Address::repeat_byte(0xc3),
            is_long,
        )
    }

    fn store_with_position(is_long: bool, size: rust_decimal::Decimal) -> InMemoryDataStore {
        let store = InMemoryDataStore::new(Address::repeat_byte(0xd5));
        store.set_current_block(42);
        let mut position = Position::empty(&descriptor(is_long));
        position.size_in_usd = Usd::new(size);
        store.set_position(position);
        store
    }

    #[test]
    fn test_create_liquidation_order() {
        let store = store_with_position(true, dec!(5000));
        let log = EventLog::new();

        let key = LiquidationOrderFactory::create(&store, &log, &descriptor(true)).unwrap();
        let order = store.get_order(&key).unwrap();

        assert_eq!(order.order_type, OrderType::Liquidation);
        assert_eq!(order.size_delta_usd, Usd::new(dec!(5000)));
        assert_eq!(order.account, Address::repeat_byte(0xa1));
        assert_eq!(order.receiver, order.account);
        assert_eq!(order.market, Address::repeat_byte(0xb2));
        assert_eq!(order.initial_collateral_token, Address::repeat_byte(0xc3));
        assert!(order.is_long);
        assert_eq!(order.acceptable_price, Price::ZERO);
        assert_eq!(order.updated_at_block, 42);
        assert!(order.is_pending());
        assert_eq!(log.names(), vec!["OrderCreated"]);
    }

    #[test]
    fn test_short_liquidation_accepts_any_price() {
        let store = store_with_position(false, dec!(100));
        let log = EventLog::new();

        let key = LiquidationOrderFactory::create(&store, &log, &descriptor(false)).unwrap();
        assert_eq!(store.get_order(&key).unwrap().acceptable_price, Price::MAX);
    }

    #[test]
    fn test_keys_unique_per_call() {
        let store = store_with_position(true, dec!(5000));
        let log = EventLog::new();

        let first = LiquidationOrderFactory::create(&store, &log, &descriptor(true)).unwrap();
        let second = LiquidationOrderFactory::create(&store, &log, &descriptor(true)).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.order_count(), 2);
    }

    #[test]
    fn test_missing_position_rejected() {
        let store = store_with_position(true, dec!(5000));
        let log = EventLog::new();

        let err = LiquidationOrderFactory::create(&store, &log, &descriptor(false)).unwrap_err();
        assert!(matches!(err, LiquidationError::EmptyPosition(_)));
        assert_eq!(store.order_count(), 0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_zero_size_position_rejected() {
        let store = store_with_position(true, dec!(0));
        let log = EventLog::new();

        assert!(matches!(
            LiquidationOrderFactory::create(&store, &log, &descriptor(true)),
            Err(LiquidationError::EmptyPosition(_))
        ));
    }

    #[test]
    fn test_create_adl_order() {
        let store = store_with_position(true, dec!(5000));
        let log = EventLog::new();

        let key = LiquidationOrderFactory::create_adl(
            &store,
            &log,
            &descriptor(true),
            Usd::new(dec!(1000)),
        )
        .unwrap();
        let order = store.get_order(&key).unwrap();
        assert_eq!(order.order_type, OrderType::MarketDecrease);
        assert_eq!(order.size_delta_usd, Usd::new(dec!(1000)));
    }

    #[test]
    fn test_adl_size_delta_validated() {
        let store = store_with_position(true, dec!(5000));
        let log = EventLog::new();

        for delta in [dec!(0), dec!(5000.01)] {
            let result = LiquidationOrderFactory::create_adl(
                &store,
                &log,
                &descriptor(true),
                Usd::new(delta),
            );
            assert!(matches!(result, Err(LiquidationError::InvalidSizeDelta(_))));
        }
        assert_eq!(store.nonce(), 0);
    }
}
