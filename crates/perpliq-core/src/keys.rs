//! Data-store key derivation.
//!
//! Keys are keccak256 hashes over the Solidity ABI encoding of their
//! inputs, so a key computed here matches the key any other venue
//! component computes for the same inputs.

use alloy::primitives::{keccak256, Address, B256, U256};
use alloy::sol_types::SolValue;

use crate::order::OrderType;

/// Incremented on every order creation.
pub const NONCE: &str = "NONCE";
/// Kill switch for executing an order type through a handler.
pub const EXECUTE_ORDER_FEATURE_DISABLED: &str = "EXECUTE_ORDER_FEATURE_DISABLED";
/// Kill switch for auto-deleveraging through a handler.
pub const EXECUTE_ADL_FEATURE_DISABLED: &str = "EXECUTE_ADL_FEATURE_DISABLED";

/// `keccak256(abi.encode(name))`.
pub fn string_id(name: &str) -> B256 {
    keccak256(name.abi_encode())
}

/// Key of the data-store nonce slot.
pub fn nonce_key() -> B256 {
    string_id(NONCE)
}

/// Order key for the `nonce`-th order created in `data_store`.
pub fn order_key(data_store: Address, nonce: u64) -> B256 {
    keccak256((data_store, U256::from(nonce)).abi_encode())
}

/// Key identifying a position.
pub fn position_key(account: Address, market: Address, collateral_token: Address, is_long: bool) -> B256 {
    keccak256((account, market, collateral_token, is_long).abi_encode())
}

/// Feature flag disabling execution of `order_type` orders via `module`.
pub fn execute_order_feature_disabled_key(module: Address, order_type: OrderType) -> B256 {
    feature_key(EXECUTE_ORDER_FEATURE_DISABLED, module, order_type)
}

/// Feature flag disabling auto-deleveraging of `order_type` orders via `module`.
pub fn execute_adl_feature_disabled_key(module: Address, order_type: OrderType) -> B256 {
    feature_key(EXECUTE_ADL_FEATURE_DISABLED, module, order_type)
}

fn feature_key(switch: &str, module: Address, order_type: OrderType) -> B256 {
    keccak256((string_id(switch), module, U256::from(order_type.as_u8())).abi_encode())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_order_key_changes_with_nonce() {
        let store = addr(0x11);
        assert_ne!(order_key(store, 1), order_key(store, 2));
        assert_eq!(order_key(store, 7), order_key(store, 7));
    }

    #[test]
    fn test_order_key_changes_with_store() {
        assert_ne!(order_key(addr(0x11), 1), order_key(addr(0x12), 1));
    }

    #[test]
    fn test_position_key_depends_on_direction() {
        let long = position_key(addr(1), addr(2), addr(3), true);
        let short = position_key(addr(1), addr(2), addr(3), false);
        assert_ne!(long, short);
    }

    #[test]
    fn test_feature_keys_are_scoped() {
        let module = addr(0xaa);
        let liq = execute_order_feature_disabled_key(module, OrderType::Liquidation);
        let dec = execute_order_feature_disabled_key(module, OrderType::MarketDecrease);
        let other = execute_order_feature_disabled_key(addr(0xbb), OrderType::Liquidation);
        let adl = execute_adl_feature_disabled_key(module, OrderType::Liquidation);

        assert_ne!(liq, dec);
        assert_ne!(liq, other);
        assert_ne!(liq, adl);
    }

    #[test]
    fn test_string_id_abi_layout() {
        // offset word, length word, right-padded data
        let mut encoded = vec![0u8; 96];
        encoded[31] = 0x20;
        encoded[63] = 5;
        encoded[64..69].copy_from_slice(b"NONCE");
        assert_eq!(string_id("NONCE"), keccak256(&encoded));
        assert_eq!(nonce_key(), keccak256(&encoded));

        let long = string_id("EXECUTE_ORDER_FEATURE_DISABLED_WITH_A_LONG_SUFFIX");
        assert_ne!(string_id("NONCE"), long);
    }

    #[test]
    fn test_order_key_static_layout() {
        let store = addr(0x11);
        let mut encoded = [0u8; 64];
        encoded[12..32].copy_from_slice(store.as_slice());
        encoded[63] = 7;
        assert_eq!(order_key(store, 7), keccak256(encoded));
    }

    #[test]
    fn test_position_key_static_layout() {
        let mut encoded = [0u8; 128];
        encoded[12..32].copy_from_slice(addr(1).as_slice());
        encoded[44..64].copy_from_slice(addr(2).as_slice());
        encoded[76..96].copy_from_slice(addr(3).as_slice());
        encoded[127] = 1;
        assert_eq!(position_key(addr(1), addr(2), addr(3), true), keccak256(encoded));
    }
}
