//! Permission roles checked against the role store.

use alloy::primitives::B256;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::keys::string_id;

/// A role identifier: `keccak256(abi.encode(name))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Role {
    id: B256,
    name: &'static str,
}

impl Role {
    pub const LIQUIDATION_KEEPER_NAME: &'static str = "LIQUIDATION_KEEPER";
    pub const ADL_KEEPER_NAME: &'static str = "ADL_KEEPER";
    pub const ORDER_KEEPER_NAME: &'static str = "ORDER_KEEPER";
    pub const CONTROLLER_NAME: &'static str = "CONTROLLER";

    fn named(name: &'static str) -> Self {
        Self {
            id: string_id(name),
            name,
        }
    }

    /// May trigger liquidations.
    pub fn liquidation_keeper() -> Self {
        Self::named(Self::LIQUIDATION_KEEPER_NAME)
    }

    /// May trigger auto-deleveraging.
    pub fn adl_keeper() -> Self {
        Self::named(Self::ADL_KEEPER_NAME)
    }

    pub fn order_keeper() -> Self {
        Self::named(Self::ORDER_KEEPER_NAME)
    }

    pub fn controller() -> Self {
        Self::named(Self::CONTROLLER_NAME)
    }

    pub fn id(&self) -> B256 {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            Self::LIQUIDATION_KEEPER_NAME => Ok(Self::liquidation_keeper()),
            Self::ADL_KEEPER_NAME => Ok(Self::adl_keeper()),
            Self::ORDER_KEEPER_NAME => Ok(Self::order_keeper()),
            Self::CONTROLLER_NAME => Ok(Self::controller()),
            other => Err(CoreError::InvalidConfig(format!("unknown role: {other}"))),
        }
    }
}
