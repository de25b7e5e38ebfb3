//! Oracle price batches.
//!
//! A `PriceSet` is supplied by the caller for one handler call. It is only
//! authoritative while the price window of that call is open.

use alloy::primitives::Address;
use std::collections::HashSet;

use crate::decimal::Price;
use crate::error::{CoreError, Result};

/// Min/max price pair for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceProps {
    pub min: Price,
    pub max: Price,
}

impl PriceProps {
    pub fn new(min: Price, max: Price) -> Self {
        Self { min, max }
    }

    /// Single-valued price (min == max).
    pub fn single(price: Price) -> Self {
        Self {
            min: price,
            max: price,
        }
    }

    /// Price favouring the position holder's counterparty.
    pub fn pick(&self, maximize: bool) -> Price {
        if maximize {
            self.max
        } else {
            self.min
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_positive() || !self.max.is_positive() {
            return Err(CoreError::InvalidPrice(format!(
                "non-positive price: min={} max={}",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(CoreError::InvalidPrice(format!(
                "min {} exceeds max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Caller-supplied batch of price observations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceSet {
    entries: Vec<(Address, PriceProps)>,
    /// Block at which the observations were taken.
    observed_at_block: Option<u64>,
}

impl PriceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single-valued price for `token`.
    pub fn with_price(self, token: Address, price: Price) -> Self {
        self.with_props(token, PriceProps::single(price))
    }

    pub fn with_props(mut self, token: Address, props: PriceProps) -> Self {
        self.entries.push((token, props));
        self
    }

    pub fn observed_at(mut self, block: u64) -> Self {
        self.observed_at_block = Some(block);
        self
    }

    pub fn observed_at_block(&self) -> Option<u64> {
        self.observed_at_block
    }

    pub fn entries(&self) -> &[(Address, PriceProps)] {
        &self.entries
    }

    pub fn tokens(&self) -> impl Iterator<Item = Address> + '_ {
        self.entries.iter().map(|(token, _)| *token)
    }

    pub fn get(&self, token: &Address) -> Option<PriceProps> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, props)| *props)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Structural validation: non-empty, unique tokens, sane prices.
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(CoreError::InvalidPrice("empty price set".to_string()));
        }

        let mut seen = HashSet::with_capacity(self.entries.len());
        for (token, props) in &self.entries {
            if !seen.insert(*token) {
                return Err(CoreError::InvalidPrice(format!("duplicate token {token}")));
            }
            props
                .validate()
                .map_err(|e| CoreError::InvalidPrice(format!("{token}: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn token(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_valid_price_set() {
        let set = PriceSet::new()
            .with_price(token(1), Price::new(dec!(100)))
            .with_props(
                token(2),
                PriceProps::new(Price::new(dec!(1.99)), Price::new(dec!(2.01))),
            );

        assert!(set.validate().is_ok());
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&token(1)).unwrap().min, Price::new(dec!(100)));
        assert!(set.get(&token(3)).is_none());
    }

    #[test]
    fn test_empty_price_set_rejected() {
        assert!(PriceSet::new().validate().is_err());
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let set = PriceSet::new()
            .with_price(token(1), Price::new(dec!(100)))
            .with_price(token(1), Price::new(dec!(101)));

        assert!(set.validate().is_err());
    }

    #[test]
    fn test_inverted_props_rejected() {
        let set = PriceSet::new().with_props(
            token(1),
            PriceProps::new(Price::new(dec!(101)), Price::new(dec!(100))),
        );
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_zero_price_rejected() {
        let set = PriceSet::new().with_price(token(1), Price::ZERO);
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_pick() {
        let props = PriceProps::new(Price::new(dec!(99)), Price::new(dec!(101)));
        assert_eq!(props.pick(true), Price::new(dec!(101)));
        assert_eq!(props.pick(false), Price::new(dec!(99)));
    }
}
