//! Compute budget metering.
//!
//! Every protocol step and every strategy charges units against a meter
//! created fresh for the call. Exhaustion is fatal for the whole call.

use std::cell::Cell;

use crate::error::BudgetExceeded;

/// Per-call compute meter.
#[derive(Debug)]
pub struct ComputeMeter {
    limit: u64,
    used: Cell<u64>,
}

impl ComputeMeter {
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            used: Cell::new(0),
        }
    }

    /// Charge `units`. On failure the meter is left saturated at the limit.
    pub fn charge(&self, units: u64) -> Result<(), BudgetExceeded> {
        let next = self.used.get().saturating_add(units);
        if next > self.limit {
            self.used.set(self.limit);
            return Err(BudgetExceeded {
                used: next,
                limit: self.limit,
            });
        }
        self.used.set(next);
        Ok(())
    }

    #[must_use]
    pub fn used(&self) -> u64 {
        self.used.get()
    }

    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.limit - self.used.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_within_budget() {
        let meter = ComputeMeter::new(100);
        meter.charge(40).unwrap();
        meter.charge(60).unwrap();
        assert_eq!(meter.used(), 100);
        assert_eq!(meter.remaining(), 0);
    }

    #[test]
    fn test_charge_over_budget() {
        let meter = ComputeMeter::new(100);
        meter.charge(90).unwrap();
        let err = meter.charge(11).unwrap_err();
        assert_eq!(err, BudgetExceeded { used: 101, limit: 100 });
        assert_eq!(meter.remaining(), 0);
    }

    #[test]
    fn test_charge_saturates() {
        let meter = ComputeMeter::new(u64::MAX);
        meter.charge(u64::MAX).unwrap();
        assert!(meter.charge(1).is_err());
    }
}
