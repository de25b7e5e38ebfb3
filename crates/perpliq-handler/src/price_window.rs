//! Scoped oracle price window.
//!
//! [`PriceWindow::open`] validates a caller-supplied [`PriceSet`], loads it
//! into the oracle and returns an [`OpenPriceWindow`]. The prices are
//! authoritative until the window is closed. Closing on the success path
//! verifies nothing was left behind; dropping an unclosed window (any
//! error path) clears the oracle so no price outlives its call.

use perpliq_core::{Event, EventKind, PriceSet};
use perpliq_venue::{DataStore, EventEmitter, Oracle};
use tracing::{debug, warn};

use crate::error::{HandlerResult, LiquidationError};

pub struct PriceWindow;

impl PriceWindow {
    /// Validate and ingest `price_set`.
    ///
    /// # Errors
    /// - `PriceWindowLeak` if the oracle still holds prices from elsewhere
    /// - `InvalidPriceSet` if the set is malformed, stale, or from the future
    pub fn open<'a>(
        oracle: &'a dyn Oracle,
        data_store: &dyn DataStore,
        event_emitter: &dyn EventEmitter,
        price_set: &PriceSet,
        max_age_blocks: Option<u64>,
    ) -> HandlerResult<OpenPriceWindow<'a>> {
        let outstanding = oracle.tokens_with_prices();
        if outstanding != 0 {
            warn!(outstanding, "Oracle holds prices before window open");
            return Err(LiquidationError::PriceWindowLeak(outstanding));
        }

        price_set
            .validate()
            .map_err(|e| LiquidationError::InvalidPriceSet(e.to_string()))?;
        Self::validate_age(data_store.current_block(), price_set, max_age_blocks)?;

        // From here on, partial ingestion is undone by the window's drop.
        let window = OpenPriceWindow {
            oracle,
            closed: false,
        };

        for (token, props) in price_set.entries() {
            oracle
                .set_primary_price(*token, *props)
                .map_err(|e| LiquidationError::InvalidPriceSet(e.to_string()))?;
            event_emitter.emit(Event::new(EventKind::OraclePriceUpdate {
                token: *token,
                min: props.min,
                max: props.max,
            }));
        }

        debug!(tokens = price_set.len(), "Price window opened");
        Ok(window)
    }

    fn validate_age(
        current_block: u64,
        price_set: &PriceSet,
        max_age_blocks: Option<u64>,
    ) -> HandlerResult<()> {
        let Some(observed) = price_set.observed_at_block() else {
            return Ok(());
        };
        if observed > current_block {
            return Err(LiquidationError::InvalidPriceSet(format!(
                "observed at block {observed}, ahead of current block {current_block}"
            )));
        }
        if let Some(max_age) = max_age_blocks {
            let age = current_block - observed;
            if age > max_age {
                return Err(LiquidationError::InvalidPriceSet(format!(
                    "prices are {age} blocks old, max {max_age}"
                )));
            }
        }
        Ok(())
    }
}

/// An open window. Close it on success; drop it on failure.
#[must_use = "dropping the window clears the oracle immediately"]
pub struct OpenPriceWindow<'a> {
    oracle: &'a dyn Oracle,
    closed: bool,
}

impl OpenPriceWindow<'_> {
    /// Clear the window's prices and verify none remain.
    pub fn close(mut self) -> HandlerResult<()> {
        self.closed = true;
        self.oracle.clear_all_prices();
        let outstanding = self.oracle.tokens_with_prices();
        if outstanding != 0 {
            return Err(LiquidationError::PriceWindowLeak(outstanding));
        }
        debug!("Price window closed");
        Ok(())
    }
}

impl Drop for OpenPriceWindow<'_> {
    fn drop(&mut self) {
        if !self.closed {
            self.oracle.clear_all_prices();
            debug!("Price window dropped without close; prices cleared");
        }
    }
}
