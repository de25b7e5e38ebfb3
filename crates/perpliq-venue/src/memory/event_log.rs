//! Recording event sink.

use parking_lot::RwLock;
use perpliq_core::Event;
use tracing::trace;

use crate::event_emitter::EventEmitter;

/// Keeps every emitted event in order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: RwLock<Vec<Event>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// Event names in emission order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.events.read().iter().map(Event::name).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl EventEmitter for EventLog {
    fn emit(&self, event: Event) {
        trace!(event = event.name(), "Event emitted");
        self.events.write().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perpliq_core::{Address, EventKind};

    #[test]
    fn test_event_log_keeps_order() {
        let log = EventLog::new();
        log.emit(Event::new(EventKind::LiquidationAborted {
            account: Address::ZERO,
            market: Address::ZERO,
            reason: "unauthorized".to_string(),
        }));
        log.emit(Event::new(EventKind::OraclePriceUpdate {
            token: Address::ZERO,
            min: perpliq_core::Price::ZERO,
            max: perpliq_core::Price::ZERO,
        }));

        assert_eq!(log.names(), vec!["LiquidationAborted", "OraclePriceUpdate"]);
        log.clear();
        assert!(log.is_empty());
    }
}
