//! Per-call event buffering.
//!
//! Events produced during a handler call are held here and only reach the
//! real sink once the call succeeds.

use parking_lot::Mutex;
use perpliq_core::Event;
use perpliq_venue::EventEmitter;
use tracing::debug;

#[derive(Debug, Default)]
pub struct EventBuffer {
    events: Mutex<Vec<Event>>,
}

impl EventBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Forward buffered events to `sink` in emission order.
    pub fn flush_to(&self, sink: &dyn EventEmitter) -> usize {
        let events = std::mem::take(&mut *self.events.lock());
        let count = events.len();
        for event in events {
            sink.emit(event);
        }
        debug!(count, "Event buffer flushed");
        count
    }

    /// Drop buffered events.
    pub fn discard(&self) -> usize {
        let count = std::mem::take(&mut *self.events.lock()).len();
        debug!(count, "Event buffer discarded");
        count
    }
}

impl EventEmitter for EventBuffer {
    fn emit(&self, event: Event) {
        self.events.lock().push(event);
    }
}
