//! Event sink interface.

use perpliq_core::Event;

pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: Event);
}
