use std::cell::{Cell, RefCell};

use tracing::{error, info, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

/// Operator-visible record of something the map did or failed to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub seq: u64,
    pub level: EventLevel,
    pub kind: &'static str,
    pub message: String,
}

/// Append-only event log shared by a single UI thread.
///
/// Every emitted event is also forwarded to `tracing`, so the browser console
/// and native log output see the same messages the tests inspect here.
#[derive(Debug, Default)]
pub struct EventBus {
    next_seq: Cell<u64>,
    events: RefCell<Vec<Event>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&self, kind: &'static str, message: impl Into<String>) {
        self.emit(EventLevel::Info, kind, message.into());
    }

    pub fn warn(&self, kind: &'static str, message: impl Into<String>) {
        self.emit(EventLevel::Warn, kind, message.into());
    }

    pub fn error(&self, kind: &'static str, message: impl Into<String>) {
        self.emit(EventLevel::Error, kind, message.into());
    }

    fn emit(&self, level: EventLevel, kind: &'static str, message: String) {
        match level {
            EventLevel::Info => info!(kind, "{message}"),
            EventLevel::Warn => warn!(kind, "{message}"),
            EventLevel::Error => error!(kind, "{message}"),
        }

        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.events.borrow_mut().push(Event {
            seq,
            level,
            kind,
            message,
        });
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn errors(&self) -> Vec<Event> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.level == EventLevel::Error)
            .cloned()
            .collect()
    }

    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, EventLevel};

    #[test]
    fn records_events_in_order() {
        let bus = EventBus::new();
        bus.info("load", "states loaded");
        bus.error("load", "cities-31 failed");
        let events = bus.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].seq, 0);
        assert_eq!(events[1].seq, 1);
        assert_eq!(events[1].level, EventLevel::Error);
        assert_eq!(bus.errors().len(), 1);
    }

    #[test]
    fn drain_clears_events_but_keeps_sequence() {
        let bus = EventBus::new();
        bus.warn("k", "m");
        assert_eq!(bus.drain().len(), 1);
        assert!(bus.events().is_empty());
        bus.warn("k", "n");
        assert_eq!(bus.events()[0].seq, 1);
    }
}
