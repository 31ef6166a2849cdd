// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track change notifications.

use std::cell::RefCell;
use std::rc::Rc;

/// Structural change to a track's keyframes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackEvent {
    /// A keyframe was appended
    KeyAdded(u32),
    /// An existing keyframe was overwritten
    KeyUpdated(u32),
    /// A keyframe was removed
    KeyRemoved(u32),
    /// A keyframe changed frame
    KeyMoved {
        /// Previous frame
        from: u32,
        /// New frame
        to: u32,
    },
    /// Every keyframe was removed
    KeysCleared,
    /// Keyframes were replaced by an import
    KeysLoaded(Vec<u32>),
    /// Active keyframes were re-filtered after a timeline change
    KeysChanged(Vec<u32>),
}

/// Receives track events.
///
/// Tracks buffer events while they are being edited; observers only run once
/// the edit has returned, so they may read the track again.
pub trait TrackObserver {
    /// Handle an event
    fn on_track_event(&self, event: &TrackEvent);
}

/// Observers attached to one track
#[derive(Clone, Default)]
pub struct ObserverList {
    observers: Vec<Rc<dyn TrackObserver>>,
}

impl ObserverList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an observer
    pub fn subscribe(&mut self, observer: Rc<dyn TrackObserver>) {
        self.observers.push(observer);
    }

    /// Deliver an event to every observer
    pub fn notify(&self, event: &TrackEvent) {
        for observer in &self.observers {
            observer.on_track_event(event);
        }
    }

    /// Observer count
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Check if no observers are attached
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Events a track has buffered, together with the observers they are for
#[derive(Debug, Default)]
pub struct PendingEvents {
    observers: ObserverList,
    events: Vec<TrackEvent>,
}

impl PendingEvents {
    /// Pair buffered `events` with their observers
    pub fn new(observers: ObserverList, events: Vec<TrackEvent>) -> Self {
        Self { observers, events }
    }

    /// Buffered events
    pub fn events(&self) -> &[TrackEvent] {
        &self.events
    }

    /// Check if nothing was buffered
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Deliver every event in order
    pub fn deliver(self) {
        for event in &self.events {
            self.observers.notify(event);
        }
    }
}

/// Logs every event through `tracing`
#[derive(Debug, Clone)]
pub struct TracingObserver {
    label: String,
}

impl TracingObserver {
    /// Create an observer that tags events with `label`
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl TrackObserver for TracingObserver {
    fn on_track_event(&self, event: &TrackEvent) {
        tracing::info!(track = %self.label, ?event, "Track changed");
    }
}

/// Buffers events for later inspection
#[derive(Debug, Default)]
pub struct EventLog {
    events: RefCell<Vec<TrackEvent>>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain buffered events
    pub fn take(&self) -> Vec<TrackEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl TrackObserver for EventLog {
    fn on_track_event(&self, event: &TrackEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_reaches_all_observers() {
        let first = Rc::new(EventLog::new());
        let second = Rc::new(EventLog::new());
        let mut observers = ObserverList::new();
        observers.subscribe(first.clone());
        observers.subscribe(second.clone());
        assert_eq!(observers.len(), 2);

        observers.notify(&TrackEvent::KeyMoved { from: 1, to: 2 });
        assert_eq!(first.take(), vec![TrackEvent::KeyMoved { from: 1, to: 2 }]);
        assert_eq!(second.take().len(), 1);
        assert!(first.take().is_empty());
    }

    #[test]
    fn test_pending_events_deliver_in_order() {
        let log = Rc::new(EventLog::new());
        let mut observers = ObserverList::new();
        observers.subscribe(log.clone());

        let pending = PendingEvents::new(
            observers,
            vec![TrackEvent::KeyAdded(4), TrackEvent::KeyRemoved(4)],
        );
        assert!(log.take().is_empty());
        pending.deliver();
        assert_eq!(
            log.take(),
            vec![TrackEvent::KeyAdded(4), TrackEvent::KeyRemoved(4)]
        );
    }
}
