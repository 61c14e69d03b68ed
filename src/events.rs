//! Change notification for whatever presents the explorer state
//!
//! The explorer emits an [`ExplorerEvent`] after each state change. A front
//! end subscribes and re-reads the parts it shows.

use crate::tree::NodeId;
use std::path::PathBuf;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerEvent {
    StatusChanged(String),
    PathChanged(PathBuf),
    /// Visible entries were recomputed
    EntriesChanged,
    DrivesChanged,
    /// Tree structure or expansion changed
    TreeChanged,
    /// Tree selection moved to this node (or was cleared)
    TreeSelectionChanged(Option<NodeId>),
    FileSelectionChanged(Option<PathBuf>),
    /// The node was revealed and should be scrolled into view
    ScrollToNode(NodeId),
    PlaybackChanged,
    FavoritesChanged,
    LanguageChanged(String),
    ShowFoldersChanged(bool),
}

pub type EventCallback = Box<dyn Fn(&ExplorerEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered subscriber list. Subscribers run in subscription order.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, EventCallback)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: EventCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, callback));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn emit(&self, event: ExplorerEvent) {
        trace!("Event: {:?}", event);
        for (_, callback) in &self.subscribers {
            callback(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(bus: &mut EventBus) -> (SubscriptionId, Arc<Mutex<Vec<ExplorerEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = bus.subscribe(Box::new(move |event| {
            sink.lock().unwrap().push(event.clone());
        }));
        (id, seen)
    }

    #[test]
    fn test_emit_reaches_every_subscriber() {
        let mut bus = EventBus::new();
        let (_, first) = recorder(&mut bus);
        let (_, second) = recorder(&mut bus);

        bus.emit(ExplorerEvent::EntriesChanged);

        assert_eq!(*first.lock().unwrap(), vec![ExplorerEvent::EntriesChanged]);
        assert_eq!(*second.lock().unwrap(), vec![ExplorerEvent::EntriesChanged]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let (id, seen) = recorder(&mut bus);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(ExplorerEvent::TreeChanged);

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscription_ids_are_not_reused() {
        let mut bus = EventBus::new();
        let (a, _) = recorder(&mut bus);
        bus.unsubscribe(a);
        let (b, _) = recorder(&mut bus);
        assert_ne!(a, b);
    }
}
