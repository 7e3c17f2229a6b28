//! Event bus implementation.
//!
//! One bus is owned per editing session and shared by `Arc` with the stores
//! that publish into it. There is no process-wide instance.
//!
//! Handlers run synchronously, in subscription order, on the publishing
//! thread. Every published event is stamped with a sequence number so a
//! renderer that fell behind can ask for what it missed.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory, FieldEvent};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let short = self.0.simple().to_string();
        write!(f, "sub-{}", &short[..8])
    }
}

/// Which events a subscriber wants.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EventFilter {
    #[default]
    All,
    /// Any event in one of these categories.
    Categories(Vec<EventCategory>),
    /// Field events for one page, plus `Cleared`.
    Page(u32),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
            EventFilter::Page(page) => match event {
                AppEvent::Field(FieldEvent::Cleared) => true,
                AppEvent::Field(change) => change.page() == Some(*page),
                _ => false,
            },
        }
    }
}

type EventHandler = Box<dyn Fn(AppEvent) + Send + Sync>;

/// Event bus settings
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Capacity of the async broadcast channel.
    pub channel_capacity: usize,
    /// Keep the last `history_size` events for [`EventBus::events_since`].
    pub enable_history: bool,
    pub history_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            enable_history: false,
            history_size: 512,
        }
    }
}

/// Errors from [`EventBus::publish`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventBusError {
    /// Nobody is listening. Publishers ignore this.
    #[error("No active subscribers")]
    NoSubscribers,
}

#[derive(Default)]
struct Journal {
    next_seq: u64,
    recent: VecDeque<(u64, AppEvent)>,
}

/// Change-notification bus for one editing session
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    handlers: RwLock<Vec<(SubscriptionId, EventFilter, EventHandler)>>,
    journal: Mutex<Journal>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            handlers: RwLock::new(Vec::new()),
            journal: Mutex::new(Journal::default()),
            config,
        }
    }

    /// Delivers `event` to matching handlers, then to async receivers.
    ///
    /// Returns how many subscribers got it. Handlers must not subscribe or
    /// unsubscribe on the same bus.
    pub fn publish(&self, event: AppEvent) -> Result<usize, EventBusError> {
        let seq = self.record(&event);
        tracing::trace!("#{} {}", seq, event.description());

        let handlers = self.handlers.read();
        let mut delivered = 0;
        for (_, filter, handler) in handlers.iter() {
            if filter.matches(&event) {
                handler(event.clone());
                delivered += 1;
            }
        }

        let receivers = self.sender.send(event).unwrap_or(0);
        if delivered + receivers == 0 && handlers.is_empty() {
            return Err(EventBusError::NoSubscribers);
        }
        Ok(delivered + receivers)
    }

    fn record(&self, event: &AppEvent) -> u64 {
        let mut journal = self.journal.lock();
        journal.next_seq += 1;
        let seq = journal.next_seq;
        if self.config.enable_history {
            journal.recent.push_back((seq, event.clone()));
            while journal.recent.len() > self.config.history_size {
                journal.recent.pop_front();
            }
        }
        seq
    }

    /// Registers a synchronous handler. Handlers run in subscription order.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        tracing::debug!("{} subscribed to {:?}", id, filter);
        self.handlers.write().push((id, filter, Box::new(handler)));
        id
    }

    /// Receiver for async consumers. Sees only events published after it
    /// was created.
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(sub, _, _)| *sub != id);
        before != handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Sequence number of the last published event (0 before the first).
    pub fn last_sequence(&self) -> u64 {
        self.journal.lock().next_seq
    }

    /// Retained events published after sequence number `seq`.
    ///
    /// Empty when history is disabled.
    pub fn events_since(&self, seq: u64) -> Vec<AppEvent> {
        self.journal
            .lock()
            .recent
            .iter()
            .filter(|(s, _)| *s > seq)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn clear_history(&self) {
        self.journal.lock().recent.clear();
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("last_sequence", &self.last_sequence())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::SurfaceEvent;
    use crate::types::FieldId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn added(id: u64, page: u32) -> AppEvent {
        AppEvent::Field(FieldEvent::Added {
            id: FieldId(id),
            page,
        })
    }

    #[test]
    fn test_unsubscribe_twice() {
        let bus = EventBus::new();
        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(added(1, 1)), Err(EventBusError::NoSubscribers));
        // Still sequenced
        assert_eq!(bus.last_sequence(), 1);
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for name in ["overlay", "sidebar", "status"] {
            let log = log.clone();
            bus.subscribe(EventFilter::All, move |_| log.lock().push(name));
        }

        assert_eq!(bus.publish(added(1, 1)), Ok(3));
        assert_eq!(*log.lock(), vec!["overlay", "sidebar", "status"]);
    }

    #[test]
    fn test_category_and_page_filters() {
        let bus = EventBus::new();
        let fields = Arc::new(AtomicUsize::new(0));
        let page_two = Arc::new(AtomicUsize::new(0));

        let counter = fields.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Field]),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        let counter = page_two.clone();
        bus.subscribe(EventFilter::Page(2), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(added(1, 1)).ok();
        bus.publish(added(2, 2)).ok();
        bus.publish(AppEvent::Field(FieldEvent::Cleared)).ok();
        bus.publish(AppEvent::Surface(SurfaceEvent::Invalidated)).ok();

        assert_eq!(fields.load(Ordering::SeqCst), 3);
        assert_eq!(page_two.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_events_since_is_bounded() {
        let bus = EventBus::with_config(EventBusConfig {
            enable_history: true,
            history_size: 5,
            ..Default::default()
        });
        for i in 1..=10 {
            bus.publish(added(i, 1)).ok();
        }

        let missed = bus.events_since(7);
        assert_eq!(missed, vec![added(8, 1), added(9, 1), added(10, 1)]);
        assert_eq!(bus.events_since(0).len(), 5);

        bus.clear_history();
        assert!(bus.events_since(0).is_empty());
    }

    #[test]
    fn test_history_disabled_by_default() {
        let bus = EventBus::new();
        bus.publish(added(1, 1)).ok();
        assert!(bus.events_since(0).is_empty());
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut receiver = bus.receiver();

        assert_eq!(bus.publish(added(42, 3)), Ok(1));
        assert_eq!(receiver.recv().await.unwrap(), added(42, 3));
    }
}
