//! Change notifications for catalog observers
//!
//! An owned publish/subscribe list. Each [`StoryService`](crate::StoryService)
//! holds one; nothing here is process-global. Delivery is synchronous on the
//! publishing task: by the time a mutating operation returns, every observer
//! registered for that event has already run. Observers registered after an
//! event fired never see it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use storysnaps_core::Story;

/// Which event an observer listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Stories were added, removed or bulk-updated; reload the catalog
    CatalogChanged,
    /// A single story's metadata changed; the new value is attached
    StoryChanged,
}

/// Event delivered to observers
#[derive(Debug, Clone, PartialEq)]
pub enum StoryEvent {
    CatalogChanged,
    StoryChanged(Story),
}

impl StoryEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::CatalogChanged => EventKind::CatalogChanged,
            Self::StoryChanged(_) => EventKind::StoryChanged,
        }
    }
}

/// Observer callback type
pub type Observer = Arc<dyn Fn(&StoryEvent) + Send + Sync>;

/// Handle returned by [`ChangeNotifier::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Registration {
    id: SubscriptionId,
    kind: EventKind,
    observer: Observer,
}

/// Fan-out list of observers keyed by event kind
pub struct ChangeNotifier {
    observers: RwLock<Vec<Registration>>,
    next_id: AtomicU64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers `callback` for events of `kind`
    ///
    /// Every call must be paired with [`ChangeNotifier::unsubscribe`] on
    /// teardown, or use [`ChangeNotifier::subscribe_scoped`].
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: Fn(&StoryEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Registration {
                id,
                kind,
                observer: Arc::new(callback),
            });
        log::debug!("Observer {:?} subscribed to {:?}", id, kind);
        id
    }

    /// Registers `callback` and returns a guard that unsubscribes on drop
    pub fn subscribe_scoped<F>(self: &Arc<Self>, kind: EventKind, callback: F) -> Subscription
    where
        F: Fn(&StoryEvent) + Send + Sync + 'static,
    {
        let id = self.subscribe(kind, callback);
        Subscription {
            notifier: Arc::downgrade(self),
            id,
        }
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|r| r.id != id);
        let removed = observers.len() != before;
        if removed {
            log::debug!("Observer {:?} unsubscribed", id);
        }
        removed
    }

    /// Delivers `event` to every observer of its kind, returning how many ran
    ///
    /// Observers are called after the list lock is released, so a callback
    /// may subscribe or unsubscribe without deadlocking.
    pub fn publish(&self, event: &StoryEvent) -> usize {
        let kind = event.kind();
        let targets: Vec<Observer> = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| Arc::clone(&r.observer))
            .collect();

        for observer in &targets {
            observer(event);
        }
        targets.len()
    }

    /// Number of registered observers across all kinds
    pub fn subscriber_count(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Scoped subscription; dropping it unsubscribes
#[must_use = "dropping a Subscription immediately unsubscribes it"]
pub struct Subscription {
    notifier: Weak<ChangeNotifier>,
    id: SubscriptionId,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(notifier) = self.notifier.upgrade() {
            notifier.unsubscribe(self.id);
        }
    }
}
