//! Fan-out of inserted rows to filtered subscribers

use crate::models::Message;
use tokio::sync::mpsc;

/// Server-side narrowing of a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertFilter {
    /// Only rows addressed to this user are delivered
    pub receiver_id: String,
}

impl InsertFilter {
    /// Rows addressed to `receiver_id`
    pub fn receiver(receiver_id: impl Into<String>) -> Self {
        Self {
            receiver_id: receiver_id.into(),
        }
    }

    /// Whether `message` passes the filter
    pub fn matches(&self, message: &Message) -> bool {
        message.receiver_id == self.receiver_id
    }
}

/// Receiving half of a realtime subscription
///
/// Owned by exactly one consumer. Dropping it, or calling
/// [`Subscription::unsubscribe`], unregisters the listener.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    filter: InsertFilter,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl Subscription {
    /// Wrap the receiving end of a listener registration
    pub fn new(id: u64, filter: InsertFilter, rx: mpsc::UnboundedReceiver<Message>) -> Self {
        Self { id, filter, rx }
    }

    /// Listener id, unique per hub
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Filter this subscription was opened with
    pub fn filter(&self) -> &InsertFilter {
        &self.filter
    }

    /// Wait for the next inserted row
    ///
    /// Returns `None` once the channel is closed.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Take an already delivered row without waiting
    pub fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// Tear the subscription down
    pub fn unsubscribe(mut self) {
        self.rx.close();
        tracing::debug!(subscription = self.id, "Realtime subscription closed");
    }
}

struct Listener {
    id: u64,
    filter: InsertFilter,
    tx: mpsc::UnboundedSender<Message>,
}

/// Registry of live subscriptions
#[derive(Default)]
pub struct RealtimeHub {
    next_id: u64,
    listeners: Vec<Listener>,
}

impl RealtimeHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for rows matching `filter`
    pub fn subscribe(&mut self, filter: InsertFilter) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        self.next_id += 1;
        let id = self.next_id;

        self.listeners.push(Listener {
            id,
            filter: filter.clone(),
            tx,
        });
        tracing::debug!(subscription = id, receiver = %filter.receiver_id, "Realtime subscription opened");

        Subscription::new(id, filter, rx)
    }

    /// Deliver `message` to every matching listener
    ///
    /// Listeners whose subscription has been dropped are pruned. Returns the
    /// number of listeners the row was delivered to.
    pub fn publish(&mut self, message: &Message) -> usize {
        self.prune();

        let mut delivered = 0;
        for listener in self.listeners.iter().filter(|l| l.filter.matches(message)) {
            if listener.tx.send(message.clone()).is_ok() {
                delivered += 1;
            }
        }

        if delivered > 0 {
            tracing::trace!(message = %message.id, delivered, "Published insert");
        }
        delivered
    }

    /// Number of live listeners
    pub fn listener_count(&mut self) -> usize {
        self.prune();
        self.listeners.len()
    }

    fn prune(&mut self) {
        self.listeners.retain(|l| {
            let open = !l.tx.is_closed();
            if !open {
                tracing::trace!(subscription = l.id, "Pruned closed listener");
            }
            open
        });
    }
}
