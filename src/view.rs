//! Direct message view
//!
//! Owns the state of one open conversation and drives it from discrete
//! events: mount, compose input, store responses and realtime pushes. All
//! mutation goes through `&mut self`, so the view needs no locking; a
//! front-end that runs store calls on other tasks feeds their results back
//! through [`DirectMessageView::complete_send`].
//!
//! Mounting subscribes before fetching history and merges whatever the
//! subscription delivered in the meantime, so nothing sent during the fetch
//! is lost.

use crate::{
    backend::{Backend, InsertFilter, Subscription},
    conversation::{Conversation, Merge},
    models::{profile::FALLBACK_DISPLAY_NAME, Message, NewMessage, Profile, User},
    notify::{ToastDurations, Toasts},
    Result,
};
use tracing::{debug, error, info, warn};

/// Toast raised when history or profile loading fails
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load chat";

/// Toast raised when a durable write fails
pub const SEND_FAILED_MESSAGE: &str = "Failed to send";

/// Lifecycle status of the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    /// Not mounted, or torn down
    Idle,
    /// Mount in progress
    Loading,
    /// Conversation loaded and live
    Ready,
    /// No session; the front-end should route to its login flow
    LoginRequired,
}

/// Result of a complete send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing to send (blank input or no session)
    Skipped,
    /// The placeholder was reconciled with the stored row
    Sent,
    /// The write failed and the placeholder was rolled back
    Failed,
}

/// An optimistic send awaiting its durable write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    /// Temporary id of the placeholder in the conversation
    pub temp_id: String,
    /// Payload for the message store
    pub payload: NewMessage,
}

/// Two-party conversation view over an injected backend
pub struct DirectMessageView<B: Backend> {
    backend: B,
    counterpart_id: String,
    current_user: Option<User>,
    counterpart: Option<Profile>,
    conversation: Option<Conversation>,
    compose: String,
    status: ViewStatus,
    subscription: Option<Subscription>,
    toasts: Toasts,
}

impl<B: Backend> DirectMessageView<B> {
    /// Create an unmounted view of the conversation with `counterpart_id`
    pub fn new(backend: B, counterpart_id: impl Into<String>) -> Self {
        Self::with_toast_durations(backend, counterpart_id, ToastDurations::default())
    }

    /// Create an unmounted view with custom toast lifetimes
    pub fn with_toast_durations(
        backend: B,
        counterpart_id: impl Into<String>,
        durations: ToastDurations,
    ) -> Self {
        Self {
            backend,
            counterpart_id: counterpart_id.into(),
            current_user: None,
            counterpart: None,
            conversation: None,
            compose: String::new(),
            status: ViewStatus::Idle,
            subscription: None,
            toasts: Toasts::new(durations),
        }
    }

    /// Load the conversation and go live
    ///
    /// Resolves the session, the counterpart profile and the history, with
    /// the realtime subscription opened before the history request. Fetch
    /// failures leave a usable view with partial state and one error toast.
    pub async fn mount(&mut self) -> ViewStatus {
        self.teardown();
        self.status = ViewStatus::Loading;
        self.counterpart = None;

        let user = match self.backend.current_user().await {
            Ok(Some(user)) => user,
            Ok(None) => {
                info!("No session, login required");
                self.current_user = None;
                self.conversation = None;
                self.status = ViewStatus::LoginRequired;
                return self.status;
            }
            Err(e) => {
                warn!("Failed to resolve session: {}", e);
                self.current_user = None;
                self.conversation = None;
                self.status = ViewStatus::LoginRequired;
                return self.status;
            }
        };

        let mut load_failed = false;
        let counterpart_id = self.counterpart_id.clone();

        match self.backend.fetch_profile(&counterpart_id).await {
            Ok(profile) => self.counterpart = Some(profile),
            Err(e) => {
                error!("Error loading profile of {}: {}", counterpart_id, e);
                load_failed = true;
            }
        }

        match self
            .backend
            .subscribe(InsertFilter::receiver(user.id.clone()))
            .await
        {
            Ok(subscription) => self.subscription = Some(subscription),
            Err(e) => {
                error!("Error subscribing to inbound messages: {}", e);
                load_failed = true;
            }
        }

        let history = match self
            .backend
            .fetch_conversation(&user.id, &counterpart_id)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                error!("Error loading chat with {}: {}", counterpart_id, e);
                load_failed = true;
                Vec::new()
            }
        };

        let mut buffered = Vec::new();
        if let Some(subscription) = self.subscription.as_mut() {
            while let Some(message) = subscription.try_recv() {
                if message.sender_id == counterpart_id {
                    buffered.push(message);
                }
            }
        }

        let conversation = self
            .conversation
            .take()
            .filter(|c| c.me() == user.id && c.counterpart() == counterpart_id);
        let mut conversation =
            conversation.unwrap_or_else(|| Conversation::new(user.id.clone(), counterpart_id.clone()));
        conversation.load_history(history, buffered);

        info!(
            "Loaded chat with {} ({} messages)",
            counterpart_id,
            conversation.len()
        );

        self.conversation = Some(conversation);
        self.current_user = Some(user);
        if load_failed {
            self.toasts.error(LOAD_FAILED_MESSAGE);
        }
        self.status = ViewStatus::Ready;
        self.status
    }

    /// Point the view at another counterpart and mount again
    ///
    /// The old subscription is torn down first, so nothing addressed to the
    /// previous conversation reaches this one.
    pub async fn switch_counterpart(&mut self, counterpart_id: impl Into<String>) -> ViewStatus {
        self.teardown();
        self.counterpart_id = counterpart_id.into();
        self.conversation = None;
        self.mount().await
    }

    /// Tear the view down
    pub fn unmount(&mut self) {
        self.teardown();
        self.status = ViewStatus::Idle;
    }

    fn teardown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            debug!(
                subscription = subscription.id(),
                receiver = %subscription.filter().receiver_id,
                "Unsubscribing from inbound messages"
            );
            subscription.unsubscribe();
        }
    }

    /// Apply one realtime row
    ///
    /// Rows from anyone but the open counterpart are ignored. Returns whether
    /// the sequence changed.
    pub fn handle_realtime(&mut self, message: Message) -> bool {
        if self.status != ViewStatus::Ready {
            return false;
        }
        if message.sender_id != self.counterpart_id {
            debug!("Ignoring message {} from {}", message.id, message.sender_id);
            return false;
        }
        let Some(conversation) = self.conversation.as_mut() else {
            return false;
        };

        let merge = conversation.merge(message);
        if merge == Merge::Duplicate {
            debug!("Realtime message already present");
        }
        merge.changed()
    }

    /// Apply every realtime row already delivered, without waiting
    ///
    /// Returns how many changed the sequence.
    pub fn poll_realtime(&mut self) -> usize {
        let mut delivered = Vec::new();
        if let Some(subscription) = self.subscription.as_mut() {
            while let Some(message) = subscription.try_recv() {
                delivered.push(message);
            }
        }

        let mut changed = 0;
        for message in delivered {
            if self.handle_realtime(message) {
                changed += 1;
            }
        }
        changed
    }

    /// Wait for the next realtime row and apply it
    ///
    /// Returns `None` when there is no live subscription.
    pub async fn next_realtime(&mut self) -> Option<bool> {
        let message = self.subscription.as_mut()?.recv().await?;
        Some(self.handle_realtime(message))
    }

    /// Validate the compose input and insert the optimistic placeholder
    ///
    /// Clears the compose input. Returns `None`, leaving everything as it
    /// was, when the trimmed input is empty or the view is not live.
    pub fn begin_send(&mut self) -> Option<PendingSend> {
        if self.status != ViewStatus::Ready {
            return None;
        }
        let content = self.compose.trim();
        if content.is_empty() {
            return None;
        }
        let me = self.current_user.as_ref()?.id.clone();
        let conversation = self.conversation.as_mut()?;

        let placeholder = Message::pending(&me, &self.counterpart_id, content);
        let pending = PendingSend {
            temp_id: placeholder.id.clone(),
            payload: NewMessage::from_pending(&placeholder),
        };

        conversation.push_pending(placeholder);
        self.compose.clear();
        debug!("Optimistic message {} queued", pending.temp_id);
        Some(pending)
    }

    /// Reconcile or roll back a placeholder once its write has finished
    pub fn complete_send(&mut self, pending: PendingSend, result: Result<Message>) -> SendOutcome {
        match result {
            Ok(stored) => {
                info!("Message {} stored as {}", pending.temp_id, stored.id);
                if let Some(conversation) = self.conversation.as_mut() {
                    conversation.reconcile(&pending.temp_id, stored);
                }
                SendOutcome::Sent
            }
            Err(e) => {
                error!("Send error: {}", e);
                if let Some(conversation) = self.conversation.as_mut() {
                    conversation.rollback(&pending.temp_id);
                }
                self.toasts.error(SEND_FAILED_MESSAGE);
                SendOutcome::Failed
            }
        }
    }

    /// Send the compose input: optimistic insert, durable write, reconcile
    pub async fn send(&mut self) -> SendOutcome {
        let Some(pending) = self.begin_send() else {
            return SendOutcome::Skipped;
        };
        let result = self.backend.insert(pending.payload.clone()).await;
        self.complete_send(pending, result)
    }

    /// Current compose input
    pub fn compose(&self) -> &str {
        &self.compose
    }

    /// Replace the compose input
    pub fn set_compose(&mut self, text: impl Into<String>) {
        self.compose = text.into();
    }

    /// Add character to the compose input
    pub fn push_char(&mut self, c: char) {
        self.compose.push(c);
    }

    /// Remove last character from the compose input
    pub fn backspace(&mut self) {
        self.compose.pop();
    }

    /// Lifecycle status
    pub fn status(&self) -> ViewStatus {
        self.status
    }

    /// Messages in display order
    pub fn messages(&self) -> &[Message] {
        self.conversation
            .as_ref()
            .map(|c| c.messages())
            .unwrap_or(&[])
    }

    /// The loaded conversation, once mounted
    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    /// Signed-in user, once mounted
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Id of the counterpart
    pub fn counterpart_id(&self) -> &str {
        &self.counterpart_id
    }

    /// Counterpart profile, if it loaded
    pub fn counterpart(&self) -> Option<&Profile> {
        self.counterpart.as_ref()
    }

    /// Header title for the conversation
    pub fn title(&self) -> &str {
        self.counterpart
            .as_ref()
            .map(|p| p.display_name())
            .unwrap_or(FALLBACK_DISPLAY_NAME)
    }

    /// Whether `message` was sent by the signed-in user
    pub fn is_mine(&self, message: &Message) -> bool {
        self.current_user
            .as_ref()
            .is_some_and(|u| u.id == message.sender_id)
    }

    /// Whether a realtime subscription is live
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Toasts raised by the view
    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    /// Mutable access to the toasts, for dismissing and pruning
    pub fn toasts_mut(&mut self) -> &mut Toasts {
        &mut self.toasts
    }

    /// The injected backend
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: Backend> Drop for DirectMessageView<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}
