//! In-memory state of one two-party conversation
//!
//! The sequence is ordered by arrival (history sorted by `created_at`, then
//! appends as they come in) with set semantics on message id: merging a row
//! that is already present is a no-op. Optimistic placeholders are matched
//! to their durable row either by temporary id (insert response) or by
//! client token (realtime echo), whichever arrives first.

use crate::models::Message;
use std::collections::HashSet;

/// What a merge did to the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// A new message was appended
    Appended,
    /// A placeholder was replaced by its durable row
    Reconciled,
    /// The row was already present; nothing changed
    Duplicate,
    /// The row belongs to another conversation; nothing changed
    Foreign,
}

impl Merge {
    /// Whether the sequence changed
    pub fn changed(self) -> bool {
        matches!(self, Merge::Appended | Merge::Reconciled)
    }
}

/// Ordered, id-keyed message sequence between `me` and a counterpart
#[derive(Debug, Clone)]
pub struct Conversation {
    me: String,
    counterpart: String,
    messages: Vec<Message>,
    ids: HashSet<String>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new(me: impl Into<String>, counterpart: impl Into<String>) -> Self {
        Self {
            me: me.into(),
            counterpart: counterpart.into(),
            messages: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Id of the local user
    pub fn me(&self) -> &str {
        &self.me
    }

    /// Id of the other participant
    pub fn counterpart(&self) -> &str {
        &self.counterpart
    }

    /// Messages in display order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages, placeholders included
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether there are no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of placeholders still waiting for the store
    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_pending()).count()
    }

    /// Whether `id` is in the sequence
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Whether `message` belongs to this conversation
    pub fn accepts(&self, message: &Message) -> bool {
        message.is_between(&self.me, &self.counterpart)
    }

    /// Replace the durable contents with fetched history
    ///
    /// `buffered` holds realtime rows received while the history request was
    /// in flight. Both are deduplicated by id and sorted by `created_at`;
    /// rows from other conversations are dropped. Placeholders already in
    /// the sequence are kept at the end unless their durable row is part of
    /// the result.
    pub fn load_history(&mut self, history: Vec<Message>, buffered: Vec<Message>) {
        let placeholders: Vec<Message> = self
            .messages
            .drain(..)
            .filter(|m| m.is_pending())
            .collect();
        self.ids.clear();

        let mut loaded = Vec::with_capacity(history.len() + buffered.len());
        for message in history.into_iter().chain(buffered) {
            if !self.accepts(&message) {
                tracing::warn!(message = %message.id, "Dropping message from another conversation");
                continue;
            }
            if self.ids.insert(message.id.clone()) {
                loaded.push(message);
            }
        }
        // Stable, so rows sharing a timestamp keep their store order
        loaded.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        self.messages = loaded;

        for placeholder in placeholders {
            let confirmed = placeholder.client_token.is_some()
                && self
                    .messages
                    .iter()
                    .any(|m| m.client_token == placeholder.client_token);
            if !confirmed {
                self.ids.insert(placeholder.id.clone());
                self.messages.push(placeholder);
            }
        }
    }

    /// Append an optimistic placeholder
    pub fn push_pending(&mut self, placeholder: Message) {
        self.ids.insert(placeholder.id.clone());
        self.messages.push(placeholder);
    }

    /// Merge a durable row delivered out of band (realtime push)
    pub fn merge(&mut self, message: Message) -> Merge {
        if !self.accepts(&message) {
            return Merge::Foreign;
        }
        if self.ids.contains(&message.id) {
            return Merge::Duplicate;
        }

        if let Some(index) = self.placeholder_index_for(&message) {
            self.replace_at(index, message);
            return Merge::Reconciled;
        }

        self.ids.insert(message.id.clone());
        self.messages.push(message);
        Merge::Appended
    }

    /// Replace the placeholder `temp_id` with the row the store returned
    ///
    /// The row keeps the placeholder's position. If the row already reached
    /// the sequence another way, the placeholder is dropped instead.
    pub fn reconcile(&mut self, temp_id: &str, confirmed: Message) -> Merge {
        let index = self.messages.iter().position(|m| m.id == temp_id);

        match index {
            Some(index) if self.ids.contains(&confirmed.id) => {
                let removed = self.messages.remove(index);
                self.ids.remove(&removed.id);
                Merge::Duplicate
            }
            Some(index) => {
                self.replace_at(index, confirmed);
                Merge::Reconciled
            }
            None => self.merge(confirmed),
        }
    }

    /// Remove the placeholder `temp_id`
    ///
    /// Returns whether it was present.
    pub fn rollback(&mut self, temp_id: &str) -> bool {
        match self.messages.iter().position(|m| m.id == temp_id) {
            Some(index) => {
                self.messages.remove(index);
                self.ids.remove(temp_id);
                true
            }
            None => false,
        }
    }

    fn placeholder_index_for(&self, message: &Message) -> Option<usize> {
        let token = message.client_token?;
        self.messages
            .iter()
            .position(|m| m.is_pending() && m.client_token == Some(token))
    }

    fn replace_at(&mut self, index: usize, message: Message) {
        self.ids.remove(&self.messages[index].id);
        self.ids.insert(message.id.clone());
        self.messages[index] = message;
    }
}
