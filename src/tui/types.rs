//! Core types for TUI screens and navigation

/// Application screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Profiles the user follows, to pick a conversation
    ContactList,
    /// One open conversation
    ChatView,
}
