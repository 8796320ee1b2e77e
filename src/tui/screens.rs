//! Screen state structures for TUI

use crate::models::Profile;

/// Contact list screen state
#[derive(Debug, Default)]
pub struct ContactListScreen {
    /// Profiles the user follows
    pub contacts: Vec<Profile>,
    /// Selected contact index
    pub selected_index: usize,
    /// Status message
    pub status_message: Option<String>,
}

impl ContactListScreen {
    /// Create new contact list screen
    pub fn new(contacts: Vec<Profile>) -> Self {
        Self {
            contacts,
            selected_index: 0,
            status_message: None,
        }
    }

    /// Move to next contact
    pub fn next(&mut self) {
        let count = self.contacts.len();
        if count > 0 {
            self.selected_index = (self.selected_index + 1) % count;
        }
    }

    /// Move to previous contact
    pub fn previous(&mut self) {
        let count = self.contacts.len();
        if count > 0 {
            if self.selected_index > 0 {
                self.selected_index -= 1;
            } else {
                self.selected_index = count - 1;
            }
        }
    }

    /// Currently highlighted contact
    pub fn selected(&self) -> Option<&Profile> {
        self.contacts.get(self.selected_index)
    }

    /// Set status message
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }
}

/// Chat view screen state
///
/// The compose input and the messages live in the view; this only tracks
/// presentation state.
#[derive(Debug, Default)]
pub struct ChatViewScreen {
    /// Number of messages scrolled up from the newest one
    pub scroll_offset: usize,
}

impl ChatViewScreen {
    /// Create new chat view screen pinned to the newest message
    pub fn new() -> Self {
        Self { scroll_offset: 0 }
    }

    /// Scroll towards older messages
    pub fn scroll_up(&mut self, message_count: usize) {
        if self.scroll_offset + 1 < message_count {
            self.scroll_offset += 1;
        }
    }

    /// Scroll towards newer messages
    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Jump back to the newest message
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    /// Index range of messages to draw in `height` rows
    pub fn visible_range(&self, message_count: usize, height: usize) -> std::ops::Range<usize> {
        let end = message_count.saturating_sub(self.scroll_offset);
        let start = end.saturating_sub(height);
        start..end
    }
}
