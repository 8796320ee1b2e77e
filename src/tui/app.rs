//! Main TUI application state and logic

use crate::backend::{Backend, MessageStore, ProfileDirectory};
use crate::models::Message;
use crate::notify::{ToastDurations, Toasts};
use crate::tui::screens::{ChatViewScreen, ContactListScreen};
use crate::tui::types::Screen;
use crate::view::{DirectMessageView, PendingSend, ViewStatus, SEND_FAILED_MESSAGE};
use crate::Result;
use chrono::Utc;
use tokio::sync::mpsc;

type SendResult = (PendingSend, Result<Message>);

/// Contact list hint while a conversation is being loaded
pub const OPENING_CHAT_STATUS: &str = "Opening chat...";

/// Notice for a write confirmed after its chat was closed
pub const SENT_AFTER_CLOSE_MESSAGE: &str = "Message sent";

/// Notice when a chat cannot be opened without a session
pub const SIGN_IN_MESSAGE: &str = "Please sign in first";

/// Application state
pub struct App<B: Backend> {
    /// Current screen
    pub current_screen: Screen,
    /// Should quit
    pub should_quit: bool,
    /// Id of the signed-in user
    pub me: String,
    /// Contact list screen (when active)
    pub contact_list_screen: Option<ContactListScreen>,
    /// Chat view screen (when active)
    pub chat_view_screen: Option<ChatViewScreen>,
    /// Open conversation
    pub view: Option<DirectMessageView<B>>,
    /// Notices raised outside of a conversation
    pub toasts: Toasts,
    backend: B,
    toast_durations: ToastDurations,
    send_tx: mpsc::UnboundedSender<SendResult>,
    send_rx: mpsc::UnboundedReceiver<SendResult>,
}

impl<B: Backend> App<B> {
    /// Create new application for the signed-in user `me`
    pub fn new(backend: B, me: impl Into<String>, toast_durations: ToastDurations) -> Self {
        let (send_tx, send_rx) = mpsc::unbounded_channel();
        Self {
            current_screen: Screen::ContactList,
            should_quit: false,
            me: me.into(),
            contact_list_screen: None,
            chat_view_screen: None,
            view: None,
            toasts: Toasts::new(toast_durations),
            backend,
            toast_durations,
            send_tx,
            send_rx,
        }
    }

    /// Show the list of followed profiles
    pub async fn show_contact_list(&mut self) {
        let mut screen = match self.backend.followed_profiles(&self.me).await {
            Ok(contacts) => ContactListScreen::new(contacts),
            Err(e) => {
                tracing::error!("Error fetching contacts: {}", e);
                let mut screen = ContactListScreen::default();
                screen.set_status("Failed to load contacts".to_string());
                screen
            }
        };

        // Keep the cursor where it was when coming back from a chat
        if let Some(previous) = &self.contact_list_screen {
            if previous.selected_index < screen.contacts.len() {
                screen.selected_index = previous.selected_index;
            }
        }

        self.contact_list_screen = Some(screen);
        self.current_screen = Screen::ContactList;
    }

    /// Show that the highlighted chat is being opened
    ///
    /// The front-end draws a frame after this, before awaiting
    /// [`App::open_selected_chat`].
    pub fn mark_opening_chat(&mut self) {
        if let Some(screen) = &mut self.contact_list_screen {
            if screen.selected().is_some() {
                screen.set_status(OPENING_CHAT_STATUS.to_string());
            }
        }
    }

    /// Open the highlighted contact
    pub async fn open_selected_chat(&mut self) {
        let selected = self
            .contact_list_screen
            .as_ref()
            .and_then(|s| s.selected())
            .map(|p| p.id.clone());

        if let Some(counterpart_id) = selected {
            self.open_chat(counterpart_id).await;
        }
    }

    /// Open the conversation with `counterpart_id`
    pub async fn open_chat(&mut self, counterpart_id: String) {
        let status = match self.view.as_mut() {
            Some(view) => view.switch_counterpart(counterpart_id).await,
            None => {
                let mut view = DirectMessageView::with_toast_durations(
                    self.backend.clone(),
                    counterpart_id,
                    self.toast_durations,
                );
                let status = view.mount().await;
                self.view = Some(view);
                status
            }
        };

        if status == ViewStatus::LoginRequired {
            tracing::warn!("Session missing, cannot open chat");
            self.view = None;
            if let Some(screen) = &mut self.contact_list_screen {
                screen.status_message = None;
            }
            self.toasts.info(SIGN_IN_MESSAGE);
            self.current_screen = Screen::ContactList;
            return;
        }

        if let Some(screen) = &mut self.contact_list_screen {
            screen.status_message = None;
        }

        self.chat_view_screen = Some(ChatViewScreen::new());
        self.current_screen = Screen::ChatView;
    }

    /// Close the open conversation and go back to the contact list
    pub async fn back_to_contact_list(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.unmount();
        }
        self.view = None;
        self.chat_view_screen = None;
        self.show_contact_list().await;
    }

    /// Send the compose input of the open conversation
    ///
    /// The placeholder shows up immediately; the durable write runs on a
    /// separate task and is reconciled by [`App::tick`].
    pub fn send_message_in_chat(&mut self) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        let Some(pending) = view.begin_send() else {
            return;
        };

        if let Some(screen) = &mut self.chat_view_screen {
            screen.scroll_to_bottom();
        }

        let backend = self.backend.clone();
        let tx = self.send_tx.clone();
        tokio::spawn(async move {
            let result = backend.insert(pending.payload.clone()).await;
            // Receiver only disappears when the app shuts down
            let _ = tx.send((pending, result));
        });
    }

    /// Apply everything that happened since the last frame
    ///
    /// Drains realtime rows and finished writes into the open view and
    /// prunes expired toasts. Writes that finish after their chat was closed
    /// are reported with an app-level toast.
    pub fn tick(&mut self) {
        while let Ok((pending, result)) = self.send_rx.try_recv() {
            match self.view.as_mut() {
                Some(view) => {
                    view.complete_send(pending, result);
                }
                None => match result {
                    Ok(stored) => {
                        tracing::info!("Message {} stored after chat was closed", stored.id);
                        self.toasts.success(SENT_AFTER_CLOSE_MESSAGE);
                    }
                    Err(e) => {
                        tracing::error!("Send error after chat was closed: {}", e);
                        self.toasts.error(SEND_FAILED_MESSAGE);
                    }
                },
            }
        }

        let now = Utc::now();
        if let Some(view) = self.view.as_mut() {
            view.poll_realtime();
            view.toasts_mut().prune(now);
        }
        self.toasts.prune(now);
    }

    /// Number of messages in the open conversation
    pub fn message_count(&self) -> usize {
        self.view.as_ref().map(|v| v.messages().len()).unwrap_or(0)
    }
}
