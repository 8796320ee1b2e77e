// App Tests - Testing App navigation and the background send path

use crate::notify::{ToastDurations, ToastKind};
use crate::tests::fake::{msg, FakeBackend};
use crate::tui::app::{OPENING_CHAT_STATUS, SENT_AFTER_CLOSE_MESSAGE, SIGN_IN_MESSAGE};
use crate::tui::{App, Screen};
use crate::view::{ViewStatus, SEND_FAILED_MESSAGE};
use std::time::Duration;

fn app_for(backend: &FakeBackend) -> App<FakeBackend> {
    App::new(backend.clone(), "alice", ToastDurations::default())
}

/// Tick until no placeholder is left, or give up after a while
async fn settle(app: &mut App<FakeBackend>) {
    for _ in 0..200 {
        app.tick();
        let pending = app
            .view
            .as_ref()
            .and_then(|v| v.conversation())
            .map(|c| c.pending_count())
            .unwrap_or(0);
        if pending == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[test]
fn test_app_initialization() {
    let backend = FakeBackend::signed_in("alice", &[]);
    let app = app_for(&backend);

    assert_eq!(app.current_screen, Screen::ContactList);
    assert!(!app.should_quit, "Should not be quitting initially");
    assert!(app.view.is_none());
    assert_eq!(app.message_count(), 0);
}

#[tokio::test]
async fn test_contact_list_shows_followed_profiles() {
    let backend = FakeBackend::signed_in("alice", &["bob", "carol", "dave"]);
    backend.follow("alice", "bob");
    backend.follow("alice", "carol");
    backend.follow("bob", "dave");
    let mut app = app_for(&backend);

    app.show_contact_list().await;

    let screen = app.contact_list_screen.as_ref().expect("Screen should exist");
    let ids: Vec<&str> = screen.contacts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["bob", "carol"]);
    assert!(screen.status_message.is_none());
}

#[tokio::test]
async fn test_open_selected_chat() {
    let backend = FakeBackend::signed_in("alice", &["bob", "carol"]);
    backend.follow("alice", "bob");
    backend.follow("alice", "carol");
    backend.seed(msg("m1", "carol", "alice", "hey", 10));
    let mut app = app_for(&backend);
    app.show_contact_list().await;

    if let Some(screen) = &mut app.contact_list_screen {
        screen.next();
    }
    app.open_selected_chat().await;

    assert_eq!(app.current_screen, Screen::ChatView);
    assert!(app.chat_view_screen.is_some());
    let view = app.view.as_ref().expect("View should be open");
    assert_eq!(view.counterpart_id(), "carol");
    assert_eq!(view.status(), ViewStatus::Ready);
    assert_eq!(app.message_count(), 1);
}

#[tokio::test]
async fn test_open_chat_without_session() {
    let backend = FakeBackend::signed_in("alice", &["bob"]);
    backend.sign_out();
    let mut app = app_for(&backend);

    app.open_chat("bob".to_string()).await;

    assert_eq!(app.current_screen, Screen::ContactList);
    assert!(app.view.is_none());
    assert_eq!(app.toasts.count(ToastKind::Info), 1);
    assert_eq!(
        app.toasts.latest().map(|t| t.message.as_str()),
        Some(SIGN_IN_MESSAGE)
    );
}

#[tokio::test]
async fn test_send_reconciles_on_tick() {
    let backend = FakeBackend::signed_in("alice", &["bob"]);
    let mut app = app_for(&backend);
    app.open_chat("bob".to_string()).await;

    if let Some(view) = &mut app.view {
        view.set_compose("hello bob");
    }
    app.send_message_in_chat();

    // Placeholder is visible before the write finishes
    assert_eq!(app.message_count(), 1);
    assert!(app.view.as_ref().unwrap().messages()[0].is_pending());

    settle(&mut app).await;

    let view = app.view.as_ref().unwrap();
    assert_eq!(view.messages().len(), 1);
    assert_eq!(view.messages()[0].id, "srv-1");
    assert_eq!(backend.insert_calls(), 1);
}

#[tokio::test]
async fn test_failed_send_rolls_back_on_tick() {
    let backend = FakeBackend::signed_in("alice", &["bob"]);
    backend.fail_insert(true);
    let mut app = app_for(&backend);
    app.open_chat("bob".to_string()).await;

    if let Some(view) = &mut app.view {
        view.set_compose("doomed");
    }
    app.send_message_in_chat();
    settle(&mut app).await;

    let view = app.view.as_ref().unwrap();
    assert!(view.messages().is_empty());
    assert_eq!(view.toasts().count(ToastKind::Error), 1);
    assert_eq!(
        view.toasts().latest().map(|t| t.message.as_str()),
        Some(SEND_FAILED_MESSAGE)
    );
}

#[tokio::test]
async fn test_blank_send_does_nothing() {
    let backend = FakeBackend::signed_in("alice", &["bob"]);
    let mut app = app_for(&backend);
    app.open_chat("bob".to_string()).await;

    app.send_message_in_chat();
    settle(&mut app).await;

    assert_eq!(app.message_count(), 0);
    assert_eq!(backend.insert_calls(), 0);
}

#[tokio::test]
async fn test_tick_applies_realtime() {
    let backend = FakeBackend::signed_in("alice", &["bob"]);
    let mut app = app_for(&backend);
    app.open_chat("bob".to_string()).await;

    backend.push_realtime(msg("in-1", "bob", "alice", "ping", 10));
    app.tick();

    assert_eq!(app.message_count(), 1);
}

#[tokio::test]
async fn test_back_to_contact_list_unsubscribes() {
    let backend = FakeBackend::signed_in("alice", &["bob"]);
    backend.follow("alice", "bob");
    let mut app = app_for(&backend);
    app.show_contact_list().await;
    app.open_chat("bob".to_string()).await;
    assert_eq!(backend.listener_count(), 1);

    app.back_to_contact_list().await;

    assert_eq!(app.current_screen, Screen::ContactList);
    assert!(app.view.is_none());
    assert!(app.chat_view_screen.is_none());
    assert_eq!(backend.listener_count(), 0);
    assert_eq!(app.contact_list_screen.as_ref().unwrap().contacts.len(), 1);
}

#[tokio::test]
async fn test_switching_chats_keeps_one_listener() {
    let backend = FakeBackend::signed_in("alice", &["bob", "carol"]);
    let mut app = app_for(&backend);

    app.open_chat("bob".to_string()).await;
    app.open_chat("carol".to_string()).await;

    assert_eq!(backend.listener_count(), 1);
    assert_eq!(app.view.as_ref().unwrap().counterpart_id(), "carol");
}

#[tokio::test]
async fn test_contact_list_keeps_selection_on_refresh() {
    let backend = FakeBackend::signed_in("alice", &["bob", "carol"]);
    backend.follow("alice", "bob");
    backend.follow("alice", "carol");
    let mut app = app_for(&backend);
    app.show_contact_list().await;

    if let Some(screen) = &mut app.contact_list_screen {
        screen.next();
    }
    app.show_contact_list().await;

    assert_eq!(app.contact_list_screen.as_ref().unwrap().selected_index, 1);
}

/// Tick until the app raised a toast, or give up after a while
async fn wait_for_app_toast(app: &mut App<FakeBackend>) {
    for _ in 0..200 {
        app.tick();
        if !app.toasts.is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn test_failed_send_after_leaving_chat_is_reported() {
    let backend = FakeBackend::signed_in("alice", &["bob"]);
    backend.follow("alice", "bob");
    backend.fail_insert(true);
    let mut app = app_for(&backend);
    app.show_contact_list().await;
    app.open_chat("bob".to_string()).await;

    if let Some(view) = &mut app.view {
        view.set_compose("left too soon");
    }
    app.send_message_in_chat();
    app.back_to_contact_list().await;
    wait_for_app_toast(&mut app).await;

    assert_eq!(backend.insert_calls(), 1);
    assert_eq!(app.current_screen, Screen::ContactList);
    assert_eq!(app.toasts.count(ToastKind::Error), 1);
    assert_eq!(
        app.toasts.latest().map(|t| t.message.as_str()),
        Some(SEND_FAILED_MESSAGE)
    );
}

#[tokio::test]
async fn test_send_confirmed_after_leaving_chat_is_reported() {
    let backend = FakeBackend::signed_in("alice", &["bob"]);
    let mut app = app_for(&backend);
    app.open_chat("bob".to_string()).await;

    if let Some(view) = &mut app.view {
        view.set_compose("see you");
    }
    app.send_message_in_chat();
    app.back_to_contact_list().await;
    wait_for_app_toast(&mut app).await;

    assert_eq!(app.toasts.count(ToastKind::Success), 1);
    assert_eq!(
        app.toasts.latest().map(|t| t.message.as_str()),
        Some(SENT_AFTER_CLOSE_MESSAGE)
    );

    // The stored row shows up when the chat is reopened
    app.open_chat("bob".to_string()).await;
    assert_eq!(app.message_count(), 1);
}

#[tokio::test]
async fn test_opening_chat_status_is_cleared_once_open() {
    let backend = FakeBackend::signed_in("alice", &["bob"]);
    backend.follow("alice", "bob");
    let mut app = app_for(&backend);
    app.show_contact_list().await;

    app.mark_opening_chat();
    assert_eq!(
        app.contact_list_screen
            .as_ref()
            .and_then(|s| s.status_message.as_deref()),
        Some(OPENING_CHAT_STATUS)
    );

    app.open_selected_chat().await;

    assert_eq!(app.current_screen, Screen::ChatView);
    assert!(app.contact_list_screen.as_ref().unwrap().status_message.is_none());
}

#[tokio::test]
async fn test_opening_chat_status_needs_a_selection() {
    let backend = FakeBackend::signed_in("alice", &[]);
    let mut app = app_for(&backend);
    app.show_contact_list().await;

    app.mark_opening_chat();

    assert!(app.contact_list_screen.as_ref().unwrap().status_message.is_none());
}
