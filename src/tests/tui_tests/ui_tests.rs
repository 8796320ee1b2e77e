// UI Tests - Testing UI helpers and full-frame rendering

use crate::notify::ToastDurations;
use crate::tests::fake::{at, msg, FakeBackend};
use crate::tui::ui::{format_message_time, toast_area, ui};
use crate::tui::App;
use ratatui::{backend::TestBackend, layout::Rect, Terminal};

fn render(app: &App<FakeBackend>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("Failed to create terminal");
    terminal.draw(|f| ui(f, app)).expect("Failed to draw");
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

#[test]
fn test_format_message_time() {
    let formatted = format_message_time(at(0));

    assert_eq!(formatted.len(), 5, "Expected HH:MM, got: {}", formatted);
    assert_eq!(&formatted[2..3], ":");
}

#[test]
fn test_toast_area_stacks_from_top_right() {
    let screen = Rect::new(0, 0, 100, 30);

    let first = toast_area(screen, 0).unwrap();
    let second = toast_area(screen, 1).unwrap();

    assert_eq!(first.x + first.width, 100);
    assert_eq!(first.width, 40);
    assert_eq!(second.y, first.y + first.height);
}

#[test]
fn test_toast_area_clipped_to_screen() {
    let narrow = Rect::new(0, 0, 20, 9);

    assert_eq!(toast_area(narrow, 0).map(|a| a.width), Some(20));
    assert!(toast_area(narrow, 1).is_some());
    assert!(toast_area(narrow, 2).is_none(), "Toasts past the bottom are skipped");
}

#[tokio::test]
async fn test_render_contact_list() {
    let backend = FakeBackend::signed_in("alice", &["bob", "carol"]);
    backend.follow("alice", "bob");
    let mut app = App::new(backend, "alice", ToastDurations::default());
    app.show_contact_list().await;

    let screen = render(&app);

    assert!(screen.contains("Messages (1 contacts)"));
    assert!(screen.contains("BOB"));
    assert!(screen.contains("Enter to chat"));
    assert!(!screen.contains("CAROL"));
}

#[tokio::test]
async fn test_render_empty_contact_list() {
    let backend = FakeBackend::signed_in("alice", &[]);
    let mut app = App::new(backend, "alice", ToastDurations::default());
    app.show_contact_list().await;

    assert!(render(&app).contains("You haven't followed anyone yet."));
}

#[tokio::test]
async fn test_render_chat_view_with_toast() {
    let backend = FakeBackend::signed_in("alice", &["bob"]);
    backend.seed(msg("m1", "bob", "alice", "hello alice", 10));
    backend.seed(msg("m2", "alice", "bob", "hi bob", 20));
    let mut app = App::new(backend.clone(), "alice", ToastDurations::default());

    app.open_chat("bob".to_string()).await;
    if let Some(view) = &mut app.view {
        view.toasts_mut().error("Failed to send");
    }

    let screen = render(&app);

    assert!(screen.contains("BOB"));
    assert!(screen.contains("hello alice"));
    assert!(screen.contains("You: hi bob"));
    assert!(screen.contains("Failed to send"), "Toast should be drawn");
}

#[tokio::test]
async fn test_render_empty_chat() {
    let backend = FakeBackend::signed_in("alice", &["bob"]);
    let mut app = App::new(backend, "alice", ToastDurations::default());

    app.open_chat("bob".to_string()).await;

    assert!(render(&app).contains("No messages yet."));
}

#[tokio::test]
async fn test_render_app_toast_over_contact_list() {
    let backend = FakeBackend::signed_in("alice", &["bob"]);
    let mut app = App::new(backend, "alice", ToastDurations::default());
    app.show_contact_list().await;
    app.toasts.error("Failed to send");

    let screen = render(&app);

    assert!(screen.contains("Failed to send"), "App toast should be drawn");
}

#[tokio::test]
async fn test_render_app_and_view_toasts_together() {
    let backend = FakeBackend::signed_in("alice", &["bob"]);
    let mut app = App::new(backend, "alice", ToastDurations::default());
    app.toasts.success("Message sent");
    app.open_chat("bob".to_string()).await;
    if let Some(view) = &mut app.view {
        view.toasts_mut().error("Failed to load chat");
    }

    let screen = render(&app);

    assert!(screen.contains("Message sent"));
    assert!(screen.contains("Failed to load chat"));
}
