// Screen Tests - Testing screen state structs

use crate::models::Profile;
use crate::tui::screens::*;

fn contacts() -> Vec<Profile> {
    vec![
        Profile::new("bob", "Bob"),
        Profile::new("carol", "Carol"),
        Profile::new("dave", "Dave"),
    ]
}

#[test]
fn test_contact_list_navigation_wraps() {
    let mut screen = ContactListScreen::new(contacts());
    assert_eq!(screen.selected_index, 0, "Should start with first contact");

    screen.next();
    screen.next();
    assert_eq!(screen.selected().map(|p| p.id.as_str()), Some("dave"));

    screen.next();
    assert_eq!(screen.selected_index, 0, "Should wrap to the first contact");

    screen.previous();
    assert_eq!(screen.selected_index, 2, "Should wrap to the last contact");
}

#[test]
fn test_empty_contact_list() {
    let mut screen = ContactListScreen::new(Vec::new());

    screen.next();
    screen.previous();

    assert_eq!(screen.selected_index, 0);
    assert!(screen.selected().is_none());
    assert!(screen.status_message.is_none());
}

#[test]
fn test_contact_list_status() {
    let mut screen = ContactListScreen::default();
    screen.set_status("Failed to load contacts".to_string());

    assert_eq!(
        screen.status_message.as_deref(),
        Some("Failed to load contacts")
    );
}

#[test]
fn test_chat_view_scrolling_is_bounded() {
    let mut screen = ChatViewScreen::new();

    screen.scroll_down();
    assert_eq!(screen.scroll_offset, 0, "Cannot scroll past the newest message");

    for _ in 0..10 {
        screen.scroll_up(3);
    }
    assert_eq!(screen.scroll_offset, 2, "Oldest message stays on screen");

    screen.scroll_to_bottom();
    assert_eq!(screen.scroll_offset, 0);
}

#[test]
fn test_visible_range_follows_newest() {
    let mut screen = ChatViewScreen::new();

    assert_eq!(screen.visible_range(10, 4), 6..10);
    assert_eq!(screen.visible_range(3, 4), 0..3);
    assert_eq!(screen.visible_range(0, 4), 0..0);

    screen.scroll_up(10);
    screen.scroll_up(10);
    assert_eq!(screen.visible_range(10, 4), 4..8);
}
