//! UI rendering module - screen-specific rendering functions
//!
//! Each screen has its own file; toasts are drawn on top of either screen.

mod chat_view;
mod contact_list;
mod helpers;

use crate::backend::Backend;
use crate::tui::app::App;
use crate::tui::types::Screen;
use ratatui::Frame;

// Re-export render functions
pub use chat_view::render_chat_view;
pub use contact_list::render_contact_list;

// Re-export helper functions
pub use helpers::{format_message_time, render_toasts, toast_area};

/// Main UI rendering function - dispatches to screen-specific render functions
pub fn ui<B: Backend>(f: &mut Frame, app: &App<B>) {
    match app.current_screen {
        Screen::ContactList => render_contact_list(f, app),
        Screen::ChatView => render_chat_view(f, app),
    }

    let mut stacks = vec![&app.toasts];
    if let Some(view) = &app.view {
        stacks.push(view.toasts());
    }
    render_toasts(f, &stacks);
}
