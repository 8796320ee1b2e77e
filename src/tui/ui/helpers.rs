//! UI helper functions

use crate::notify::{ToastKind, Toasts};
use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const TOAST_WIDTH: u16 = 40;
const TOAST_HEIGHT: u16 = 4;

/// Format a message timestamp as local `HH:MM`
pub fn format_message_time(created_at: DateTime<Utc>) -> String {
    created_at.with_timezone(&Local).format("%H:%M").to_string()
}

/// Area of the `index`-th toast, stacked downwards from the top-right corner
pub fn toast_area(screen: Rect, index: usize) -> Option<Rect> {
    let width = TOAST_WIDTH.min(screen.width);
    let y = screen.y + 1 + (index as u16).saturating_mul(TOAST_HEIGHT);
    if y + TOAST_HEIGHT > screen.y + screen.height {
        return None;
    }
    Some(Rect::new(
        screen.x + screen.width - width,
        y,
        width,
        TOAST_HEIGHT,
    ))
}

/// Draw visible toasts over the current screen, newest stack and toast first
pub fn render_toasts(f: &mut Frame, stacks: &[&Toasts]) {
    let size = f.size();
    let toasts = stacks
        .iter()
        .rev()
        .flat_map(|stack| stack.visible().iter().rev());

    for (index, toast) in toasts.enumerate() {
        let Some(area) = toast_area(size, index) else {
            break;
        };

        let color = match toast.kind {
            ToastKind::Error => Color::Red,
            ToastKind::Success => Color::Green,
            ToastKind::Info => Color::Cyan,
        };

        let body = Paragraph::new(Line::from(Span::styled(
            toast.message.as_str(),
            Style::default().fg(Color::White),
        )))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(Span::styled(
                    toast.kind.label(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )),
        );

        f.render_widget(Clear, area);
        f.render_widget(body, area);
    }
}
