//! Chat view screen rendering

use crate::backend::Backend;
use crate::tui::app::App;
use crate::tui::ui::helpers::format_message_time;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Renders the screen
pub fn render_chat_view<B: Backend>(f: &mut Frame, app: &App<B>) {
    let size = f.size();

    let (Some(view), Some(screen)) = (&app.view, &app.chat_view_screen) else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(5),    // Message history
            Constraint::Length(3), // Input box
            Constraint::Length(3), // Help
        ])
        .split(size);

    let live = if view.is_subscribed() { "● live" } else { "○ offline" };
    let title = Paragraph::new(Line::from(vec![
        Span::styled(
            view.title().to_string(),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", live), Style::default().fg(Color::Green)),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let messages = view.messages();
    if messages.is_empty() {
        let empty_msg = Paragraph::new("No messages yet. Say hi! 👋")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Messages"));
        f.render_widget(empty_msg, chunks[1]);
    } else {
        let visible_height = chunks[1].height.saturating_sub(2) as usize;
        let range = screen.visible_range(messages.len(), visible_height);
        let shown = range.end;

        let message_lines: Vec<Line> = messages[range]
            .iter()
            .map(|msg| {
                let is_me = view.is_mine(msg);
                let (label, color) = if is_me {
                    ("You", Color::Magenta)
                } else {
                    (view.title(), Color::Blue)
                };
                let content_style = if msg.is_pending() {
                    Style::default().fg(Color::DarkGray)
                } else {
                    Style::default().fg(Color::White)
                };

                let mut spans = vec![
                    Span::styled(
                        format!("[{}] ", format_message_time(msg.created_at)),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        format!("{}: ", label),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(msg.content.clone(), content_style),
                ];
                if is_me {
                    spans.push(Span::styled(
                        format!(" {}", msg.status_indicator()),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                Line::from(spans)
            })
            .collect();

        let messages_widget = Paragraph::new(message_lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Messages ({}/{})", shown, messages.len())),
        );
        f.render_widget(messages_widget, chunks[1]);
    }

    let input_widget = Paragraph::new(view.compose())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Type a message..."),
        );
    f.render_widget(input_widget, chunks[2]);

    let help = Paragraph::new("Enter: Send | ↑/↓: Scroll | Ctrl+L: Dismiss | Esc: Back | Ctrl+C: Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}
