//! Contact list screen rendering

use crate::backend::Backend;
use crate::tui::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Renders the screen
pub fn render_contact_list<B: Backend>(f: &mut Frame, app: &App<B>) {
    let size = f.size();

    let Some(screen) = &app.contact_list_screen else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(5),    // Contacts
            Constraint::Length(3), // Status/Help
        ])
        .split(size);

    let title = Paragraph::new(format!("Messages ({} contacts)", screen.contacts.len()))
        .style(
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    if screen.contacts.is_empty() {
        let empty_msg = Paragraph::new("You haven't followed anyone yet.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Contacts"));
        f.render_widget(empty_msg, chunks[1]);
    } else {
        let items: Vec<ListItem> = screen
            .contacts
            .iter()
            .enumerate()
            .map(|(i, profile)| {
                let style = if i == screen.selected_index {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Magenta)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {} ", profile.display_name()), style),
                    Span::styled(
                        "  Enter to chat",
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Contacts"));
        f.render_widget(list, chunks[1]);
    }

    let help_text = screen.status_message.clone().unwrap_or_else(|| {
        "↑/↓: Select | Enter: Open chat | r: Refresh | Ctrl+L: Dismiss | q/Esc: Quit".to_string()
    });
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}
