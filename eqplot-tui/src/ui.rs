use eqplot_core::FilterStore;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use strum::IntoEnumIterator;

use crate::{
    router::{Router, Tab},
    state::AppState,
};

/// Draw the TUI interface
pub fn draw(f: &mut Frame, state: &AppState, router: &Router) {
    // Main horizontal split: Sidebar (left) and Main Content (right)
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12), // Sidebar navigation
            Constraint::Min(40),    // Main content area
        ])
        .split(f.area());

    draw_sidebar(f, main_chunks[0], router.current_tab());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Route content
            Constraint::Length(3), // Controls info
            Constraint::Length(3), // Status bar
        ])
        .split(main_chunks[1]);

    router.current().render(f, chunks[0], state);
    draw_controls(f, chunks[1], &router.current().help_items());
    draw_status(f, chunks[2], state);
}

/// Draw the sidebar navigation
fn draw_sidebar(f: &mut Frame, area: Rect, active: Tab) {
    let block = Block::default()
        .title(" Tabs ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let nav_text: Vec<Line> = Tab::iter()
        .map(|tab| {
            let is_active = tab == active;
            let prefix = if is_active { "▶ " } else { "  " };
            let style = if is_active {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(format!("{}{}", prefix, tab), style))
        })
        .collect();

    f.render_widget(Paragraph::new(nav_text), inner);
}

/// Draw the controls help section
fn draw_controls(f: &mut Frame, area: Rect, items: &[(&str, &str)]) {
    let controls: Vec<Span> = items
        .iter()
        .flat_map(|(key, action)| {
            let key_style = match *key {
                "Q" => Style::default().fg(Color::Red),
                "Tab" => Style::default().fg(Color::Magenta),
                _ => Style::default().fg(Color::Yellow),
            };
            [
                Span::styled(format!("[{}]", key), key_style),
                Span::raw(format!(" {}  ", action)),
            ]
        })
        .collect();

    let paragraph = Paragraph::new(Line::from(controls))
        .block(Block::default().borders(Borders::ALL).title(" Controls "));

    f.render_widget(paragraph, area);
}

/// Draw the status section
fn draw_status(f: &mut Frame, area: Rect, state: &AppState) {
    let status_style = if state.session.upload_pending() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Green)
    };

    let revision = state
        .revision
        .map_or_else(|| "never uploaded".to_string(), |r| format!("rev {}", r));
    let selected = state.selected_filter().unwrap_or("none");
    let status_text = format!(
        "{}  |  Selected: {}  |  Channels: {}  |  {}",
        state.status_message,
        selected,
        state.session.store().channel_count(),
        revision
    );

    let paragraph = Paragraph::new(status_text)
        .style(status_style)
        .block(Block::default().borders(Borders::ALL).title(" Status "));

    f.render_widget(paragraph, area);
}
