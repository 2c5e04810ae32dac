use ratatui::{
    Frame,
    crossterm::event::KeyCode,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};
use tui_logger::TuiLoggerWidget;

use crate::{
    router::{RouteAction, RouteHandler, Tab},
    state::AppState,
};

#[derive(Debug)]
pub struct LogRoute;

impl RouteHandler for LogRoute {
    fn render(&self, frame: &mut Frame, area: Rect, _state: &AppState) {
        let log_widget = TuiLoggerWidget::default()
            .block(
                Block::default()
                    .title(" Log ")
                    .borders(Borders::ALL)
                    .border_style(
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
            )
            .style_error(Style::default().fg(Color::Red))
            .style_warn(Style::default().fg(Color::Yellow))
            .style_info(Style::default().fg(Color::Cyan))
            .style_debug(Style::default().fg(Color::Green))
            .style_trace(Style::default().fg(Color::Magenta))
            .style(Style::default().fg(Color::White));

        frame.render_widget(log_widget, area);
    }

    fn handle_input(&mut self, key: KeyCode, _state: &mut AppState) -> anyhow::Result<RouteAction> {
        match key {
            KeyCode::Esc => Ok(RouteAction::Switch(Tab::Plot)),
            _ => Ok(RouteAction::None),
        }
    }

    fn name(&self) -> &str {
        "Log"
    }

    fn help_items(&self) -> Vec<(&str, &str)> {
        vec![("Esc", "Back to Plot"), ("Tab", "Switch Tab"), ("Q", "Quit")]
    }
}
