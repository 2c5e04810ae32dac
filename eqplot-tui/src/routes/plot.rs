use std::time::Instant;

use eqplot_core::{
    filter::{FilterDefinition, is_system_filter},
    interaction::{PlotKey, PointerEvent, PointerKind},
    plot::render::format_frequency,
};
use ratatui::{
    Frame,
    crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind},
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::{
    router::{RouteAction, RouteHandler, Tab},
    state::AppState,
    surface::{cell_to_pixel, draw_recording},
};

/// Graph with draggable markers plus a filter list
#[derive(Debug, Clone)]
pub struct PlotRoute;

impl PlotRoute {
    fn nudge(state: &mut AppState, key: PlotKey) {
        state.session.handle_key(key, Instant::now());
    }

    fn add_filter(state: &mut AppState) {
        let name = state.session.store_mut().add_filter(1000.0);
        log::info!("added {}", name);
        state.status_message = format!("Added {}", name);
        Self::commit_edit(state);
    }

    fn remove_selected(state: &mut AppState) {
        let Some(name) = state.selected_filter().map(str::to_string) else {
            state.status_message = "Select a filter first".to_string();
            return;
        };
        Self::nudge(state, PlotKey::Escape);
        match state.session.store_mut().remove_filter(&name) {
            Ok(()) => {
                log::info!("removed {}", name);
                state.status_message = format!("Removed {}", name);
                Self::commit_edit(state);
            }
            Err(e) => log::warn!("cannot remove {}: {}", name, e),
        }
    }

    fn cycle_selected_subtype(state: &mut AppState) {
        let Some(name) = state.selected_filter().map(str::to_string) else {
            state.status_message = "Select a filter first".to_string();
            return;
        };
        match state.session.store_mut().cycle_subtype(&name) {
            Ok(subtype) => {
                state.status_message = format!("{} is now {}", name, subtype);
                Self::commit_edit(state);
            }
            Err(e) => log::warn!("cannot change type of {}: {}", name, e),
        }
    }

    /// Structural edits go out right away
    fn commit_edit(state: &mut AppState) {
        state.session.request_redraw();
        state.session.commit();
    }
}

impl RouteHandler for PlotRoute {
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(40),    // Graph
                Constraint::Length(36), // Filter list
            ])
            .split(area);

        draw_graph(frame, chunks[0], state);
        draw_filter_list(frame, chunks[1], state);
    }

    fn handle_input(&mut self, key: KeyCode, state: &mut AppState) -> anyhow::Result<RouteAction> {
        match key {
            KeyCode::Up => Self::nudge(state, PlotKey::ArrowUp),
            KeyCode::Down => Self::nudge(state, PlotKey::ArrowDown),
            KeyCode::Left => Self::nudge(state, PlotKey::ArrowLeft),
            KeyCode::Right => Self::nudge(state, PlotKey::ArrowRight),
            KeyCode::Esc => Self::nudge(state, PlotKey::Escape),
            KeyCode::Char('a') => Self::add_filter(state),
            KeyCode::Char('x') | KeyCode::Delete => Self::remove_selected(state),
            KeyCode::Char('t') => Self::cycle_selected_subtype(state),
            KeyCode::Char('d') => {
                let dual = !state.session.options().dual_channel;
                state.session.set_dual_channel(dual);
                state.status_message = if dual {
                    "Plotting channels separately".to_string()
                } else {
                    "Plotting all channels together".to_string()
                };
            }
            KeyCode::Char('w') => {
                state.session.flush();
                state.status_message = "Uploading".to_string();
            }
            KeyCode::Char('l') => return Ok(RouteAction::Switch(Tab::Log)),
            _ => {}
        }
        Ok(RouteAction::None)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, state: &mut AppState) -> anyhow::Result<RouteAction> {
        let area = state.plot_area.get();
        let inside = area.contains(Position::new(mouse.column, mouse.row));
        let (x, y) = cell_to_pixel(area, mouse.column, mouse.row);
        // terminals often keep shift+drag for text selection, so alt and ctrl work too
        let q_mode = mouse
            .modifiers
            .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT | KeyModifiers::CONTROL);
        let now = Instant::now();

        let kind = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if inside => PointerKind::Down,
            MouseEventKind::Drag(MouseButton::Left) => PointerKind::Move,
            MouseEventKind::Up(MouseButton::Left) => PointerKind::Up,
            MouseEventKind::Moved if inside => PointerKind::Move,
            MouseEventKind::Moved => PointerKind::Leave,
            MouseEventKind::ScrollUp if inside => {
                state.session.handle_wheel(x, y, -1.0, now);
                return Ok(RouteAction::None);
            }
            MouseEventKind::ScrollDown if inside => {
                state.session.handle_wheel(x, y, 1.0, now);
                return Ok(RouteAction::None);
            }
            _ => return Ok(RouteAction::None),
        };
        let event = PointerEvent::new(kind, x, y).with_shift(q_mode);
        state.session.handle_pointer(&event, now);
        Ok(RouteAction::None)
    }

    fn name(&self) -> &str {
        "Plot"
    }

    fn on_enter(&mut self, state: &mut AppState) -> anyhow::Result<()> {
        state.session.request_redraw();
        Ok(())
    }

    fn help_items(&self) -> Vec<(&str, &str)> {
        vec![
            ("Drag", "Freq/Gain"),
            ("Alt+Drag/Wheel", "Q"),
            ("Arrows", "Nudge"),
            ("A", "Add"),
            ("X", "Remove"),
            ("T", "Type"),
            ("D", "Dual"),
            ("W", "Upload"),
            ("Tab", "Switch Tab"),
            ("Q", "Quit"),
        ]
    }
}

fn draw_graph(f: &mut Frame, area: Rect, state: &AppState) {
    let channels = if state.session.options().dual_channel {
        " Equalizer (per channel) "
    } else {
        " Equalizer "
    };
    let block = Block::default()
        .title(channels)
        .title_bottom(format!(" Peak {:+.0} dB ", state.session.peak_db()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));

    let inner = block.inner(area);
    f.render_widget(block, area);
    state.plot_area.set(inner);
    draw_recording(f, inner, &state.recording);
}

fn draw_filter_list(f: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(" Filters ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let items: Vec<ListItem> = state
        .filter_rows()
        .into_iter()
        .map(|(name, filter, selected)| {
            let style = if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if is_system_filter(&name) {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            let prefix = if selected { "▶ " } else { "  " };
            ListItem::new(vec![
                Line::from(Span::styled(format!("{}{}", prefix, name), style)),
                Line::from(Span::styled(
                    format!("    {}", describe(&filter)),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect();

    if items.is_empty() {
        let empty_msg = Paragraph::new("No filters. Press A to add one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty_msg, area);
    } else {
        f.render_widget(List::new(items).block(block), area);
    }
}

fn describe(filter: &FilterDefinition) -> String {
    match filter {
        FilterDefinition::Biquad(p) => format!(
            "{} {} {:+.1}dB Q{:.2}",
            p.subtype,
            format_frequency(p.frequency),
            p.gain,
            p.q
        ),
        FilterDefinition::Gain { gain } => format!("Gain {:+.1}dB", gain),
        other => other.kind_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eqplot_core::BiquadSubtype;

    #[test]
    fn test_describe() {
        let peak = FilterDefinition::biquad(BiquadSubtype::Peaking, 1500.0, -2.0, 1.414);
        assert_eq!(describe(&peak), "Peaking 1.50 kHz -2.0dB Q1.41");
        assert_eq!(describe(&FilterDefinition::Gain { gain: 3.0 }), "Gain +3.0dB");
    }
}
