use anyhow::Result;
use ratatui::{
    Frame,
    crossterm::event::{KeyCode, MouseEvent},
    layout::Rect,
};

use strum::{Display, EnumIter, IntoEnumIterator};

use crate::{
    routes::{log::LogRoute, plot::PlotRoute},
    state::AppState,
};

/// Trait that all routes must implement
pub trait RouteHandler: std::fmt::Debug {
    /// Render this route's UI
    fn render(&self, frame: &mut Frame, area: Rect, state: &AppState);

    /// Handle keyboard input for this route
    fn handle_input(&mut self, key: KeyCode, state: &mut AppState) -> Result<RouteAction>;

    /// Handle mouse input for this route
    fn handle_mouse(&mut self, _mouse: MouseEvent, _state: &mut AppState) -> Result<RouteAction> {
        Ok(RouteAction::None)
    }

    /// Get the display name for the tab bar
    fn name(&self) -> &str;

    /// Optional: Called when entering this route
    fn on_enter(&mut self, _state: &mut AppState) -> Result<()> {
        Ok(())
    }

    fn help_items(&self) -> Vec<(&str, &str)> {
        vec![("Tab", "Switch Tab"), ("Q", "Quit")]
    }
}

/// Actions that can be returned from route handlers
#[derive(Debug)]
pub enum RouteAction {
    /// Do nothing, stay on current route
    None,
    /// Navigate to another tab
    Switch(Tab),
}

pub struct Router {
    current: Box<dyn RouteHandler>,
}

impl Router {
    pub fn new(initial_route: Box<dyn RouteHandler>) -> Self {
        Self {
            current: initial_route,
        }
    }

    pub fn current(&self) -> &dyn RouteHandler {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> &mut Box<dyn RouteHandler> {
        &mut self.current
    }

    pub fn current_tab(&self) -> Tab {
        Tab::for_route(self.current.name())
    }

    pub fn execute_action(&mut self, action: RouteAction, state: &mut AppState) -> Result<()> {
        match action {
            RouteAction::None => Ok(()),
            RouteAction::Switch(tab) => self.replace(tab.route(), state),
        }
    }

    /// Replace current route (used for tab switching)
    pub fn replace(&mut self, mut new_route: Box<dyn RouteHandler>, state: &mut AppState) -> Result<()> {
        log::debug!("route {} -> {}", self.current.name(), new_route.name());
        new_route.on_enter(state)?;
        self.current = new_route;
        Ok(())
    }
}

/// Main tabs, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display)]
pub enum Tab {
    Plot,
    Log,
}

impl Tab {
    pub fn route(self) -> Box<dyn RouteHandler> {
        match self {
            Tab::Plot => Box::new(PlotRoute),
            Tab::Log => Box::new(LogRoute),
        }
    }

    /// Tab whose route has the given name
    pub fn for_route(name: &str) -> Tab {
        Tab::iter().find(|t| t.to_string() == name).unwrap_or(Tab::Plot)
    }

    pub fn next(self) -> Tab {
        let tabs: Vec<Tab> = Tab::iter().collect();
        let idx = tabs.iter().position(|t| *t == self).unwrap_or(0);
        tabs[(idx + 1) % tabs.len()]
    }
}
