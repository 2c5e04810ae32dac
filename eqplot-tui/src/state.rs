use std::cell::Cell;

use eqplot_core::{FilterStore, PlotSession, filter::FilterDefinition, plot::Surface};
use ratatui::layout::Rect;

use crate::{
    store::LocalFilterStore,
    surface::{ShapeRecorder, logical_size},
    transport::ConfigResponse,
};

pub struct AppState {
    pub session: PlotSession<LocalFilterStore>,
    /// last rendered plot frame
    pub recording: ShapeRecorder,
    /// inner area of the graph block, written while drawing
    pub plot_area: Cell<Rect>,
    pub status_message: String,
    pub revision: Option<u64>,
}

impl AppState {
    pub fn new(session: PlotSession<LocalFilterStore>) -> Self {
        Self {
            session,
            recording: ShapeRecorder::default(),
            plot_area: Cell::new(Rect::default()),
            status_message: "Ready".to_string(),
            revision: None,
        }
    }

    pub fn handle_response(&mut self, response: ConfigResponse) {
        match response {
            ConfigResponse::Committed { revision, filters } => {
                self.revision = Some(revision);
                self.status_message = format!("Uploaded revision {} ({} filters)", revision, filters);
            }
            ConfigResponse::Error(e) => {
                log::error!("upload failed: {}", e);
                self.status_message = format!("Upload failed: {}", e);
            }
            ConfigResponse::Shutdown => {
                log::info!("config transport shut down");
            }
        }
    }

    /// Re-render the plot if the graph area changed or a frame is due
    pub fn refresh_plot(&mut self) {
        let area = self.plot_area.get();
        if area.is_empty() {
            return;
        }
        if logical_size(area) != self.recording.size() {
            self.recording = ShapeRecorder::for_area(area);
            self.session.request_redraw();
        }
        if self.session.frame_due() {
            self.session.render(&mut self.recording);
        }
    }

    /// Name of the filter behind the selected marker
    pub fn selected_filter(&self) -> Option<&str> {
        self.session
            .gesture()
            .selected_marker()
            .map(|m| m.filter_name.as_str())
    }

    /// All filters in store order with the selected one flagged
    pub fn filter_rows(&self) -> Vec<(String, FilterDefinition, bool)> {
        let selected = self.selected_filter();
        self.session
            .store()
            .filters(None)
            .iter()
            .map(|(name, filter)| (name.to_string(), filter.clone(), Some(name) == selected))
            .collect()
    }
}
