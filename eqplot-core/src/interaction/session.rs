//! Glue between input, the filter store and the renderer.
//!
//! A [`PlotSession`] owns the gesture controller and applies its drag events
//! to the store right away so the next frame shows the new values. Redraws are
//! coalesced and uploads are debounced until the gesture ends.

use std::time::Instant;

use super::events::{PlotEvent, PlotKey, PointerEvent};
use super::gesture::GestureController;
use super::schedule::{RenderThrottle, UploadDebouncer};
use crate::config::PlotConfig;
use crate::filter::{FilterDefinition, base_name, is_system_filter};
use crate::plot::color::{Rgb, channel_color};
use crate::plot::render::{CurveRenderer, PlotOptions};
use crate::plot::surface::Surface;
use crate::store::{FilterStore, ParamChange, StoreError};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub title: Option<String>,
    /// one pass per store channel, each with its own fixed color
    pub dual_channel: bool,
    /// curve color seed for single-channel plots
    pub color_seed: Rgb,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            title: None,
            dual_channel: false,
            color_seed: Rgb::DEFAULT_SEED,
        }
    }
}

pub struct PlotSession<S: FilterStore> {
    store: S,
    renderer: CurveRenderer,
    gesture: GestureController,
    throttle: RenderThrottle,
    upload: UploadDebouncer,
    options: SessionOptions,
    selected_base: Option<String>,
    /// store was edited since the last successful commit
    dirty: bool,
    peak_db: f64,
}

impl<S: FilterStore> PlotSession<S> {
    pub fn new(store: S, config: PlotConfig, options: SessionOptions) -> Self {
        let mut throttle = RenderThrottle::new();
        throttle.request();
        Self {
            store,
            upload: UploadDebouncer::new(config.upload_delay),
            gesture: GestureController::new(config.clone()),
            renderer: CurveRenderer::new(config),
            throttle,
            options,
            selected_base: None,
            dirty: false,
            peak_db: 0.0,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access. Call [`Self::request_redraw`] after edits.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn config(&self) -> &PlotConfig {
        self.renderer.config()
    }

    pub fn gesture(&self) -> &GestureController {
        &self.gesture
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn set_dual_channel(&mut self, dual_channel: bool) {
        self.options.dual_channel = dual_channel;
        self.throttle.request();
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.options.title = title;
        self.throttle.request();
    }

    /// Selected filter name with any channel suffix removed
    pub fn selected_base(&self) -> Option<&str> {
        self.selected_base.as_deref()
    }

    /// Rounded peak of the total curve from the last render
    pub fn peak_db(&self) -> f64 {
        self.peak_db
    }

    pub fn request_redraw(&mut self) {
        self.throttle.request();
    }

    /// True once per pending redraw
    pub fn frame_due(&mut self) -> bool {
        self.throttle.take_frame()
    }

    pub fn upload_pending(&self) -> bool {
        self.upload.is_pending()
    }

    pub fn upload_deadline(&self) -> Option<Instant> {
        self.upload.deadline()
    }

    /// Draw every channel and refresh the marker index. Returns the peak dB.
    pub fn render<T: Surface + ?Sized>(&mut self, surface: &mut T) -> f64 {
        surface.clear(Rgb::BLACK);
        let size = surface.size();

        let bases: Vec<String> = self.selected_base.iter().cloned().collect();
        let is_peq =
            |name: &str, filter: &FilterDefinition| !is_system_filter(name) && filter.as_biquad().is_some();

        let channels = self.store.channel_count();
        let passes: Vec<(Option<usize>, Rgb)> = if self.options.dual_channel && channels > 1 {
            (0..channels).map(|ch| (Some(ch), channel_color(ch))).collect()
        } else {
            vec![(None, self.options.color_seed)]
        };

        let mut markers = Vec::new();
        let mut peak: Option<f64> = None;
        for (pass, (channel, seed)) in passes.into_iter().enumerate() {
            let filters = self.store.filters(channel);
            let options = PlotOptions {
                title: if pass == 0 {
                    self.options.title.as_deref()
                } else {
                    None
                },
                color_seed: seed,
                channel,
                draw_grid: pass == 0,
                marker_filter: Some(&is_peq),
                interactive_filter: None,
                selected_bases: Some(&bases),
            };
            let output = self.renderer.plot(surface, &filters, &options);
            peak = Some(peak.map_or(output.peak_db, |p| p.max(output.peak_db)));
            markers.extend(output.markers);
        }

        if let Some(PlotEvent::Deselect) = self.gesture.set_markers(markers, size) {
            self.selected_base = None;
            self.throttle.request();
        }
        self.renderer.draw_overlay(
            surface,
            self.gesture.markers(),
            self.gesture.selected(),
            self.gesture.hovered(),
        );
        self.peak_db = peak.unwrap_or(0.0);
        self.peak_db
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent, now: Instant) -> Vec<PlotEvent> {
        let events = self.gesture.handle_pointer(event);
        self.dispatch(&events, now);
        events
    }

    pub fn handle_key(&mut self, key: PlotKey, now: Instant) -> Vec<PlotEvent> {
        let events = self.gesture.handle_key(key);
        self.dispatch(&events, now);
        events
    }

    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64, now: Instant) -> Vec<PlotEvent> {
        let events = self.gesture.handle_wheel(x, y, delta_y);
        self.dispatch(&events, now);
        events
    }

    /// Fire the debounced upload once its quiet period has passed.
    /// Returns whether a commit was attempted.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.upload.poll(now) {
            self.commit();
            true
        } else {
            false
        }
    }

    /// Commit any pending edits now, skipping the debounce
    pub fn flush(&mut self) {
        self.upload.cancel();
        if self.dirty {
            self.commit();
        }
    }

    fn dispatch(&mut self, events: &[PlotEvent], now: Instant) {
        for event in events {
            match event {
                PlotEvent::MarkerSelect { filter_name, .. } => {
                    self.selected_base = Some(base_name(filter_name).to_string());
                    self.throttle.request();
                }
                PlotEvent::Deselect => {
                    self.selected_base = None;
                    self.throttle.request();
                }
                PlotEvent::DragStart {
                    marker_id,
                    frequency,
                    gain,
                    q,
                } => {
                    log::debug!("{} grabbed at {}Hz {}dB Q{}", marker_id, frequency, gain, q);
                }
                PlotEvent::Drag {
                    filter_name, params, ..
                } => self.apply_drag(filter_name, params, now),
                PlotEvent::DragEnd { .. } => {
                    self.flush();
                    self.throttle.request();
                }
                PlotEvent::Hover { .. } => {
                    self.throttle.request();
                }
            }
        }
    }

    fn apply_drag(&mut self, filter_name: &str, params: &ParamChange, now: Instant) {
        match self.store.set_filter_parameter(filter_name, params) {
            Ok(()) => {
                self.dirty = true;
                self.throttle.request();
                self.upload.schedule(now);
            }
            Err(StoreError::UnknownFilter(_)) => {
                log::warn!("ignoring drag on {}: filter no longer exists", filter_name);
            }
            Err(e) => log::warn!("ignoring drag on {}: {}", filter_name, e),
        }
    }

    /// Commit right away, pending edits or not. Structural changes such as
    /// added or removed filters go through here.
    pub fn commit(&mut self) {
        self.upload.cancel();
        match self.store.commit() {
            Ok(()) => {
                self.dirty = false;
                log::debug!("filter changes committed");
            }
            Err(e) => log::warn!("failed to commit filter changes: {:#}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{BiquadSubtype, FilterSet};
    use crate::interaction::events::PointerKind;
    use crate::plot::surface::PixelCanvas;
    use crate::store::MemoryFilterStore;
    use std::time::Duration;

    fn session() -> PlotSession<MemoryFilterStore> {
        let store = MemoryFilterStore::new(
            FilterSet::new()
                .with("F1", FilterDefinition::biquad(BiquadSubtype::Peaking, 1000.0, 3.0, 1.0))
                .with("__system", FilterDefinition::biquad(BiquadSubtype::Peaking, 100.0, 1.0, 1.0))
                .with("Pre", FilterDefinition::Gain { gain: -3.0 }),
        );
        PlotSession::new(store, PlotConfig::default(), SessionOptions::default())
    }

    #[test]
    fn test_first_frame_is_due() {
        let mut s = session();
        assert!(s.frame_due());
        assert!(!s.frame_due());
    }

    #[test]
    fn test_render_skips_system_filters() {
        let mut s = session();
        let mut canvas = PixelCanvas::new(1000, 540);
        let peak = s.render(&mut canvas);
        let ids: Vec<&str> = s.gesture().markers().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["F1"]);
        assert_eq!(peak, 3.0);
        assert_eq!(s.peak_db(), 3.0);
    }

    #[test]
    fn test_wheel_commits_immediately() {
        let mut s = session();
        let mut canvas = PixelCanvas::new(1000, 540);
        s.render(&mut canvas);
        let m = s.gesture().markers()[0].clone();
        let now = Instant::now();
        s.handle_wheel(m.x, m.y, -1.0, now);
        assert_eq!(s.store().commits().len(), 1);
        assert!(!s.upload_pending());
        assert!(!s.tick(now + Duration::from_secs(1)));
    }

    #[test]
    fn test_select_tracks_base_name() {
        let mut s = session();
        let mut canvas = PixelCanvas::new(1000, 540);
        s.render(&mut canvas);
        let m = s.gesture().markers()[0].clone();
        let now = Instant::now();
        s.handle_pointer(&PointerEvent::new(PointerKind::Down, m.x, m.y), now);
        assert_eq!(s.selected_base(), Some("F1"));
        s.handle_pointer(&PointerEvent::new(PointerKind::Up, m.x, m.y), now);
        // release without movement has nothing to commit
        assert!(s.store().commits().is_empty());
        s.handle_key(PlotKey::Escape, now);
        assert_eq!(s.selected_base(), None);
    }
}
