//! Pointer, keyboard and wheel gestures over the marker index.
//!
//! The controller never touches filter definitions. It turns input into
//! [`PlotEvent`]s and keeps a preview copy of the markers in step with its own
//! drag output until the next render hands it a fresh index.

use strum::Display;

use super::events::{PlotEvent, PlotKey, PointerEvent, PointerKind};
use crate::config::PlotConfig;
use crate::filter::{MAX_FREQ, MIN_FREQ, base_name};
use crate::plot::mapper::CoordinateMapper;
use crate::plot::markers::{Marker, hit_test, hit_test_index};
use crate::store::ParamChange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum DragMode {
    /// x sets frequency, y sets gain
    #[default]
    Normal,
    /// vertical movement scales Q
    QAdjust,
}

/// Where a drag started and the marker's parameters at that moment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOrigin {
    pub pointer_id: u32,
    pub x: f64,
    pub y: f64,
    pub frequency: f64,
    pub gain: f64,
    pub q: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Hovering(String),
    Dragging {
        marker_id: String,
        mode: DragMode,
        origin: DragOrigin,
    },
}

#[derive(Debug, Clone)]
pub struct GestureController {
    config: PlotConfig,
    mapper: CoordinateMapper,
    canvas_size: (f64, f64),
    markers: Vec<Marker>,
    state: GestureState,
    selected: Option<String>,
}

impl GestureController {
    pub fn new(config: PlotConfig) -> Self {
        let mapper = CoordinateMapper::new(&config);
        Self {
            config,
            mapper,
            canvas_size: (0.0, 0.0),
            markers: Vec::new(),
            state: GestureState::Idle,
            selected: None,
        }
    }

    /// Replace the marker index after a render pass.
    ///
    /// A selected id missing from the new index moves to the marker with the
    /// same base name (channel layouts rename markers). Returns `Deselect` when
    /// no such marker is left.
    pub fn set_markers(&mut self, markers: Vec<Marker>, canvas_size: (f64, f64)) -> Option<PlotEvent> {
        self.markers = markers;
        self.canvas_size = canvas_size;

        if let GestureState::Hovering(id) = &self.state {
            if !self.contains(id) {
                self.state = GestureState::Idle;
            }
        }

        let selected = self.selected.as_deref()?;
        if self.contains(selected) || self.is_dragging() {
            return None;
        }
        let base = base_name(selected);
        match self.markers.iter().find(|m| m.base_name == base).map(|m| m.id.clone()) {
            Some(id) => {
                log::debug!("selection follows {} to {}", base, id);
                self.selected = Some(id);
                None
            }
            None => {
                let gone = self.selected.take();
                log::debug!("selected marker {:?} no longer plotted", gone);
                Some(PlotEvent::Deselect)
            }
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        self.canvas_size
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    pub fn drag_mode(&self) -> Option<DragMode> {
        match &self.state {
            GestureState::Dragging { mode, .. } => Some(*mode),
            _ => None,
        }
    }

    pub fn drag_origin(&self) -> Option<&DragOrigin> {
        match &self.state {
            GestureState::Dragging { origin, .. } => Some(origin),
            _ => None,
        }
    }

    /// The marker being dragged
    pub fn active_marker(&self) -> Option<&Marker> {
        match &self.state {
            GestureState::Dragging { marker_id, .. } => self.find(marker_id),
            _ => None,
        }
    }

    pub fn hovered(&self) -> Option<&str> {
        match &self.state {
            GestureState::Hovering(id) => Some(id),
            _ => None,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_marker(&self) -> Option<&Marker> {
        self.selected.as_deref().and_then(|id| self.find(id))
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Vec<PlotEvent> {
        match event.kind {
            PointerKind::Down => self.pointer_down(event),
            PointerKind::Move => self.pointer_move(event),
            PointerKind::Up | PointerKind::Cancel => self.pointer_release(event),
            PointerKind::Leave => {
                let mut events = self.pointer_release(event);
                if let GestureState::Hovering(_) = self.state {
                    self.state = GestureState::Idle;
                    events.push(PlotEvent::Hover { marker_id: None });
                }
                events
            }
        }
    }

    fn pointer_down(&mut self, event: &PointerEvent) -> Vec<PlotEvent> {
        if let Some(origin) = self.drag_origin() {
            log::debug!(
                "ignoring pointer {} down while pointer {} is dragging",
                event.pointer_id,
                origin.pointer_id
            );
            return Vec::new();
        }

        let Some(marker) = hit_test(event.x, event.y, &self.markers).cloned() else {
            self.selected = None;
            self.state = GestureState::Idle;
            return vec![PlotEvent::Deselect];
        };

        log::debug!(
            "drag start on {} at ({:.1}, {:.1})",
            marker.id,
            event.x,
            event.y
        );
        self.selected = Some(marker.id.clone());
        self.state = GestureState::Dragging {
            marker_id: marker.id.clone(),
            mode: DragMode::Normal,
            origin: DragOrigin {
                pointer_id: event.pointer_id,
                x: event.x,
                y: event.y,
                frequency: marker.frequency,
                gain: marker.gain,
                q: marker.q,
            },
        };
        vec![
            PlotEvent::MarkerSelect {
                marker_id: marker.id.clone(),
                filter_name: marker.filter_name.clone(),
                channel: marker.channel,
            },
            PlotEvent::DragStart {
                marker_id: marker.id,
                frequency: marker.frequency,
                gain: marker.gain,
                q: marker.q,
            },
        ]
    }

    fn pointer_move(&mut self, event: &PointerEvent) -> Vec<PlotEvent> {
        let GestureState::Dragging {
            marker_id,
            mode,
            origin,
        } = &mut self.state
        else {
            return self.update_hover(event.x, event.y);
        };
        if event.pointer_id != origin.pointer_id {
            return Vec::new();
        }

        let (width, height) = self.canvas_size;
        *mode = if event.shift {
            DragMode::QAdjust
        } else {
            DragMode::Normal
        };
        let params = match mode {
            DragMode::Normal => {
                let frequency = self.mapper.x_to_frequency(event.x, width).round();
                let gain = self
                    .mapper
                    .y_to_gain_within(event.y, height, self.config.drag_gain_limit);
                ParamChange::frequency_gain(frequency, round_to(gain, 1))
            }
            DragMode::QAdjust => {
                let dy = event.y - origin.y;
                let scale = (-dy / self.config.q_drag_sensitivity).exp();
                let (lo, hi) = self.config.drag_q_range;
                ParamChange::q(round_to((origin.q * scale).clamp(lo, hi), 2))
            }
        };

        let marker_id = marker_id.clone();
        match self.markers.iter().position(|m| m.id == marker_id) {
            Some(idx) => vec![self.apply(idx, params)],
            None => {
                log::debug!("dragged marker {} left the index", marker_id);
                Vec::new()
            }
        }
    }

    fn pointer_release(&mut self, event: &PointerEvent) -> Vec<PlotEvent> {
        let GestureState::Dragging {
            marker_id, origin, ..
        } = &self.state
        else {
            return Vec::new();
        };
        if event.pointer_id != origin.pointer_id {
            return Vec::new();
        }

        let marker_id = marker_id.clone();
        log::debug!("drag end on {} ({})", marker_id, event.kind);
        self.state = GestureState::Idle;
        vec![PlotEvent::DragEnd { marker_id }]
    }

    fn update_hover(&mut self, x: f64, y: f64) -> Vec<PlotEvent> {
        let hit = hit_test(x, y, &self.markers).map(|m| m.id.clone());
        if hit.as_deref() == self.hovered() {
            return Vec::new();
        }
        self.state = match &hit {
            Some(id) => GestureState::Hovering(id.clone()),
            None => GestureState::Idle,
        };
        vec![PlotEvent::Hover { marker_id: hit }]
    }

    /// Nudge the selected marker. Each step is a complete drag/drag-end pair.
    pub fn handle_key(&mut self, key: PlotKey) -> Vec<PlotEvent> {
        if self.is_dragging() {
            return Vec::new();
        }
        if key == PlotKey::Escape {
            self.selected = None;
            return vec![PlotEvent::Deselect];
        }
        let Some(selected) = self.selected.clone() else {
            return Vec::new();
        };
        let Some(idx) = self.markers.iter().position(|m| m.id == selected) else {
            log::debug!("key {} for missing marker {}", key, selected);
            return Vec::new();
        };

        let marker = &self.markers[idx];
        let limit = self.config.gain_limit;
        let step = self.config.key_gain_step;
        let factor = self.config.key_freq_factor;
        let params = match key {
            PlotKey::ArrowUp => ParamChange {
                gain: Some(round_to((marker.gain + step).clamp(-limit, limit), 1)),
                ..ParamChange::default()
            },
            PlotKey::ArrowDown => ParamChange {
                gain: Some(round_to((marker.gain - step).clamp(-limit, limit), 1)),
                ..ParamChange::default()
            },
            // 0.99 for the default factor of 1.01
            PlotKey::ArrowLeft => ParamChange {
                frequency: Some((marker.frequency * (2.0 - factor)).clamp(MIN_FREQ, MAX_FREQ)),
                ..ParamChange::default()
            },
            PlotKey::ArrowRight => ParamChange {
                frequency: Some((marker.frequency * factor).clamp(MIN_FREQ, MAX_FREQ)),
                ..ParamChange::default()
            },
            PlotKey::Escape => return Vec::new(),
        };

        let drag = self.apply(idx, params);
        vec![drag, PlotEvent::DragEnd { marker_id: selected }]
    }

    /// Wheel over a marker steps its Q. Negative `delta_y` (scrolling up) raises it.
    pub fn handle_wheel(&mut self, x: f64, y: f64, delta_y: f64) -> Vec<PlotEvent> {
        if self.is_dragging() || delta_y == 0.0 || delta_y.is_nan() {
            return Vec::new();
        }
        let Some(idx) = hit_test_index(x, y, &self.markers) else {
            return Vec::new();
        };

        let direction = if delta_y < 0.0 { 1.0 } else { -1.0 };
        let (lo, hi) = self.config.wheel_q_range;
        let q = self.markers[idx].q + direction * self.config.wheel_q_step;
        let params = ParamChange::q(round_to(q.clamp(lo, hi), 2));

        let marker_id = self.markers[idx].id.clone();
        let drag = self.apply(idx, params);
        vec![drag, PlotEvent::DragEnd { marker_id }]
    }

    /// Preview `params` on the marker at `idx` and build the drag event for it
    fn apply(&mut self, idx: usize, params: ParamChange) -> PlotEvent {
        let (width, height) = self.canvas_size;
        let marker = &mut self.markers[idx];
        if let Some(frequency) = params.frequency {
            marker.frequency = frequency;
            marker.x = self.mapper.frequency_to_x(frequency, width);
        }
        if let Some(gain) = params.gain {
            marker.gain = gain;
            marker.y = self.mapper.gain_to_y(gain, height);
        }
        if let Some(q) = params.q {
            marker.q = q;
        }
        log::trace!("drag {} {:?}", marker.id, params);

        PlotEvent::Drag {
            marker_id: marker.id.clone(),
            filter_name: marker.filter_name.clone(),
            channel: marker.channel,
            params,
        }
    }

    fn find(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
