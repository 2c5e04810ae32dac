use strum::Display;

use crate::store::ParamChange;

/// Structured events emitted by the gesture controller, in the order they
/// happen. Hosts apply `Drag` params to their filter store.
#[derive(Debug, Clone, PartialEq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PlotEvent {
    MarkerSelect {
        marker_id: String,
        filter_name: String,
        channel: Option<usize>,
    },
    Deselect,
    DragStart {
        marker_id: String,
        frequency: f64,
        gain: f64,
        q: f64,
    },
    Drag {
        marker_id: String,
        filter_name: String,
        channel: Option<usize>,
        params: ParamChange,
    },
    DragEnd {
        marker_id: String,
    },
    /// hovered marker changed; display feedback only
    Hover {
        marker_id: Option<String>,
    },
}

impl PlotEvent {
    pub fn marker_id(&self) -> Option<&str> {
        match self {
            PlotEvent::MarkerSelect { marker_id, .. }
            | PlotEvent::DragStart { marker_id, .. }
            | PlotEvent::Drag { marker_id, .. }
            | PlotEvent::DragEnd { marker_id } => Some(marker_id),
            PlotEvent::Hover { marker_id } => marker_id.as_deref(),
            PlotEvent::Deselect => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
    Leave,
}

/// A pointer event in canvas pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub pointer_id: u32,
    pub x: f64,
    pub y: f64,
    /// switches an active drag into Q mode
    pub shift: bool,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            pointer_id: 0,
            x,
            y,
            shift: false,
        }
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_pointer_id(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PlotKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(PlotEvent::Deselect.to_string(), "deselect");
        let ev = PlotEvent::DragEnd {
            marker_id: "F1".into(),
        };
        assert_eq!(ev.to_string(), "drag-end");
        assert_eq!(ev.marker_id(), Some("F1"));
    }
}
