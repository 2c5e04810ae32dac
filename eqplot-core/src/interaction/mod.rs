pub mod events;
pub mod gesture;
pub mod schedule;
pub mod session;

pub use events::{PlotEvent, PlotKey, PointerEvent, PointerKind};
pub use gesture::{DragMode, DragOrigin, GestureController, GestureState};
pub use schedule::{RenderThrottle, UploadDebouncer};
pub use session::{PlotSession, SessionOptions};
