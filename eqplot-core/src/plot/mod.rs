pub mod color;
pub mod mapper;
pub mod markers;
pub mod render;
pub mod surface;

pub use color::Rgb;
pub use mapper::CoordinateMapper;
pub use markers::{Marker, build_marker_index, hit_test};
pub use render::{CurveRenderer, PlotOptions, PlotOutput};
pub use surface::{PixelCanvas, Stroke, Surface};
