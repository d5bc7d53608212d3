pub mod history;
pub mod marker;
pub mod model;
pub mod raster;
pub mod render;
pub mod resize;
pub mod surface;
pub mod sync;
pub mod window;

pub use raster::{PixelBuffer, Raster};
pub use surface::DrawSurface;
pub use sync::{can_transition, PlaybackSync, SyncMode, TickOutcome};
pub use window::{SketchWindow, WindowIndex};
