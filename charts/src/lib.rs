pub mod axis;
pub mod paint;
pub mod renderer;
pub mod scale;
pub mod scene;
pub mod shape;

pub use paint::{paint_svg, write_svgs, PaintError};
pub use renderer::{ChartRenderer, ChartSpec, ViewSpec, STANDARD_VIEWS};
pub use scene::{Mark, Surface, SurfaceId, Surfaces};
