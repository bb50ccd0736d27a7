//! Block color tables and three-view raster previews of structures.

pub mod colors;
pub mod renderer;

pub use colors::{ColorError, ColorTable, Rgb};
pub use renderer::render_preview;
