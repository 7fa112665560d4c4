//! Snipmark Render Library
//!
//! Software rasterizer for annotated captures: pixel primitives, the
//! per-shape annotation renderer and the crop-and-flatten compositor.

pub mod annotations;
pub mod compositor;
pub mod raster;

pub use annotations::render_annotation;
pub use compositor::{crop_region, flatten, CompositeError};
