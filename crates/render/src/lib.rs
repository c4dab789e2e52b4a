//! Rendering Adapter: draws world snapshots onto a 2D raster context.
//!
//! # Invariants
//! - The renderer never mutates engine state; it only reads snapshots.
//! - The context is scaled by the device ratio once at setup. Everything
//!   drawn afterwards is in logical pixels.
//! - Every primitive begins its own path.

mod canvas;
mod compositor;
mod context;
mod primitives;
mod recorder;

pub use canvas::PixelCanvas;
pub use compositor::{AGENT_SIZE_RATIO, FOOD_RADIUS_RATIO, FrameCompositor, FrameStats};
pub use context::{Color, RasterContext, prepare_context};
pub use primitives::{draw_disc, draw_triangle, triangle_vertices};
pub use recorder::{DrawCommand, RecordingContext, Shape};

pub fn crate_info() -> &'static str {
    "flockview-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
