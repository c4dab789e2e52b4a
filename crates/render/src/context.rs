use flockview_common::SurfaceGeometry;

/// An opaque RGBA fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Food fill, `rgb(0, 255, 128)`.
    pub const FOOD: Color = Color::rgb(0, 255, 128);
    /// Agent fill, `rgb(255, 255, 255)`.
    pub const AGENT: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.a == 255 {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Minimal 2D drawing surface, modeled on an HTML canvas 2D context.
///
/// Coordinates are in the context's current user space; `scale` multiplies
/// the transform for all subsequent calls.
pub trait RasterContext {
    fn scale(&mut self, sx: f32, sy: f32);

    /// Reset a rectangle to transparent.
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Discard the current path and start a new one.
    fn begin_path(&mut self);

    fn move_to(&mut self, x: f32, y: f32);

    fn line_to(&mut self, x: f32, y: f32);

    /// Clockwise arc from `start_angle` to `end_angle` (radians).
    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32);

    fn set_fill_color(&mut self, color: Color);

    /// Fill the current path with the current fill color.
    fn fill(&mut self);
}

/// One-time setup: pre-scale the context by the device ratio so drawing
/// happens in logical pixels.
pub fn prepare_context<C: RasterContext + ?Sized>(ctx: &mut C, geometry: &SurfaceGeometry) {
    ctx.scale(geometry.scale(), geometry.scale());
    tracing::debug!(
        width = geometry.width(),
        height = geometry.height(),
        scale = geometry.scale(),
        "raster context prepared"
    );
}
