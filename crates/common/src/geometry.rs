use glam::Vec2;

/// Largest backing buffer edge, in device pixels.
pub const MAX_DEVICE_DIMENSION: u32 = 16_384;

/// Errors raised while setting up the drawing surface.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurfaceError {
    #[error("invalid logical size {width}x{height}: both axes must be finite and positive")]
    InvalidSize { width: f32, height: f32 },
    #[error("invalid device scale factor {0}: must be finite and positive")]
    InvalidScale(f32),
    #[error(
        "device buffer {width}x{height} exceeds the {MAX_DEVICE_DIMENSION} pixel limit per axis"
    )]
    BufferTooLarge { width: u32, height: u32 },
}

/// Logical surface size plus the device pixel ratio, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    width: f32,
    height: f32,
    scale: f32,
}

impl SurfaceGeometry {
    /// Validate and build a geometry. Non-finite or non-positive values, and
    /// sizes whose device buffer would exceed [`MAX_DEVICE_DIMENSION`] on
    /// either axis, are rejected so no partial rendering is ever attempted.
    pub fn new(width: f32, height: f32, scale: f32) -> Result<Self, SurfaceError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SurfaceError::InvalidSize { width, height });
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(SurfaceError::InvalidScale(scale));
        }
        let (device_width, device_height) = ((width * scale).round(), (height * scale).round());
        let limit = MAX_DEVICE_DIMENSION as f32;
        if !(device_width <= limit && device_height <= limit) {
            return Err(SurfaceError::BufferTooLarge {
                width: device_width as u32,
                height: device_height as u32,
            });
        }
        Ok(Self {
            width,
            height,
            scale,
        })
    }

    /// Logical (CSS pixel) width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Logical (CSS pixel) height.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Device pixel ratio.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Width of the backing buffer in device pixels.
    pub fn device_width(&self) -> u32 {
        (self.width * self.scale).round().max(1.0) as u32
    }

    /// Height of the backing buffer in device pixels.
    pub fn device_height(&self) -> u32 {
        (self.height * self.scale).round().max(1.0) as u32
    }

    /// Map a normalized position to logical pixels. No clamping.
    pub fn map_point(&self, normalized: Vec2) -> Vec2 {
        Vec2::new(
            map_coord(normalized.x, self.width),
            map_coord(normalized.y, self.height),
        )
    }

    /// Map a size expressed as a fraction of the surface width to logical pixels.
    pub fn map_width_extent(&self, factor: f32) -> f32 {
        map_extent(factor, self.width)
    }
}

/// `n * axis_len`. Values outside `[0, 1]` pass through and land off-surface.
pub fn map_coord(n: f32, axis_len: f32) -> f32 {
    n * axis_len
}

/// Pixel magnitude of a normalized size factor along an axis.
pub fn map_extent(factor: f32, axis_len: f32) -> f32 {
    factor * axis_len
}
