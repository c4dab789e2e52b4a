//! CPU rasterizer behind the [`RasterContext`] interface.
//!
//! The backing buffer is sized in device pixels; path coordinates are mapped
//! through the current scale transform as they are added. Fills use the
//! nonzero winding rule, sampled at pixel centers.

use std::f32::consts::TAU;

use glam::Vec2;

use flockview_common::{MAX_DEVICE_DIMENSION, SurfaceError, SurfaceGeometry};

use crate::context::{Color, RasterContext};

/// Smallest number of segments used to flatten an arc.
const MIN_ARC_SEGMENTS: usize = 8;
const MAX_ARC_SEGMENTS: usize = 256;

/// RGBA8 pixel surface that mirrors an HTML canvas backing store.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    scale: Vec2,
    fill_color: Color,
    /// Subpaths in device coordinates.
    path: Vec<Vec<Vec2>>,
}

impl PixelCanvas {
    /// Canvas whose buffer is `geometry`'s device-pixel size. The transform
    /// starts as identity; call [`crate::prepare_context`] to apply the ratio.
    pub fn new(geometry: &SurfaceGeometry) -> Result<Self, SurfaceError> {
        Self::with_size(geometry.device_width(), geometry.device_height())
    }

    /// Canvas with an explicit device-pixel size. Either edge above
    /// [`MAX_DEVICE_DIMENSION`] is rejected before anything is allocated.
    pub fn with_size(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let too_large = SurfaceError::BufferTooLarge { width, height };
        if width > MAX_DEVICE_DIMENSION || height > MAX_DEVICE_DIMENSION {
            return Err(too_large);
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(4))
            .ok_or(too_large)?;
        Ok(Self {
            width,
            height,
            pixels: vec![0; len],
            scale: Vec2::ONE,
            fill_color: Color::TRANSPARENT,
            path: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA rows, top to bottom.
    pub fn as_rgba(&self) -> &[u8] {
        &self.pixels
    }

    /// Device pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some(Color {
            r: self.pixels[i],
            g: self.pixels[i + 1],
            b: self.pixels[i + 2],
            a: self.pixels[i + 3],
        })
    }

    /// Number of pixels exactly equal to `color`.
    pub fn count_pixels(&self, color: Color) -> usize {
        let target = color.to_array();
        self.pixels.chunks_exact(4).filter(|px| *px == target).count()
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    fn to_device(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y) * self.scale
    }

    fn current_subpath(&mut self, start: Vec2) -> &mut Vec<Vec2> {
        if self.path.last().is_none_or(|s| s.is_empty()) {
            self.path.push(vec![start]);
        }
        // a subpath was pushed above if none existed
        let last = self.path.len() - 1;
        &mut self.path[last]
    }

    fn blend(&mut self, x: u32, y: u32, color: Color) {
        let i = self.offset(x, y);
        if color.a == 255 {
            self.pixels[i..i + 4].copy_from_slice(&color.to_array());
            return;
        }
        let sa = color.a as u32;
        let inv = 255 - sa;
        let src = [color.r, color.g, color.b];
        for (c, s) in src.iter().enumerate() {
            let dst = self.pixels[i + c] as u32;
            self.pixels[i + c] = ((*s as u32 * sa + dst * inv) / 255) as u8;
        }
        let da = self.pixels[i + 3] as u32;
        self.pixels[i + 3] = (sa + da * inv / 255) as u8;
    }

    fn fill_span(&mut self, row: u32, from: f32, to: f32, color: Color) {
        // pixel centers in [from, to)
        let start = (from - 0.5).ceil().max(0.0) as u32;
        let end = ((to - 0.5).ceil().max(0.0) as u32).min(self.width);
        for x in start..end {
            self.blend(x, row, color);
        }
    }
}

impl RasterContext for PixelCanvas {
    fn scale(&mut self, sx: f32, sy: f32) {
        self.scale *= Vec2::new(sx, sy);
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let a = self.to_device(x, y);
        let b = self.to_device(x + width, y + height);
        let (min, max) = (a.min(b), a.max(b));
        let x0 = min.x.round().clamp(0.0, self.width as f32) as u32;
        let x1 = max.x.round().clamp(0.0, self.width as f32) as u32;
        let y0 = min.y.round().clamp(0.0, self.height as f32) as u32;
        let y1 = max.y.round().clamp(0.0, self.height as f32) as u32;
        for row in y0..y1 {
            let from = self.offset(x0, row);
            let to = self.offset(x1, row);
            self.pixels[from..to].fill(0);
        }
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.to_device(x, y);
        self.path.push(vec![p]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.to_device(x, y);
        let subpath = self.current_subpath(p);
        subpath.push(p);
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32) {
        let center = self.to_device(x, y);
        let radius_px = self.scale * radius.abs();
        let sweep = (end_angle - start_angle).clamp(-TAU, TAU);
        let segments = ((sweep.abs() * radius_px.max_element()).ceil() as usize)
            .clamp(MIN_ARC_SEGMENTS, MAX_ARC_SEGMENTS);

        let point_at = |angle: f32| center + Vec2::new(angle.cos(), angle.sin()) * radius_px;
        let first = point_at(start_angle);
        let subpath = self.current_subpath(first);
        for i in 0..=segments {
            let t = i as f32 / segments as f32;
            subpath.push(point_at(start_angle + sweep * t));
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    fn fill(&mut self) {
        let edges: Vec<(Vec2, Vec2)> = self
            .path
            .iter()
            .filter(|s| s.len() >= 3)
            .flat_map(|s| s.iter().zip(s.iter().cycle().skip(1)).map(|(a, b)| (*a, *b)))
            .filter(|(a, b)| a.is_finite() && b.is_finite() && a.y != b.y)
            .collect();
        if edges.is_empty() {
            return;
        }

        let (min_y, max_y) = edges.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |acc, (a, b)| {
            (acc.0.min(a.y).min(b.y), acc.1.max(a.y).max(b.y))
        });
        let row_start = min_y.floor().max(0.0) as u32;
        let row_end = (max_y.ceil().max(0.0) as u32).min(self.height);
        let color = self.fill_color;

        let mut crossings: Vec<(f32, i32)> = Vec::new();
        for row in row_start..row_end {
            let sy = row as f32 + 0.5;
            crossings.clear();
            for (a, b) in &edges {
                let winding = if a.y <= sy && b.y > sy {
                    1
                } else if b.y <= sy && a.y > sy {
                    -1
                } else {
                    continue;
                };
                let t = (sy - a.y) / (b.y - a.y);
                crossings.push((a.x + t * (b.x - a.x), winding));
            }
            crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding != 0 {
                    self.fill_span(row, pair[0].0, pair[1].0, color);
                }
            }
        }
    }
}
