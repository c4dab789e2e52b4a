use std::f32::consts::TAU;

use glam::Vec2;

use crate::context::{Color, RasterContext};

/// Nose distance relative to the base vertices.
const NOSE_LENGTH: f32 = 1.5;

/// Filled full circle (sweep `0..2π`) in the food color.
///
/// Negative radii are drawn by magnitude, so the result is always a closed
/// circle.
pub fn draw_disc<C: RasterContext + ?Sized>(ctx: &mut C, center: Vec2, radius: f32) {
    ctx.begin_path();
    ctx.arc(center.x, center.y, radius.abs(), 0.0, TAU);
    ctx.set_fill_color(Color::FOOD);
    ctx.fill();
}

/// Vertices of an agent triangle: `[nose, base_a, base_b]`.
///
/// Rotation 0 puts the nose at `center + (0, 1.5 * size)`; the base vertices
/// sit at +2π/3 and +4π/3 from the nose direction.
pub fn triangle_vertices(center: Vec2, size: f32, rotation: f32) -> [Vec2; 3] {
    let vertex = |angle: f32, distance: f32| {
        Vec2::new(
            center.x - angle.sin() * distance,
            center.y + angle.cos() * distance,
        )
    };
    [
        vertex(rotation, size * NOSE_LENGTH),
        vertex(rotation + 2.0 / 3.0 * std::f32::consts::PI, size),
        vertex(rotation + 4.0 / 3.0 * std::f32::consts::PI, size),
    ]
}

/// Filled oriented triangle in the agent color. The path closes on the nose.
pub fn draw_triangle<C: RasterContext + ?Sized>(
    ctx: &mut C,
    center: Vec2,
    size: f32,
    rotation: f32,
) {
    let [nose, base_a, base_b] = triangle_vertices(center, size, rotation);
    ctx.begin_path();
    ctx.move_to(nose.x, nose.y);
    ctx.line_to(base_a.x, base_a.y);
    ctx.line_to(base_b.x, base_b.y);
    ctx.line_to(nose.x, nose.y);
    ctx.set_fill_color(Color::AGENT);
    ctx.fill();
}
