use glam::Vec2;

use crate::context::{Color, RasterContext};

/// One call made against a [`RecordingContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Scale {
        sx: f32,
        sy: f32,
    },
    ClearRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    BeginPath,
    MoveTo(Vec2),
    LineTo(Vec2),
    Arc {
        center: Vec2,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
    },
    SetFillColor(Color),
    Fill,
}

/// A filled shape reconstructed from the command stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Disc {
        center: Vec2,
        radius: f32,
        sweep: f32,
        color: Color,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Color,
    },
}

/// Raster context that draws nothing and records every call.
///
/// Used as the drawing surface in tests and for `--trace` style debug
/// output where a human-readable frame description is more useful than
/// pixels.
#[derive(Debug, Default)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the log, e.g. between frames.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn fill_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill))
            .count()
    }

    /// Group the log into filled shapes, in draw order.
    ///
    /// A path made of a single arc becomes a [`Shape::Disc`]; anything built
    /// from move/line segments becomes a [`Shape::Polygon`].
    pub fn shapes(&self) -> Vec<Shape> {
        let mut shapes = Vec::new();
        let mut color = Color::TRANSPARENT;
        let mut arc: Option<(Vec2, f32, f32)> = None;
        let mut points = Vec::new();

        for cmd in &self.commands {
            match cmd {
                DrawCommand::BeginPath => {
                    arc = None;
                    points.clear();
                }
                DrawCommand::MoveTo(p) | DrawCommand::LineTo(p) => points.push(*p),
                DrawCommand::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => arc = Some((*center, *radius, end_angle - start_angle)),
                DrawCommand::SetFillColor(c) => color = *c,
                DrawCommand::Fill => match (arc, points.is_empty()) {
                    (Some((center, radius, sweep)), true) => shapes.push(Shape::Disc {
                        center,
                        radius,
                        sweep,
                        color,
                    }),
                    (_, false) => shapes.push(Shape::Polygon {
                        points: points.clone(),
                        color,
                    }),
                    (None, true) => {}
                },
                DrawCommand::Scale { .. } | DrawCommand::ClearRect { .. } => {}
            }
        }
        shapes
    }

    /// Human-readable dump, one command per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for cmd in &self.commands {
            let line = match cmd {
                DrawCommand::Scale { sx, sy } => format!("scale({sx:.2}, {sy:.2})"),
                DrawCommand::ClearRect {
                    x,
                    y,
                    width,
                    height,
                } => format!("clearRect({x:.1}, {y:.1}, {width:.1}, {height:.1})"),
                DrawCommand::BeginPath => "beginPath()".to_string(),
                DrawCommand::MoveTo(p) => format!("moveTo({:.2}, {:.2})", p.x, p.y),
                DrawCommand::LineTo(p) => format!("lineTo({:.2}, {:.2})", p.x, p.y),
                DrawCommand::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => format!(
                    "arc({:.2}, {:.2}, {radius:.2}, {start_angle:.4}, {end_angle:.4})",
                    center.x, center.y
                ),
                DrawCommand::SetFillColor(c) => format!("fillStyle = {c}"),
                DrawCommand::Fill => "fill()".to_string(),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

impl RasterContext for RecordingContext {
    fn scale(&mut self, sx: f32, sy: f32) {
        self.commands.push(DrawCommand::Scale { sx, sy });
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::MoveTo(Vec2::new(x, y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::LineTo(Vec2::new(x, y)));
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32) {
        self.commands.push(DrawCommand::Arc {
            center: Vec2::new(x, y),
            radius,
            start_angle,
            end_angle,
        });
    }

    fn set_fill_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::SetFillColor(color));
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }
}
