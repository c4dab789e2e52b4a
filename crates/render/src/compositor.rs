use flockview_common::{SurfaceGeometry, WorldSnapshot};
use flockview_kernel::{Engine, EngineError, SharedEngine};

use crate::context::RasterContext;
use crate::primitives::{draw_disc, draw_triangle};

/// Food radius as a fraction of the logical surface width.
pub const FOOD_RADIUS_RATIO: f32 = 0.01 / 2.0;
/// Agent triangle size as a fraction of the logical surface width.
pub const AGENT_SIZE_RATIO: f32 = 0.01;

/// Primitive counts for one composed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub discs: usize,
    pub triangles: usize,
}

impl FrameStats {
    pub fn primitives(&self) -> usize {
        self.discs + self.triangles
    }
}

/// Clears the surface and draws every food and agent of a fresh snapshot.
#[derive(Debug, Clone)]
pub struct FrameCompositor {
    geometry: SurfaceGeometry,
}

impl FrameCompositor {
    pub fn new(geometry: SurfaceGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &SurfaceGeometry {
        &self.geometry
    }

    /// Compose one frame: clear, fetch one snapshot, draw it.
    ///
    /// The snapshot is dropped before returning; nothing carries over to the
    /// next frame.
    pub fn compose<C, E>(
        &self,
        ctx: &mut C,
        engine: &SharedEngine<E>,
    ) -> Result<FrameStats, EngineError>
    where
        C: RasterContext + ?Sized,
        E: Engine,
    {
        self.clear(ctx);
        let snapshot = engine.world()?;
        Ok(self.draw_snapshot(ctx, &snapshot))
    }

    /// Clear the whole logical-size rectangle.
    pub fn clear<C: RasterContext + ?Sized>(&self, ctx: &mut C) {
        ctx.clear_rect(0.0, 0.0, self.geometry.width(), self.geometry.height());
    }

    /// Draw foods then agents, each in snapshot order. Does not clear.
    pub fn draw_snapshot<C: RasterContext + ?Sized>(
        &self,
        ctx: &mut C,
        snapshot: &WorldSnapshot,
    ) -> FrameStats {
        let radius = self.geometry.map_width_extent(FOOD_RADIUS_RATIO);
        for food in &snapshot.foods {
            draw_disc(ctx, self.geometry.map_point(food.position), radius);
        }

        let size = self.geometry.map_width_extent(AGENT_SIZE_RATIO);
        for agent in &snapshot.agents {
            draw_triangle(
                ctx,
                self.geometry.map_point(agent.position),
                size,
                agent.rotation,
            );
        }

        FrameStats {
            discs: snapshot.foods.len(),
            triangles: snapshot.agents.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{DrawCommand, RecordingContext, Shape};
    use flockview_common::{Agent, Food};
    use glam::Vec2;

    struct Fixed(WorldSnapshot);

    impl Engine for Fixed {
        fn step(&mut self) -> Result<(), EngineError> {
            Ok(())
        }

        fn world(&self) -> Result<WorldSnapshot, EngineError> {
            Ok(self.0.clone())
        }

        fn train(&mut self) -> Result<String, EngineError> {
            Ok(String::new())
        }
    }

    struct Broken;

    impl Engine for Broken {
        fn step(&mut self) -> Result<(), EngineError> {
            Ok(())
        }

        fn world(&self) -> Result<WorldSnapshot, EngineError> {
            Err(EngineError::World("gone".into()))
        }

        fn train(&mut self) -> Result<String, EngineError> {
            Ok(String::new())
        }
    }

    fn compositor() -> FrameCompositor {
        FrameCompositor::new(SurfaceGeometry::new(400.0, 300.0, 2.0).unwrap())
    }

    #[test]
    fn empty_snapshot_only_clears() {
        let engine = SharedEngine::new(Fixed(WorldSnapshot::default()));
        let mut ctx = RecordingContext::new();
        let stats = compositor().compose(&mut ctx, &engine).unwrap();
        assert_eq!(stats.primitives(), 0);
        assert_eq!(
            ctx.commands(),
            &[DrawCommand::ClearRect {
                x: 0.0,
                y: 0.0,
                width: 400.0,
                height: 300.0
            }]
        );
    }

    #[test]
    fn draws_one_primitive_per_entity() {
        let snapshot = WorldSnapshot::new(
            vec![Agent::new(0.1, 0.1, 0.0), Agent::new(0.9, 0.9, 1.0)],
            vec![
                Food::new(0.2, 0.2),
                Food::new(0.3, 0.3),
                Food::new(0.4, 0.4),
            ],
        );
        let engine = SharedEngine::new(Fixed(snapshot));
        let mut ctx = RecordingContext::new();
        let stats = compositor().compose(&mut ctx, &engine).unwrap();
        assert_eq!(stats, FrameStats { discs: 3, triangles: 2 });
        assert_eq!(ctx.fill_count(), 5);
    }

    #[test]
    fn preserves_snapshot_order() {
        let snapshot = WorldSnapshot::new(
            vec![Agent::new(0.5, 0.5, 0.0), Agent::new(0.25, 0.25, 0.0)],
            vec![Food::new(0.75, 0.5), Food::new(0.25, 0.5)],
        );
        let mut ctx = RecordingContext::new();
        compositor().draw_snapshot(&mut ctx, &snapshot);

        let centers: Vec<Vec2> = ctx
            .shapes()
            .iter()
            .map(|s| match s {
                Shape::Disc { center, .. } => *center,
                Shape::Polygon { points, .. } => points[0] - Vec2::new(0.0, 6.0),
            })
            .collect();
        assert_eq!(
            centers,
            vec![
                Vec2::new(300.0, 150.0),
                Vec2::new(100.0, 150.0),
                Vec2::new(200.0, 150.0),
                Vec2::new(100.0, 75.0),
            ]
        );
    }

    #[test]
    fn clear_happens_before_snapshot_fetch_failure() {
        let engine = SharedEngine::new(Broken);
        let mut ctx = RecordingContext::new();
        let err = compositor().compose(&mut ctx, &engine).unwrap_err();
        assert_eq!(err, EngineError::World("gone".into()));
        assert_eq!(ctx.commands().len(), 1);
        assert!(ctx.shapes().is_empty());
    }

    #[test]
    fn sizes_follow_logical_width_not_device_width() {
        let snapshot = WorldSnapshot::new(vec![], vec![Food::new(0.5, 0.5)]);
        let mut ctx = RecordingContext::new();
        compositor().draw_snapshot(&mut ctx, &snapshot);
        match ctx.shapes().as_slice() {
            [Shape::Disc { center, radius, .. }] => {
                assert_eq!(*center, Vec2::new(200.0, 150.0));
                assert_eq!(*radius, 2.0);
            }
            other => panic!("unexpected shapes: {other:?}"),
        }
    }
}
