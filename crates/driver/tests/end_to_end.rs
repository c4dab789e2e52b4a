use std::f32::consts::TAU;

use glam::Vec2;

use flockview_common::{Agent, Food, SurfaceGeometry, WorldSnapshot};
use flockview_driver::{
    DriverConfig, DriverError, DriverState, EngineFailurePolicy, FrameOutcome, FrameScheduler,
    FrameTick, ManualScheduler, SimulationDriver,
};
use flockview_input::{ControlBinding, TRAIN_CONTROL_ID};
use flockview_kernel::{DemoEngine, DemoEngineConfig, Engine, EngineError, SharedEngine};
use flockview_render::{Color, PixelCanvas, RecordingContext, Shape};

/// Engine double that replays a scripted snapshot and counts calls.
#[derive(Default)]
struct Scripted {
    snapshot: WorldSnapshot,
    steps: u32,
    generations: u32,
    fail_world_after: Option<u32>,
}

impl Scripted {
    fn with(snapshot: WorldSnapshot) -> Self {
        Self {
            snapshot,
            ..Self::default()
        }
    }
}

impl Engine for Scripted {
    fn step(&mut self) -> Result<(), EngineError> {
        self.steps += 1;
        Ok(())
    }

    fn world(&self) -> Result<WorldSnapshot, EngineError> {
        if self.fail_world_after.is_some_and(|n| self.steps > n) {
            return Err(EngineError::World("snapshot unavailable".into()));
        }
        Ok(self.snapshot.clone())
    }

    fn train(&mut self) -> Result<String, EngineError> {
        self.generations += 1;
        Ok(format!("generation {}", self.generations))
    }
}

/// Scheduler that counts how often the driver asked for a frame.
struct Counting {
    inner: ManualScheduler,
    requests: u64,
}

impl FrameScheduler for Counting {
    fn next_frame(&mut self) -> impl Future<Output = Option<FrameTick>> {
        self.requests += 1;
        self.inner.next_frame()
    }
}

fn geometry() -> SurfaceGeometry {
    SurfaceGeometry::new(400.0, 300.0, 2.0).unwrap()
}

fn recording_driver(engine: Scripted) -> SimulationDriver<Scripted, RecordingContext> {
    SimulationDriver::new(
        SharedEngine::new(engine),
        RecordingContext::new(),
        geometry(),
        DriverConfig::default(),
    )
}

#[test]
fn single_food_draws_one_disc_at_center() {
    let mut driver = recording_driver(Scripted::with(WorldSnapshot::new(
        vec![],
        vec![Food::new(0.5, 0.5)],
    )));
    driver.tick().unwrap();

    let shapes = driver.context().shapes();
    assert_eq!(
        shapes,
        vec![Shape::Disc {
            center: Vec2::new(200.0, 150.0),
            radius: 2.0,
            sweep: TAU,
            color: Color::FOOD,
        }]
    );
}

#[test]
fn single_agent_draws_one_triangle_with_nose_offset() {
    let mut driver = recording_driver(Scripted::with(WorldSnapshot::new(
        vec![Agent::new(0.25, 0.75, 0.0)],
        vec![],
    )));
    driver.tick().unwrap();

    let shapes = driver.context().shapes();
    assert_eq!(shapes.len(), 1);
    let Shape::Polygon { points, color } = &shapes[0] else {
        panic!("expected a triangle, got {shapes:?}");
    };
    assert_eq!(*color, Color::AGENT);
    assert_eq!(points.len(), 4);
    assert_eq!(points[0], Vec2::new(100.0, 231.0));
    assert_eq!(points[3], points[0]);
}

#[test]
fn primitives_match_snapshot_cardinality_every_tick() {
    let snapshot = WorldSnapshot::new(
        vec![Agent::new(0.1, 0.2, 1.0); 7],
        vec![Food::new(0.3, 0.4); 11],
    );
    let mut driver = recording_driver(Scripted::with(snapshot));
    for _ in 0..3 {
        driver.context_mut().take();
        driver.tick().unwrap();
        assert_eq!(driver.context().fill_count(), 18);
    }
    assert_eq!(driver.stats().last_frame.primitives(), 18);
}

#[test]
fn run_steps_once_per_callback_and_requests_one_more() {
    let mut driver = recording_driver(Scripted::default());
    let mut scheduler = Counting {
        inner: ManualScheduler::new(25),
        requests: 0,
    };
    let stats = pollster::block_on(driver.run(&mut scheduler)).unwrap();

    assert_eq!(stats.frames_rendered, 25);
    assert_eq!(stats.callbacks_scheduled, 26);
    // the 26th request is the one the host declined
    assert_eq!(scheduler.requests, 26);
    assert_eq!(driver.engine().inspect(|e| e.steps).unwrap(), 25);
    assert_eq!(driver.state(), DriverState::Scheduled);
}

#[test]
fn snapshot_is_fetched_fresh_each_frame() {
    let engine = SharedEngine::new(DemoEngine::new(DemoEngineConfig {
        agents: 3,
        foods: 0,
        generation_length: 1000,
        seed: 11,
    }));
    let mut driver = SimulationDriver::new(
        engine.clone(),
        RecordingContext::new(),
        geometry(),
        DriverConfig::default(),
    );

    driver.tick().unwrap();
    let first = driver.context_mut().take();
    driver.tick().unwrap();
    let second = driver.context_mut().take();
    assert_ne!(first, second);

    // drawn noses follow the engine's current world, not a cached copy
    let world = engine.world().unwrap();
    let mut replay = RecordingContext::new();
    flockview_render::FrameCompositor::new(geometry()).draw_snapshot(&mut replay, &world);
    assert_eq!(&second[1..], replay.commands());
}

#[test]
fn halt_policy_ends_run_with_engine_error() {
    let mut driver = recording_driver(Scripted {
        fail_world_after: Some(3),
        ..Scripted::default()
    });
    let mut scheduler = ManualScheduler::new(10);
    let err = pollster::block_on(driver.run(&mut scheduler)).unwrap_err();

    assert!(matches!(
        err,
        DriverError::Engine {
            frame: 3,
            source: EngineError::World(_)
        }
    ));
    assert_eq!(driver.state(), DriverState::Halted);
    assert_eq!(scheduler.issued(), 4);
}

#[test]
fn skip_policy_survives_engine_failures() {
    let mut driver = SimulationDriver::new(
        SharedEngine::new(Scripted {
            fail_world_after: Some(3),
            ..Scripted::default()
        }),
        RecordingContext::new(),
        geometry(),
        DriverConfig {
            on_engine_failure: EngineFailurePolicy::SkipFrame,
            max_consecutive_failures: None,
        },
    );
    let stats = pollster::block_on(driver.run(&mut ManualScheduler::new(10))).unwrap();
    assert_eq!(stats.frames_rendered, 3);
    assert_eq!(stats.frames_skipped, 7);
    assert_eq!(stats.callbacks_scheduled, 11);
}

#[test]
fn train_between_frames_never_steps_or_blocks() {
    let engine = SharedEngine::new(Scripted::with(WorldSnapshot::new(
        vec![Agent::new(0.5, 0.5, 0.0)],
        vec![],
    )));
    let control = ControlBinding::train(engine.clone());
    let mut driver = SimulationDriver::new(
        engine.clone(),
        RecordingContext::new(),
        geometry(),
        DriverConfig::default(),
    );

    driver.tick().unwrap();
    assert_eq!(
        control.on_trigger(TRAIN_CONTROL_ID).unwrap().as_deref(),
        Some("generation 1")
    );
    assert_eq!(engine.inspect(|e| e.steps).unwrap(), 1);
    assert_eq!(driver.state(), DriverState::Scheduled);

    assert!(matches!(driver.tick().unwrap(), FrameOutcome::Rendered(_)));
    control.on_trigger(TRAIN_CONTROL_ID).unwrap();
    assert_eq!(
        engine.inspect(|e| (e.steps, e.generations)).unwrap(),
        (2, 2)
    );
}

#[test]
fn demo_engine_renders_onto_pixel_canvas() {
    let geometry = SurfaceGeometry::new(200.0, 150.0, 2.0).unwrap();
    let engine = SharedEngine::new(DemoEngine::new(DemoEngineConfig::default()));
    let mut driver = SimulationDriver::new(
        engine,
        PixelCanvas::new(&geometry).unwrap(),
        geometry,
        DriverConfig::default(),
    );
    let stats = pollster::block_on(driver.run(&mut ManualScheduler::new(5))).unwrap();
    assert_eq!(stats.last_frame.discs, 60);
    assert_eq!(stats.last_frame.triangles, 40);

    let canvas = driver.into_context();
    assert_eq!((canvas.width(), canvas.height()), (400, 300));
    assert!(canvas.count_pixels(Color::FOOD) > 0);
    assert!(canvas.count_pixels(Color::AGENT) > 0);
}
