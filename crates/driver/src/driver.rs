use flockview_common::SurfaceGeometry;
use flockview_kernel::{Engine, EngineError, SharedEngine};
use flockview_render::{FrameCompositor, FrameStats, RasterContext, prepare_context};

use crate::scheduler::FrameScheduler;

/// What the driver does when the engine fails mid-loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineFailurePolicy {
    /// Stop scheduling and surface the error.
    #[default]
    Halt,
    /// Drop the frame, log it, and keep the loop alive.
    SkipFrame,
}

/// Driver configuration.
#[derive(Debug, Clone, Default)]
pub struct DriverConfig {
    pub on_engine_failure: EngineFailurePolicy,
    /// Under [`EngineFailurePolicy::SkipFrame`], halt after this many failed
    /// frames in a row. `None` skips forever.
    pub max_consecutive_failures: Option<u32>,
}

/// Loop state. A fresh driver is already `Scheduled`: the first callback is
/// the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// A frame callback is pending.
    Scheduled,
    /// A callback is executing.
    Running,
    /// An engine failure stopped the loop; nothing is scheduled.
    Halted,
}

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("engine failed on frame {frame}: {source}")]
    Engine {
        frame: u64,
        #[source]
        source: EngineError,
    },
    #[error("driver is halted; no frame is scheduled")]
    Halted,
}

/// Result of one callback that did not halt the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Rendered(FrameStats),
    Skipped(EngineError),
}

/// Loop counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub frames_rendered: u64,
    pub frames_skipped: u64,
    /// Callbacks requested, including the initial one.
    pub callbacks_scheduled: u64,
    pub consecutive_failures: u32,
    pub last_frame: FrameStats,
}

/// Owns the render side of the engine handle and the drawing surface.
///
/// Each callback steps the engine once, composes one frame from a fresh
/// snapshot, and requests the next callback.
pub struct SimulationDriver<E, C> {
    engine: SharedEngine<E>,
    context: C,
    compositor: FrameCompositor,
    config: DriverConfig,
    state: DriverState,
    stats: DriverStats,
    frame: u64,
}

impl<E: Engine, C: RasterContext> SimulationDriver<E, C> {
    /// Prepare the context for `geometry` and start the loop (the first
    /// callback is requested here).
    pub fn new(
        engine: SharedEngine<E>,
        mut context: C,
        geometry: SurfaceGeometry,
        config: DriverConfig,
    ) -> Self {
        prepare_context(&mut context, &geometry);
        Self {
            engine,
            context,
            compositor: FrameCompositor::new(geometry),
            config,
            state: DriverState::Scheduled,
            stats: DriverStats {
                callbacks_scheduled: 1,
                ..DriverStats::default()
            },
            frame: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    pub fn engine(&self) -> &SharedEngine<E> {
        &self.engine
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    /// Execute one frame callback.
    pub fn tick(&mut self) -> Result<FrameOutcome, DriverError> {
        if self.state == DriverState::Halted {
            return Err(DriverError::Halted);
        }
        let frame = self.frame;
        let _span = tracing::info_span!("driver_tick", frame).entered();

        self.state = DriverState::Running;
        self.frame += 1;
        let result = match self.engine.step() {
            Ok(()) => self.compositor.compose(&mut self.context, &self.engine),
            Err(e) => Err(e),
        };

        match result {
            Ok(stats) => {
                self.stats.frames_rendered += 1;
                self.stats.consecutive_failures = 0;
                self.stats.last_frame = stats;
                tracing::debug!(
                    discs = stats.discs,
                    triangles = stats.triangles,
                    "frame composed"
                );
                self.reschedule();
                Ok(FrameOutcome::Rendered(stats))
            }
            Err(source) => self.on_engine_failure(frame, source),
        }
    }

    /// Drive callbacks until the scheduler stops granting frames.
    ///
    /// Under [`EngineFailurePolicy::Halt`] the first engine failure ends the
    /// loop with an error.
    pub async fn run<S: FrameScheduler>(
        &mut self,
        scheduler: &mut S,
    ) -> Result<DriverStats, DriverError> {
        tracing::info!(
            policy = ?self.config.on_engine_failure,
            "render loop started"
        );
        while let Some(tick) = scheduler.next_frame().await {
            tracing::trace!(index = tick.index, elapsed = ?tick.elapsed, "frame granted");
            self.tick()?;
        }
        tracing::info!(
            rendered = self.stats.frames_rendered,
            skipped = self.stats.frames_skipped,
            "host stopped granting frames"
        );
        Ok(self.stats)
    }

    fn reschedule(&mut self) {
        self.state = DriverState::Scheduled;
        self.stats.callbacks_scheduled += 1;
    }

    fn on_engine_failure(
        &mut self,
        frame: u64,
        source: EngineError,
    ) -> Result<FrameOutcome, DriverError> {
        self.stats.consecutive_failures += 1;
        let give_up = match self.config.on_engine_failure {
            EngineFailurePolicy::Halt => true,
            EngineFailurePolicy::SkipFrame => self
                .config
                .max_consecutive_failures
                .is_some_and(|max| self.stats.consecutive_failures >= max),
        };

        if give_up {
            self.state = DriverState::Halted;
            tracing::error!(frame, "render loop halted: {source}");
            return Err(DriverError::Engine { frame, source });
        }

        self.stats.frames_skipped += 1;
        tracing::warn!(frame, "skipping frame: {source}");
        self.reschedule();
        Ok(FrameOutcome::Skipped(source))
    }
}
