//! Simulation Driver: the self-rescheduling render loop.
//!
//! # Invariants
//! - Exactly one engine `step()` and one composed frame per granted callback.
//! - Each iteration requests exactly one next callback; a halted driver
//!   requests none.
//! - The only suspension point is the wait for the next frame. No engine
//!   borrow is held across it.

mod driver;
mod scheduler;

pub use driver::{
    DriverConfig, DriverError, DriverState, DriverStats, EngineFailurePolicy, FrameOutcome,
    SimulationDriver,
};
pub use scheduler::{FixedRateScheduler, FrameScheduler, FrameTick, ManualScheduler};

pub fn crate_info() -> &'static str {
    "flockview-driver v0.1.0"
}
