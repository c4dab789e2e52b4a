//! Engine Kernel: the narrow contract the visualizer drives, plus a
//! deterministic stand-in engine for headless runs.
//!
//! # Invariants
//! - The engine is constructed once at the application root and shared by
//!   handle; there is no ambient global instance.
//! - All engine access is single-threaded. A handle never holds a borrow
//!   across a suspension point.

pub mod demo;
pub mod engine;

pub use demo::{DemoEngine, DemoEngineConfig, GenerationSummary, MAX_GENERATION_LENGTH};
pub use engine::{Engine, EngineError, SharedEngine};
