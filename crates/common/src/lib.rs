//! Shared types for the flockview driver: world snapshots, surface geometry,
//! and the normalized-to-pixel coordinate mapper.
//!
//! # Invariants
//! - Normalized positions are scaled by logical (CSS) dimensions only. The
//!   device scale factor is applied once, by the drawing context.
//! - Snapshots are plain values; nothing here mutates engine state.

pub mod geometry;
pub mod types;

pub use geometry::{MAX_DEVICE_DIMENSION, SurfaceError, SurfaceGeometry, map_coord, map_extent};
pub use types::{Agent, Food, WorldSnapshot};
