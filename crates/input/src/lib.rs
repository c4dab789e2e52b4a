//! Controls: user-triggered actions routed to the shared engine.
//!
//! # Invariants
//! - Controls never step the simulation and never wait on the render loop.
//! - Control outcomes are diagnostics only; they do not feed rendering.

pub mod action;
pub mod binding;

pub use action::Action;
pub use binding::{ControlBinding, TRAIN_CONTROL_ID};

pub fn crate_info() -> &'static str {
    "flockview-input v0.1.0"
}
