use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An agent as seen by the visualizer: where it is and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Normalized position, nominally inside `[0, 1]²`.
    pub position: Vec2,
    /// Heading in radians. Zero faces +y; any real value is accepted.
    pub rotation: f32,
}

impl Agent {
    pub fn new(x: f32, y: f32, rotation: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            rotation,
        }
    }
}

/// A food item. Only its position is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub position: Vec2,
}

impl Food {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
        }
    }
}

/// Read-only view of the engine's world for a single frame.
///
/// Produced fresh on each request; consumers must not hold one across ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub agents: Vec<Agent>,
    pub foods: Vec<Food>,
}

impl WorldSnapshot {
    pub fn new(agents: Vec<Agent>, foods: Vec<Food>) -> Self {
        Self { agents, foods }
    }

    /// Number of primitives a compositor draws for this snapshot.
    pub fn primitive_count(&self) -> usize {
        self.agents.len() + self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.foods.is_empty()
    }
}
