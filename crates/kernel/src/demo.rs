//! Deterministic stand-in engine.
//!
//! Agents drift along their heading with a seeded wander, wrap at the edges
//! of the unit square, and eat any food they pass over. It exists so the
//! driver can run headless; it does not learn anything.

use glam::Vec2;

use flockview_common::{Agent, Food, WorldSnapshot};

use crate::engine::{Engine, EngineError};

/// Distance per tick, in normalized units.
const AGENT_SPEED: f32 = 0.002;
/// Largest heading change per tick, in radians.
const WANDER: f32 = 0.05;
/// An agent eats a food item within this distance.
const EAT_RADIUS: f32 = 0.01;
/// Longest generation the demo engine runs; `train` ticks through a whole
/// generation synchronously.
pub const MAX_GENERATION_LENGTH: u64 = 1_000_000;

/// Demo engine population and timing.
#[derive(Debug, Clone)]
pub struct DemoEngineConfig {
    pub agents: usize,
    pub foods: usize,
    /// Ticks per generation, clamped to [`MAX_GENERATION_LENGTH`].
    pub generation_length: u64,
    pub seed: u64,
}

impl Default for DemoEngineConfig {
    fn default() -> Self {
        Self {
            agents: 40,
            foods: 60,
            generation_length: 2500,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
struct DemoAgent {
    position: Vec2,
    rotation: f32,
    satiation: u32,
}

/// Satiation statistics for a finished generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    pub generation: u64,
    pub min: f32,
    pub max: f32,
    pub avg: f32,
}

impl std::fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "generation {}: min={:.2} max={:.2} avg={:.2}",
            self.generation, self.min, self.max, self.avg
        )
    }
}

#[derive(Debug, Clone)]
pub struct DemoEngine {
    config: DemoEngineConfig,
    rng: SplitMix64,
    agents: Vec<DemoAgent>,
    foods: Vec<Vec2>,
    age: u64,
    generation: u64,
    ticks: u64,
}

impl DemoEngine {
    pub fn new(mut config: DemoEngineConfig) -> Self {
        config.generation_length = config.generation_length.min(MAX_GENERATION_LENGTH);
        let mut rng = SplitMix64(config.seed);
        let agents = (0..config.agents)
            .map(|_| DemoAgent::random(&mut rng))
            .collect();
        let foods = (0..config.foods).map(|_| rng.next_point()).collect();
        Self {
            config,
            rng,
            agents,
            foods,
            age: 0,
            generation: 0,
            ticks: 0,
        }
    }

    /// Completed generations.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ticks into the current generation.
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Ticks since construction, across generations.
    pub fn total_ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance one tick; returns a summary when the generation rolls over.
    fn advance(&mut self) -> Option<GenerationSummary> {
        self.process_collisions();
        self.process_movements();
        self.age += 1;
        self.ticks += 1;

        if self.age > self.config.generation_length {
            Some(self.next_generation())
        } else {
            None
        }
    }

    fn process_collisions(&mut self) {
        for agent in &mut self.agents {
            for food in &mut self.foods {
                if agent.position.distance(*food) <= EAT_RADIUS {
                    agent.satiation += 1;
                    *food = self.rng.next_point();
                }
            }
        }
    }

    fn process_movements(&mut self) {
        for agent in &mut self.agents {
            agent.rotation += (self.rng.next_f32() * 2.0 - 1.0) * WANDER;
            let heading = Vec2::new(-agent.rotation.sin(), agent.rotation.cos());
            let next = agent.position + heading * AGENT_SPEED;
            agent.position = Vec2::new(wrap_unit(next.x), wrap_unit(next.y));
        }
    }

    fn next_generation(&mut self) -> GenerationSummary {
        self.age = 0;
        self.generation += 1;

        let summary = summarize(self.generation, &self.agents);

        let rng = &mut self.rng;
        for agent in &mut self.agents {
            *agent = DemoAgent::random(rng);
        }
        for food in &mut self.foods {
            *food = rng.next_point();
        }

        tracing::debug!(generation = self.generation, "demo engine generation rolled over");
        summary
    }
}

impl Engine for DemoEngine {
    fn step(&mut self) -> Result<(), EngineError> {
        self.advance();
        Ok(())
    }

    fn world(&self) -> Result<WorldSnapshot, EngineError> {
        Ok(WorldSnapshot {
            agents: self
                .agents
                .iter()
                .map(|a| Agent {
                    position: a.position,
                    rotation: a.rotation,
                })
                .collect(),
            foods: self.foods.iter().map(|&position| Food { position }).collect(),
        })
    }

    fn train(&mut self) -> Result<String, EngineError> {
        loop {
            if let Some(summary) = self.advance() {
                return Ok(summary.to_string());
            }
        }
    }
}

/// Wrap into `[0, 1)`. `rem_euclid` can round tiny negatives up to 1.0.
fn wrap_unit(v: f32) -> f32 {
    let w = v.rem_euclid(1.0);
    if w >= 1.0 { 0.0 } else { w }
}

fn summarize(generation: u64, agents: &[DemoAgent]) -> GenerationSummary {
    if agents.is_empty() {
        return GenerationSummary {
            generation,
            min: 0.0,
            max: 0.0,
            avg: 0.0,
        };
    }
    let values = agents.iter().map(|a| a.satiation as f32);
    let min = values.clone().fold(f32::INFINITY, f32::min);
    let max = values.clone().fold(f32::NEG_INFINITY, f32::max);
    let avg = values.sum::<f32>() / agents.len() as f32;
    GenerationSummary {
        generation,
        min,
        max,
        avg,
    }
}

impl DemoAgent {
    fn random(rng: &mut SplitMix64) -> Self {
        Self {
            position: rng.next_point(),
            rotation: rng.next_f32() * std::f32::consts::TAU,
            satiation: 0,
        }
    }
}

/// Splitmix64 stream. Same seed, same world.
#[derive(Debug, Clone)]
struct SplitMix64(u64);

impl SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    fn next_point(&mut self) -> Vec2 {
        let x = self.next_f32();
        let y = self.next_f32();
        Vec2::new(x, y)
    }
}
