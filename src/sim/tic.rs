use super::{spawn, systems};
use crate::bsp::EntityProperties;
use crate::world::Level;
use hecs::World;

pub const SIM_FPS: u32 = 35;
pub const DT: f32 = 1.0 / SIM_FPS as f32;

/// Longest frame honoured by `pump`; a stalled frame must not queue
/// hundreds of catch-up tics.
const MAX_FRAME: f32 = 0.25;

/// Owns the ECS world and drives all game-logic systems.
pub struct TicRunner {
    world: World,
    accumulator: f32,
    tics: u64,
}

impl Default for TicRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TicRunner {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            accumulator: 0.0,
            tics: 0,
        }
    }

    #[inline]
    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut hecs::World {
        &mut self.world
    }

    /// Tics run since creation.
    pub fn tics(&self) -> u64 {
        self.tics
    }

    /// Spawn a map entity and return its `Entity` handle.
    #[inline]
    pub fn spawn_entity(
        &mut self,
        level: &Level,
        index: usize,
        props: &EntityProperties,
    ) -> Option<hecs::Entity> {
        spawn::spawn_entity(&mut self.world, level, index, props)
    }

    /// Advance by `dt` seconds of frame time; returns the tics run.
    pub fn pump(&mut self, level: &Level, dt: f32) -> u32 {
        // max() also maps NaN to 0
        self.accumulator += dt.max(0.0).min(MAX_FRAME);
        let mut ran = 0;
        while self.accumulator >= DT {
            self.tick(level);
            self.accumulator -= DT;
            ran += 1;
        }
        ran
    }

    /* ---------------------------------------------------------------- */
    /* internal: run one fixed-rate game tic                             */
    /* ---------------------------------------------------------------- */
    fn tick(&mut self, level: &Level) {
        systems::link_entities(&mut self.world, level);
        self.tics += 1;
    }
}
