//! Seeded randomness for spawning.
//!
//! Every subsystem owns its own [`SpawnContext`] seeded from the scene seed
//! plus a per-subsystem salt, so a run is reproducible and one subsystem's
//! spawn count never shifts another's random stream.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Random helpers for spawn code.
#[derive(Clone, Debug)]
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Deterministic stream from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Stream for one subsystem: `seed` mixed with `salt`.
    pub fn salted(seed: u64, salt: u64) -> Self {
        Self::seeded(seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random usize in `[min, max]`.
    #[inline]
    pub fn random_count(&mut self, min: usize, max: usize) -> usize {
        if max > min {
            self.rng.gen_range(min..=max)
        } else {
            min
        }
    }

    /// Random angle in `[0, TAU)`.
    #[inline]
    pub fn random_phase(&mut self) -> f32 {
        self.random_range(0.0, TAU)
    }

    /// Uniform pick from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            items.get(self.rng.gen_range(0..items.len()))
        }
    }

    // ========== Position helpers ==========

    /// Uniform point inside the rectangle `[min, max]`.
    pub fn random_in_rect(&mut self, min: Vec2, max: Vec2) -> Vec2 {
        Vec2::new(self.random_range(min.x, max.x), self.random_range(min.y, max.y))
    }

    /// Uniform point inside a disc.
    pub fn random_in_disc(&mut self, center: Vec2, radius: f32) -> Vec2 {
        let angle = self.random_phase();
        let r = radius * self.random().sqrt();
        center + Vec2::from_angle(angle) * r
    }

    // ========== Velocity helpers ==========

    /// Velocity of random magnitude in `speed` pointing within `spread`
    /// radians either side of `direction` (radians, canvas space).
    pub fn random_in_cone(&mut self, direction: f32, spread: f32, speed: (f32, f32)) -> Vec2 {
        let angle = direction + self.random_range(-spread, spread);
        Vec2::from_angle(angle) * self.random_range(speed.0, speed.1)
    }
}
