//! Rain and splashes.
//!
//! Drops fall from above the canvas at the rain curve's rate. A drop that
//! reaches the ground dies and throws a few splash droplets into a second,
//! separately capped pool.

use super::{Subsystem, SubsystemId};
use crate::body::{BodyKind, FreeBody};
use crate::context::FrameContext;
use crate::curve::RateCurve;
use crate::emitter::{emit, EmitterShape, RateEmitter};
use crate::integrator::{step_pool, CULL_MARGIN};
use crate::pool::BodyPool;
use crate::profile::ProfileTable;
use crate::spawn::SpawnContext;
use glam::{Vec2, Vec4};
use std::f32::consts::FRAC_PI_2;

const SALT: u64 = 3;

/// Rain subsystem.
#[derive(Clone, Debug)]
pub struct Rain {
    drops: BodyPool,
    splashes: BodyPool,
    emitter: RateEmitter,
    rng: SpawnContext,
    profiles: ProfileTable,
    muted: bool,
    /// Splash droplets per landed drop, inclusive range.
    pub splash_count: (usize, usize),
}

impl Rain {
    pub fn new(drop_cap: usize, splash_cap: usize, profiles: ProfileTable, seed: u64) -> Self {
        Self {
            drops: BodyPool::new(drop_cap),
            splashes: BodyPool::new(splash_cap),
            emitter: RateEmitter::new(RateCurve::rain()),
            rng: SpawnContext::salted(seed, SALT),
            profiles,
            muted: false,
            splash_count: (1, 3),
        }
    }

    /// Drops per second at progress `p`.
    pub fn rate_at(&self, p: f32) -> f32 {
        self.emitter.rate(p)
    }

    /// Rate at `p` relative to the peak band, `[0, 1]`.
    pub fn intensity_at(&self, p: f32) -> f32 {
        let peak = self.emitter.curve().peak();
        if peak > 0.0 {
            (self.rate_at(p) / peak).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn drops(&self) -> &BodyPool {
        &self.drops
    }

    pub fn splashes(&self) -> &BodyPool {
        &self.splashes
    }

    fn spawn_drops(&mut self, count: usize, ctx: &FrameContext) {
        let slant = ctx.wind * 0.6;
        // Shifted upwind by the slant, but never past the cull margin.
        let shift = slant * 40.0;
        let from = Vec2::new((-ctx.bounds.width * 0.1 - shift).max(-CULL_MARGIN), -20.0);
        let to = Vec2::new((ctx.bounds.width * 1.1 - shift).min(ctx.bounds.width + CULL_MARGIN), -20.0);
        let line = EmitterShape::Line { from, to };
        let rng = &mut self.rng;
        emit(&mut self.drops, count, |_| {
            let at = line.sample(rng) - Vec2::new(0.0, rng.random_range(0.0, 60.0));
            FreeBody::new(BodyKind::Raindrop, at)
                .with_velocity(Vec2::new(slant, rng.random_range(9.0, 14.0)))
                .with_size(Vec2::new(1.2, rng.random_range(10.0, 16.0)))
                .with_color(Vec4::new(0.72, 0.78, 0.88, rng.random_range(0.35, 0.6)))
        });
    }

    fn spawn_splashes(&mut self, points: &[Vec2]) {
        for &at in points {
            let n = self.rng.random_count(self.splash_count.0, self.splash_count.1);
            let rng = &mut self.rng;
            emit(&mut self.splashes, n, |_| {
                FreeBody::new(BodyKind::Splash, at - Vec2::new(0.0, 2.0))
                    .with_velocity(rng.random_in_cone(-FRAC_PI_2, 1.0, (0.8, 2.4)))
                    .with_size(Vec2::splat(rng.random_range(1.5, 2.5)))
                    .with_color(Vec4::new(0.78, 0.84, 0.92, 0.6))
            });
        }
    }
}

impl Subsystem for Rain {
    fn id(&self) -> SubsystemId {
        SubsystemId::Rain
    }

    fn update(&mut self, dt: f32, ctx: &FrameContext) {
        if self.muted {
            return;
        }
        let count = self.emitter.tick(ctx.progress, dt);
        self.spawn_drops(count, ctx);

        let landed = step_pool(&mut self.drops, &self.profiles, ctx, dt);
        self.spawn_splashes(&landed.splashes);
        step_pool(&mut self.splashes, &self.profiles, ctx, dt);
    }

    fn set_muted(&mut self, muted: bool) {
        if muted {
            self.drops.clear();
            self.splashes.clear();
            self.emitter.reset();
        }
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn live_count(&self) -> usize {
        self.drops.len() + self.splashes.len()
    }
}
