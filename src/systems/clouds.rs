//! Drifting clouds.
//!
//! The number of clouds tracks the thirds stage, they drift with the wind,
//! wrap around the canvas edges and darken toward storm grey as rain builds.

use super::{Subsystem, SubsystemId};
use crate::body::{BodyKind, FreeBody, LifecycleState};
use crate::context::{FrameContext, Rect};
use crate::curve::RateCurve;
use crate::integrator::step_pool;
use crate::pool::{BodyPool, EvictionPolicy};
use crate::profile::ProfileTable;
use crate::spawn::SpawnContext;
use crate::visuals::Palette;
use glam::Vec2;

const SALT: u64 = 4;

/// Cloud count at the start of each thirds stage, plus the end of the last.
const TARGETS: [f32; 4] = [3.0, 5.0, 8.0, 12.0];

/// Cloud subsystem.
#[derive(Clone, Debug)]
pub struct Clouds {
    pool: BodyPool,
    rng: SpawnContext,
    profiles: ProfileTable,
    sky: Rect,
    /// Used only to derive how dark the clouds are.
    rain: RateCurve,
    darkness: f32,
    muted: bool,
}

impl Clouds {
    pub fn new(capacity: usize, sky: Rect, profiles: ProfileTable, seed: u64) -> Self {
        Self {
            pool: BodyPool::with_policy(capacity, EvictionPolicy::Reject),
            rng: SpawnContext::salted(seed, SALT),
            profiles,
            sky,
            rain: RateCurve::rain(),
            darkness: 0.0,
            muted: false,
        }
    }

    pub fn pool(&self) -> &BodyPool {
        &self.pool
    }

    /// Storm darkness in `[0, 1]` as of the last update.
    pub fn darkness(&self) -> f32 {
        self.darkness
    }

    /// How many clouds the sky should hold for this frame.
    pub fn target_count(&self, ctx: &FrameContext) -> usize {
        let s = ctx.stage;
        let i = s.stage.min(TARGETS.len() - 2);
        let target = s.blend(TARGETS[i], TARGETS[i + 1]).round() as usize;
        target.min(self.pool.capacity())
    }

    fn spawn(&mut self) {
        let at = self.rng.random_in_rect(self.sky.min, self.sky.max);
        let w = self.rng.random_range(160.0, 280.0);
        let cloud = FreeBody::new(BodyKind::Cloud, at)
            .with_size(Vec2::new(w, w * self.rng.random_range(0.3, 0.42)))
            .with_phase(self.rng.random_range(0.6, 1.4));
        self.pool.push(cloud);
    }

    /// Clouds that count toward the target.
    fn active(&self) -> usize {
        self.pool
            .iter()
            .filter(|c| c.state == LifecycleState::Airborne)
            .count()
    }
}

impl Subsystem for Clouds {
    fn id(&self) -> SubsystemId {
        SubsystemId::Clouds
    }

    fn update(&mut self, dt: f32, ctx: &FrameContext) {
        if self.muted {
            return;
        }

        // At most one arrival or departure per frame.
        let target = self.target_count(ctx);
        let active = self.active();
        if active < target && !self.pool.is_full() {
            self.spawn();
        } else if active > target {
            if let Some(oldest) = self
                .pool
                .iter_mut()
                .find(|c| c.state == LifecycleState::Airborne)
            {
                oldest.retire();
            }
        }

        let peak = self.rain.peak().max(1.0);
        self.darkness = (self.rain.rate(ctx.progress) / peak).clamp(0.0, 1.0);
        let color = Palette::Storm.sample(self.darkness).extend(0.85);
        for cloud in self.pool.iter_mut() {
            // `phase` doubles as the per-cloud drift speed.
            cloud.velocity = Vec2::new(0.15 * cloud.phase + ctx.wind * 0.25, 0.0);
            cloud.visual.color = color;
        }

        step_pool(&mut self.pool, &self.profiles, ctx, dt);
    }

    fn set_muted(&mut self, muted: bool) {
        if muted {
            self.pool.clear();
        }
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn live_count(&self) -> usize {
        self.pool.len()
    }
}
