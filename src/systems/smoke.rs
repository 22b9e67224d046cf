//! Smoke puffs from chimneys and vehicle exhaust.
//!
//! Puffs rise slowly, drift with the wind, grow as they age and fade out.
//! Chimneys only smoke once progress passes the city threshold; a vehicle
//! smokes whenever one is present.

use super::{Subsystem, SubsystemId, Vehicle};
use crate::body::{BodyKind, FreeBody};
use crate::context::FrameContext;
use crate::curve::RateCurve;
use crate::emitter::{emit, RateEmitter};
use crate::integrator::step_pool;
use crate::pool::BodyPool;
use crate::profile::ProfileTable;
use crate::spawn::SpawnContext;
use crate::visuals::Palette;
use glam::Vec2;

const SALT: u64 = 5;

/// Smoke subsystem.
#[derive(Clone, Debug)]
pub struct Smoke {
    pool: BodyPool,
    chimney: RateEmitter,
    exhaust: RateEmitter,
    chimneys: Vec<Vec2>,
    rng: SpawnContext,
    profiles: ProfileTable,
    /// Smog tint position, follows progress.
    grime: f32,
    muted: bool,
}

impl Smoke {
    pub fn new(
        capacity: usize,
        chimneys: Vec<Vec2>,
        city_threshold: f32,
        profiles: ProfileTable,
        seed: u64,
    ) -> Self {
        Self {
            pool: BodyPool::new(capacity),
            chimney: RateEmitter::new(RateCurve::chimney(city_threshold)),
            exhaust: RateEmitter::new(RateCurve::zero()),
            chimneys,
            rng: SpawnContext::salted(seed, SALT),
            profiles,
            grime: 0.0,
            muted: false,
        }
    }

    pub fn pool(&self) -> &BodyPool {
        &self.pool
    }

    /// Chimney puffs per second at progress `p`, summed over all chimneys.
    pub fn chimney_rate_at(&self, p: f32) -> f32 {
        if self.chimneys.is_empty() {
            0.0
        } else {
            self.chimney.rate(p)
        }
    }

    /// Emit `count` puffs at `at` right away.
    pub fn burst(&mut self, at: Vec2, count: usize) -> usize {
        if self.muted {
            return 0;
        }
        let grime = self.grime;
        let rng = &mut self.rng;
        emit(&mut self.pool, count, |_| {
            let v = Vec2::new(rng.random_range(-0.8, 0.8), rng.random_range(-1.6, -0.6));
            make_puff(rng, at, grime).with_velocity(v)
        })
    }

    /// Emit this frame's exhaust for `vehicle`.
    pub fn exhaust(&mut self, vehicle: &Vehicle, dt: f32) -> usize {
        if self.muted {
            return 0;
        }
        let count = self.exhaust.tick_rate(vehicle.exhaust_rate, dt);
        let at = vehicle.exhaust_point();
        let trail = -vehicle.velocity * 0.2;
        let grime = self.grime;
        let rng = &mut self.rng;
        emit(&mut self.pool, count, |_| {
            let v = trail + Vec2::new(rng.random_range(-0.2, 0.2), rng.random_range(-0.9, -0.4));
            make_puff(rng, at, grime).with_velocity(v)
        })
    }

    fn spawn_chimneys(&mut self, ctx: &FrameContext, dt: f32) {
        if self.chimneys.is_empty() {
            return;
        }
        let count = self.chimney.tick(ctx.progress, dt);
        let grime = self.grime;
        let rng = &mut self.rng;
        let chimneys = &self.chimneys;
        emit(&mut self.pool, count, |_| {
            let at = rng.pick(chimneys).copied().unwrap_or_default();
            let v = Vec2::new(rng.random_range(-0.15, 0.15), rng.random_range(-1.1, -0.6));
            make_puff(rng, at, grime).with_velocity(v)
        });
    }
}

fn make_puff(rng: &mut SpawnContext, at: Vec2, grime: f32) -> FreeBody {
    let d = rng.random_range(10.0, 18.0);
    let shade = (grime + rng.random_range(-0.1, 0.1)).clamp(0.0, 1.0);
    FreeBody::new(BodyKind::Smoke, at + Vec2::new(rng.random_range(-3.0, 3.0), 0.0))
        .with_size(Vec2::splat(d))
        .with_color(Palette::Smog.sample(shade).extend(rng.random_range(0.35, 0.55)))
        .with_phase(rng.random_phase())
}

impl Subsystem for Smoke {
    fn id(&self) -> SubsystemId {
        SubsystemId::Smoke
    }

    fn update(&mut self, dt: f32, ctx: &FrameContext) {
        if self.muted {
            return;
        }
        self.grime = ctx.progress;
        self.spawn_chimneys(ctx, dt);
        step_pool(&mut self.pool, &self.profiles, ctx, dt);
    }

    fn set_muted(&mut self, muted: bool) {
        if muted {
            self.pool.clear();
            self.chimney.reset();
            self.exhaust.reset();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Bounds;

    const DT: f32 = 1.0 / 60.0;

    fn smoke() -> Smoke {
        Smoke::new(200, vec![Vec2::new(600.0, 300.0)], 0.85, ProfileTable::default(), 9)
    }

    fn ctx(p: f32) -> FrameContext {
        FrameContext::new(p, Bounds::new(800.0, 600.0, 500.0))
    }

    #[test]
    fn test_no_chimney_smoke_in_forest() {
        let mut s = smoke();
        assert_eq!(s.chimney_rate_at(0.5), 0.0);
        for _ in 0..120 {
            s.update(DT, &ctx(0.5));
        }
        assert_eq!(s.live_count(), 0);
    }

    #[test]
    fn test_chimneys_smoke_in_city() {
        let mut s = smoke();
        for _ in 0..120 {
            s.update(DT, &ctx(0.95));
        }
        assert!(s.live_count() > 0);
        assert!(s.pool().iter().all(|p| p.position.y < 300.0 + 1.0));
    }

    #[test]
    fn test_puffs_grow() {
        let mut s = smoke();
        s.burst(Vec2::new(400.0, 400.0), 1);
        let start = s.pool().iter().next().unwrap().visual.size.x;
        for _ in 0..30 {
            s.update(DT, &ctx(0.0));
        }
        let later = s.pool().iter().next().unwrap().visual.size.x;
        assert!(later > start);
    }

    #[test]
    fn test_vehicle_exhaust_rate() {
        let mut s = smoke();
        let v = Vehicle::new(Vec2::new(300.0, 480.0), Vec2::new(2.0, 0.0)).with_exhaust(Vec2::ZERO, 30.0);
        let mut emitted = 0;
        for _ in 0..60 {
            emitted += s.exhaust(&v, DT);
        }
        assert!((29..=30).contains(&emitted));
    }

    #[test]
    fn test_puffs_fade_out() {
        let mut s = smoke();
        s.burst(Vec2::new(400.0, 400.0), 5);
        for _ in 0..(60 * 5) {
            s.update(DT, &ctx(0.0));
        }
        assert_eq!(s.live_count(), 0);
    }
}
