//! Falling and resting leaves.
//!
//! Leaves spawn across the canopy band at a season-driven rate, flutter down
//! and settle. Settled leaves are lifted again by a fast cursor, strong gusts
//! or vehicle wash. Once progress reaches the city every leaf retires.

use super::{Subsystem, SubsystemId};
use crate::body::{BodyKind, FreeBody};
use crate::context::{FrameContext, Rect};
use crate::curve::RateCurve;
use crate::emitter::{emit, EmitterShape, RateEmitter};
use crate::forces;
use crate::integrator::step_pool;
use crate::pool::BodyPool;
use crate::profile::ProfileTable;
use crate::spawn::SpawnContext;
use crate::visuals::Palette;
use glam::Vec2;

const SALT: u64 = 1;

/// Leaf subsystem.
#[derive(Clone, Debug)]
pub struct Leaves {
    pool: BodyPool,
    emitter: RateEmitter,
    rng: SpawnContext,
    profiles: ProfileTable,
    canopy: Rect,
    muted: bool,
    retired: bool,
    /// Gust strength above which settled leaves lift.
    pub gust_threshold: f32,
    /// Cursor disturbance reach.
    pub sweep_radius: f32,
    /// Cursor speed (px/frame) below which nothing is disturbed.
    pub sweep_min_speed: f32,
}

impl Leaves {
    pub fn new(capacity: usize, canopy: Rect, profiles: ProfileTable, seed: u64) -> Self {
        Self {
            pool: BodyPool::new(capacity),
            emitter: RateEmitter::new(RateCurve::leaves()),
            rng: SpawnContext::salted(seed, SALT),
            profiles,
            canopy,
            muted: false,
            retired: false,
            gust_threshold: 1.2,
            sweep_radius: 60.0,
            sweep_min_speed: 2.0,
        }
    }

    pub fn pool(&self) -> &BodyPool {
        &self.pool
    }

    /// Emission rate at progress `p`, leaves per second.
    pub fn rate_at(&self, p: f32) -> f32 {
        self.emitter.rate(p)
    }

    pub fn settled(&self) -> impl Iterator<Item = &FreeBody> {
        self.pool.settled()
    }

    pub fn falling(&self) -> impl Iterator<Item = &FreeBody> {
        self.pool.falling()
    }

    /// Knock leaves near `point` back into the air. Returns how many moved.
    pub fn wake(&mut self, point: Vec2, radius: f32, strength: f32) -> usize {
        if self.muted {
            return 0;
        }
        forces::wake(self.pool.iter_mut(), point, radius, strength)
    }

    pub fn wash(&mut self, origin: Vec2, velocity: Vec2, radius: f32, dt: f32) -> usize {
        if self.muted {
            return 0;
        }
        forces::wash(self.pool.iter_mut(), origin, velocity, radius, dt)
    }

    /// Spawn up to `count` leaves inside `area`, tinted for `season_t`.
    pub fn burst(&mut self, area: Rect, count: usize, season_t: f32) -> usize {
        if self.muted {
            return 0;
        }
        let shape = EmitterShape::Rect { min: area.min, max: area.max };
        let rng = &mut self.rng;
        emit(&mut self.pool, count, |_| {
            let at = shape.sample(rng);
            make_leaf(rng, at, season_t).with_velocity(rng.random_in_cone(
                -std::f32::consts::FRAC_PI_2,
                1.4,
                (0.5, 3.0),
            ))
        })
    }

    fn spawn(&mut self, count: usize, season_t: f32) {
        let shape = EmitterShape::Rect {
            min: self.canopy.min,
            max: self.canopy.max,
        };
        let rng = &mut self.rng;
        emit(&mut self.pool, count, |_| {
            let at = shape.sample(rng);
            make_leaf(rng, at, season_t)
        });
    }

    fn retire_all(&mut self) {
        for leaf in self.pool.iter_mut() {
            leaf.retire();
        }
    }
}

fn make_leaf(rng: &mut SpawnContext, at: Vec2, season_t: f32) -> FreeBody {
    let hue = (season_t + rng.random_range(-0.08, 0.08)).clamp(0.0, 1.0);
    let w = rng.random_range(8.0, 14.0);
    FreeBody::new(BodyKind::Leaf, at)
        .with_size(Vec2::new(w, w * rng.random_range(0.5, 0.65)))
        .with_color(Palette::Foliage.sample(hue).extend(1.0))
        .with_velocity(Vec2::new(rng.random_range(-0.4, 0.4), rng.random_range(0.0, 0.6)))
        .with_spin(rng.random_phase(), rng.random_range(-0.06, 0.06))
        .with_phase(rng.random_phase())
}

impl Subsystem for Leaves {
    fn id(&self) -> SubsystemId {
        SubsystemId::Leaves
    }

    fn update(&mut self, dt: f32, ctx: &FrameContext) {
        if self.muted {
            return;
        }

        if ctx.in_city() {
            if !self.retired {
                self.retire_all();
                self.emitter.reset();
                self.retired = true;
                log::debug!("leaves retiring at p={:.2}", ctx.progress);
            }
        } else {
            self.retired = false;
            let count = self.emitter.tick(ctx.progress, dt);
            self.spawn(count, ctx.season.position() / 3.0);
        }

        if let Some(cursor) = ctx.cursor {
            forces::cursor_sweep(
                self.pool.iter_mut(),
                cursor.position,
                cursor.velocity,
                self.sweep_radius,
                self.sweep_min_speed,
            );
        }
        forces::gust_lift(self.pool.iter_mut(), ctx.gust, self.gust_threshold);

        step_pool(&mut self.pool, &self.profiles, ctx, dt);
    }

    fn set_muted(&mut self, muted: bool) {
        if muted {
            self.pool.clear();
            self.emitter.reset();
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
    use crate::body::LifecycleState;
    use crate::context::{Bounds, Cursor};

    const DT: f32 = 1.0 / 60.0;

    fn leaves(cap: usize) -> Leaves {
        let canopy = Rect::new(Vec2::new(0.0, 50.0), Vec2::new(800.0, 200.0));
        Leaves::new(cap, canopy, ProfileTable::default(), 7)
    }

    fn ctx(p: f32) -> FrameContext {
        FrameContext::new(p, Bounds::new(800.0, 600.0, 500.0))
    }

    fn resting_leaf(x: f32) -> FreeBody {
        let mut b = FreeBody::new(BodyKind::Leaf, Vec2::new(x, 496.0)).with_size(Vec2::new(10.0, 8.0));
        b.state = LifecycleState::Settled;
        b.grounded = true;
        b
    }

    #[test]
    fn test_spawns_from_canopy() {
        let mut l = leaves(500);
        for _ in 0..60 {
            l.update(DT, &ctx(0.6));
        }
        assert!(l.live_count() > 0);
        assert!(l.pool().iter().all(|b| b.position.y < 500.0));
    }

    #[test]
    fn test_cap_holds() {
        let mut l = leaves(20);
        for _ in 0..600 {
            l.update(DT, &ctx(0.6));
            assert!(l.live_count() <= 20);
        }
    }

    #[test]
    fn test_dropped_leaf_settles() {
        let mut l = leaves(50);
        l.pool.push(FreeBody::new(BodyKind::Leaf, Vec2::new(400.0, 400.0)).with_size(Vec2::new(10.0, 6.0)));
        for _ in 0..600 {
            l.update(DT, &ctx(0.0));
        }
        assert!(l.settled().count() > 0);
    }

    #[test]
    fn test_burst_inside_area() {
        let mut l = leaves(50);
        let area = Rect::new(Vec2::new(300.0, 100.0), Vec2::new(420.0, 260.0));
        assert_eq!(l.burst(area, 12, 0.5), 12);
        assert!(l.pool().iter().all(|b| area.contains(b.position)));
    }

    #[test]
    fn test_fast_cursor_wakes_settled() {
        let mut l = leaves(50);
        l.pool.push(resting_leaf(400.0));
        l.pool.push(resting_leaf(410.0));
        l.pool.push(resting_leaf(700.0));

        let cursor = Cursor {
            position: Vec2::new(400.0, 495.0),
            velocity: Vec2::new(12.0, 0.0),
        };
        l.update(DT, &ctx(0.0).with_cursor(Some(cursor)));
        assert_eq!(l.settled().count(), 1);
        assert_eq!(l.settled().next().map(|b| b.position.x), Some(700.0));
    }

    #[test]
    fn test_slow_cursor_leaves_them() {
        let mut l = leaves(50);
        l.pool.push(resting_leaf(400.0));
        let cursor = Cursor {
            position: Vec2::new(400.0, 495.0),
            velocity: Vec2::new(0.5, 0.0),
        };
        l.update(DT, &ctx(0.0).with_cursor(Some(cursor)));
        assert_eq!(l.settled().count(), 1);
    }

    #[test]
    fn test_strong_gust_lifts_settled() {
        let mut l = leaves(50);
        for i in 0..10 {
            l.pool.push(resting_leaf(100.0 + i as f32 * 50.0).with_phase(i as f32));
        }
        let mut c = ctx(0.0);
        c.gust = 20.0;
        l.update(DT, &c);
        assert_eq!(l.settled().count(), 0);
    }

    #[test]
    fn test_city_retires_everything() {
        let mut l = leaves(100);
        for _ in 0..120 {
            l.update(DT, &ctx(0.6));
        }
        l.update(DT, &ctx(0.9));
        assert!(l
            .pool()
            .iter()
            .all(|b| b.state == LifecycleState::Retiring || b.state == LifecycleState::Dead));
        for _ in 0..600 {
            l.update(DT, &ctx(0.9));
        }
        assert_eq!(l.live_count(), 0);
    }

    #[test]
    fn test_mute_clears_and_skips() {
        let mut l = leaves(100);
        for _ in 0..60 {
            l.update(DT, &ctx(0.6));
        }
        l.set_muted(true);
        assert_eq!(l.live_count(), 0);
        for _ in 0..60 {
            l.update(DT, &ctx(0.6));
        }
        assert_eq!(l.live_count(), 0);
        assert_eq!(l.burst(Rect::new(Vec2::ZERO, Vec2::ONE), 5, 0.0), 0);
    }
}
