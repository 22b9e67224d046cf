//! Knocked-down fliers.
//!
//! A knock-down breaks a flier into a handful of tumbling fragments that
//! bounce and settle, plus a shower of short-lived additive sparks.

use super::{Subsystem, SubsystemId};
use crate::body::{BodyKind, FreeBody};
use crate::context::FrameContext;
use crate::emitter::emit;
use crate::integrator::step_pool;
use crate::pool::BodyPool;
use crate::profile::ProfileTable;
use crate::spawn::SpawnContext;
use glam::{Vec2, Vec4};
use std::f32::consts::{FRAC_PI_2, PI};

const SALT: u64 = 6;

/// Wreckage subsystem.
#[derive(Clone, Debug)]
pub struct Wreckage {
    fragments: BodyPool,
    sparks: BodyPool,
    rng: SpawnContext,
    profiles: ProfileTable,
    muted: bool,
    /// Fragments per knock-down, inclusive range.
    pub fragment_count: (usize, usize),
    /// Sparks per knock-down, inclusive range.
    pub spark_count: (usize, usize),
}

impl Wreckage {
    pub fn new(fragment_cap: usize, spark_cap: usize, profiles: ProfileTable, seed: u64) -> Self {
        Self {
            fragments: BodyPool::new(fragment_cap),
            sparks: BodyPool::new(spark_cap),
            rng: SpawnContext::salted(seed, SALT),
            profiles,
            muted: false,
            fragment_count: (6, 10),
            spark_count: (10, 16),
        }
    }

    pub fn fragments(&self) -> &BodyPool {
        &self.fragments
    }

    pub fn sparks(&self) -> &BodyPool {
        &self.sparks
    }

    /// Break a flier at `at` moving with `velocity`. Returns bodies stored.
    pub fn knock_down(&mut self, at: Vec2, velocity: Vec2) -> usize {
        if self.muted {
            return 0;
        }
        let n_frag = self.rng.random_count(self.fragment_count.0, self.fragment_count.1);
        let n_spark = self.rng.random_count(self.spark_count.0, self.spark_count.1);
        let inherit = velocity * 0.5;
        let rng = &mut self.rng;

        let fragments = emit(&mut self.fragments, n_frag, |_| {
            let v = inherit + rng.random_in_cone(-FRAC_PI_2, 1.2, (2.0, 7.0));
            let grey = rng.random_range(0.25, 0.5);
            FreeBody::new(BodyKind::WreckFragment, rng.random_in_disc(at, 6.0))
                .with_velocity(v)
                .with_size(Vec2::new(rng.random_range(4.0, 12.0), rng.random_range(3.0, 8.0)))
                .with_color(Vec4::new(grey, grey, grey * 1.05, 1.0))
                .with_spin(rng.random_phase(), rng.random_range(-0.3, 0.3))
        });
        let sparks = emit(&mut self.sparks, n_spark, |_| {
            let v = inherit * 0.5 + rng.random_in_cone(-FRAC_PI_2, PI, (3.0, 9.0));
            FreeBody::new(BodyKind::Spark, at)
                .with_velocity(v)
                .with_size(Vec2::splat(rng.random_range(2.0, 3.5)))
                .with_color(Vec4::new(1.0, rng.random_range(0.6, 0.85), 0.3, 1.0))
        });
        log::debug!(
            "knock-down at ({:.0}, {:.0}): {} fragments, {} sparks",
            at.x,
            at.y,
            fragments,
            sparks
        );
        fragments + sparks
    }
}

impl Subsystem for Wreckage {
    fn id(&self) -> SubsystemId {
        SubsystemId::Wreckage
    }

    fn update(&mut self, dt: f32, ctx: &FrameContext) {
        if self.muted {
            return;
        }
        step_pool(&mut self.fragments, &self.profiles, ctx, dt);
        step_pool(&mut self.sparks, &self.profiles, ctx, dt);
    }

    fn set_muted(&mut self, muted: bool) {
        if muted {
            self.fragments.clear();
            self.sparks.clear();
        }
        self.muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn live_count(&self) -> usize {
        self.fragments.len() + self.sparks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Bounds;

    const DT: f32 = 1.0 / 60.0;

    fn wreckage() -> Wreckage {
        Wreckage::new(50, 50, ProfileTable::default(), 1)
    }

    fn ctx() -> FrameContext {
        FrameContext::new(0.5, Bounds::new(800.0, 600.0, 500.0))
    }

    #[test]
    fn test_knock_down_spawns_both() {
        let mut w = wreckage();
        let stored = w.knock_down(Vec2::new(400.0, 200.0), Vec2::new(3.0, 0.0));
        assert!((6..=10).contains(&w.fragments().len()));
        assert!((10..=16).contains(&w.sparks().len()));
        assert_eq!(stored, w.live_count());
    }

    #[test]
    fn test_sparks_burn_out_fragments_settle() {
        let mut w = wreckage();
        w.knock_down(Vec2::new(400.0, 300.0), Vec2::ZERO);
        for _ in 0..(60 * 6) {
            w.update(DT, &ctx());
        }
        assert!(w.sparks().is_empty());
        assert!(w.fragments().settled().count() > 0);
    }

    #[test]
    fn test_caps_hold_under_repeats() {
        let mut w = wreckage();
        for i in 0..20 {
            w.knock_down(Vec2::new(100.0 + i as f32 * 20.0, 200.0), Vec2::ZERO);
            assert!(w.fragments().len() <= 50);
            assert!(w.sparks().len() <= 50);
        }
    }
}
