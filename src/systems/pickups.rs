//! Fruit, flowers and twigs.
//!
//! Pickups drop from the canopy on their own, fall out of trees when clicked
//! and burst from felled trees. They rot through decay stages, can be grabbed
//! and thrown with the cursor, and get pushed around by passing vehicles.

use super::{Subsystem, SubsystemId};
use crate::body::{BodyKind, FreeBody, LifecycleState};
use crate::context::{FrameContext, Rect};
use crate::curve::RateCurve;
use crate::emitter::{emit, EmitterShape, RateEmitter};
use crate::forces;
use crate::integrator::step_pool;
use crate::pool::BodyPool;
use crate::profile::ProfileTable;
use crate::spawn::SpawnContext;
use crate::stage::Season;
use crate::visuals::Palette;
use glam::{Vec2, Vec4};

const SALT: u64 = 2;

/// Pickup subsystem.
#[derive(Clone, Debug)]
pub struct Pickups {
    pool: BodyPool,
    drops: RateEmitter,
    litter: RateEmitter,
    rng: SpawnContext,
    profiles: ProfileTable,
    canopy: Rect,
    /// Serial of the body under the cursor.
    held: Option<u64>,
    muted: bool,
    retired: bool,
    /// How far from the cursor a grab may reach.
    pub grab_radius: f32,
}

impl Pickups {
    pub fn new(capacity: usize, canopy: Rect, profiles: ProfileTable, seed: u64) -> Self {
        Self {
            pool: BodyPool::new(capacity),
            drops: RateEmitter::new(RateCurve::pickups()),
            litter: RateEmitter::new(RateCurve::litter()),
            rng: SpawnContext::salted(seed, SALT),
            profiles,
            canopy,
            held: None,
            muted: false,
            retired: false,
            grab_radius: 40.0,
        }
    }

    pub fn pool(&self) -> &BodyPool {
        &self.pool
    }

    /// What a tree drops in a given season.
    pub fn kind_for(season: Season) -> BodyKind {
        match season {
            Season::Full => BodyKind::Flower,
            Season::Mid1 | Season::Mid2 => BodyKind::Apple,
            Season::Bare => BodyKind::Twig,
        }
    }

    /// Spawn one pickup of `kind` at `at`. Returns whether it was stored.
    pub fn spawn(&mut self, kind: BodyKind, at: Vec2) -> bool {
        if self.muted {
            return false;
        }
        let body = make_pickup(&mut self.rng, kind, at);
        self.pool.push(body).stored()
    }

    /// Spawn up to `count` twigs inside `area` flying outward.
    pub fn twig_burst(&mut self, area: Rect, count: usize) -> usize {
        if self.muted {
            return 0;
        }
        let shape = EmitterShape::Rect { min: area.min, max: area.max };
        let rng = &mut self.rng;
        emit(&mut self.pool, count, |_| {
            let at = shape.sample(rng);
            let v = rng.random_in_cone(-std::f32::consts::FRAC_PI_2, 1.2, (1.5, 5.0));
            make_pickup(rng, BodyKind::Twig, at).with_velocity(v)
        })
    }

    /// Body currently held by the cursor.
    pub fn held(&self) -> Option<&FreeBody> {
        let serial = self.held?;
        self.pool.iter().find(|b| b.serial == serial)
    }

    /// Pick up the nearest pickup within reach of `point`.
    pub fn grab(&mut self, point: Vec2) -> bool {
        if self.muted || self.held.is_some() {
            return false;
        }
        let found = self.pool.nearest(point, self.grab_radius, |b| {
            b.kind.is_pickup() && matches!(b.state, LifecycleState::Airborne | LifecycleState::Settled)
        });
        let Some(body) = found.and_then(|i| self.pool.get_mut(i)) else {
            return false;
        };
        body.state = LifecycleState::Dragging;
        body.grounded = false;
        body.velocity = Vec2::ZERO;
        body.angular_velocity = 0.0;
        self.held = Some(body.serial);
        log::debug!("grabbed {:?} #{}", body.kind, body.serial);
        true
    }

    /// Let go of the held body with `throw` velocity (px/frame).
    pub fn release(&mut self, throw: Vec2) -> bool {
        let Some(serial) = self.held.take() else {
            return false;
        };
        match self.pool.iter_mut().find(|b| b.serial == serial) {
            Some(body) if body.state == LifecycleState::Dragging => {
                body.state = LifecycleState::Airborne;
                body.velocity = throw;
                body.angular_velocity = throw.x * 0.02;
                true
            }
            _ => false,
        }
    }

    pub fn wash(&mut self, origin: Vec2, velocity: Vec2, radius: f32, dt: f32) -> usize {
        if self.muted {
            return 0;
        }
        forces::wash(self.pool.iter_mut(), origin, velocity, radius, dt)
    }

    fn follow_cursor(&mut self, ctx: &FrameContext) {
        let Some(serial) = self.held else {
            return;
        };
        let Some(body) = self.pool.iter_mut().find(|b| b.serial == serial) else {
            self.held = None;
            return;
        };
        if body.state != LifecycleState::Dragging {
            self.held = None;
            return;
        }
        if let Some(cursor) = ctx.cursor {
            body.position = cursor.position;
            body.velocity = cursor.velocity;
        }
    }

    fn spawn_drops(&mut self, ctx: &FrameContext, dt: f32) {
        let shape = EmitterShape::Rect {
            min: self.canopy.min,
            max: self.canopy.max,
        };
        let kind = Self::kind_for(Season::from(ctx.season.stage));
        let drops = self.drops.tick(ctx.progress, dt);
        let twigs = self.litter.tick(ctx.progress, dt);
        let rng = &mut self.rng;
        emit(&mut self.pool, drops, |_| {
            let at = shape.sample(rng);
            make_pickup(rng, kind, at)
        });
        emit(&mut self.pool, twigs, |_| {
            let at = shape.sample(rng);
            make_pickup(rng, BodyKind::Twig, at)
        });
    }
}

fn make_pickup(rng: &mut SpawnContext, kind: BodyKind, at: Vec2) -> FreeBody {
    let body = FreeBody::new(kind, at)
        .with_phase(rng.random_phase())
        .with_spin(rng.random_phase(), rng.random_range(-0.05, 0.05));
    match kind {
        BodyKind::Apple => {
            let d = rng.random_range(11.0, 15.0);
            body.with_size(Vec2::splat(d)).with_color(Palette::Rot.stop(0).extend(1.0))
        }
        BodyKind::Flower => {
            let d = rng.random_range(8.0, 12.0);
            body.with_size(Vec2::new(d, d * 0.8))
                .with_color(Palette::Blossom.stop(0).extend(1.0))
        }
        _ => {
            let len = rng.random_range(16.0, 30.0);
            body.with_size(Vec2::new(len, rng.random_range(2.5, 4.0)))
                .with_color(Vec4::new(0.36, 0.25, 0.16, 1.0))
        }
    }
}

impl Subsystem for Pickups {
    fn id(&self) -> SubsystemId {
        SubsystemId::Pickups
    }

    fn update(&mut self, dt: f32, ctx: &FrameContext) {
        if self.muted {
            return;
        }

        if ctx.in_city() {
            if !self.retired {
                self.held = None;
                for body in self.pool.iter_mut() {
                    body.retire();
                }
                self.drops.reset();
                self.litter.reset();
                self.retired = true;
                log::debug!("pickups retiring at p={:.2}", ctx.progress);
            }
        } else {
            self.retired = false;
            self.spawn_drops(ctx, dt);
        }

        self.follow_cursor(ctx);
        step_pool(&mut self.pool, &self.profiles, ctx, dt);
    }

    fn set_muted(&mut self, muted: bool) {
        if muted {
            self.pool.clear();
            self.drops.reset();
            self.litter.reset();
            self.held = None;
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
