//! Rate-based and burst emission.
//!
//! A [`RateEmitter`] turns a rate (bodies per second) into whole spawns with
//! a fractional accumulator:
//!
//! ```text
//! accumulator += rate(progress) * dt
//! while accumulator >= 1 { spawn; accumulator -= 1 }
//! ```
//!
//! Discrete events skip the accumulator and call [`emit`] with a fixed count.
//! Either way, bodies go through [`BodyPool::push`] so the pool cap holds.
//!
//! # Emitter Shapes
//!
//! | Shape | Description |
//! |-------|-------------|
//! | [`EmitterShape::Point`] | Single spawn point |
//! | [`EmitterShape::Rect`] | Uniform within a rectangle |
//! | [`EmitterShape::Line`] | Uniform along a segment (sky edge, chimney mouth) |

use crate::body::FreeBody;
use crate::curve::RateCurve;
use crate::pool::BodyPool;
use crate::spawn::SpawnContext;
use glam::Vec2;

/// Where new bodies appear.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EmitterShape {
    Point(Vec2),
    Rect { min: Vec2, max: Vec2 },
    Line { from: Vec2, to: Vec2 },
}

impl EmitterShape {
    /// Random spawn position on this shape.
    pub fn sample(&self, rng: &mut SpawnContext) -> Vec2 {
        match *self {
            EmitterShape::Point(p) => p,
            EmitterShape::Rect { min, max } => rng.random_in_rect(min, max),
            EmitterShape::Line { from, to } => from.lerp(to, rng.random()),
        }
    }

    /// Whether `p` lies on or inside the shape's bounding box.
    pub fn contains(&self, p: Vec2) -> bool {
        let (min, max) = match *self {
            EmitterShape::Point(q) => (q, q),
            EmitterShape::Rect { min, max } => (min, max),
            EmitterShape::Line { from, to } => (from.min(to), from.max(to)),
        };
        p.cmpge(min).all() && p.cmple(max).all()
    }
}

/// Fractional spawn accumulator driven by a [`RateCurve`].
#[derive(Clone, Debug)]
pub struct RateEmitter {
    curve: RateCurve,
    accumulator: f32,
    /// Upper bound on spawns in one frame, so a long stall cannot flood the pool.
    max_per_frame: usize,
}

impl RateEmitter {
    pub fn new(curve: RateCurve) -> Self {
        Self {
            curve,
            accumulator: 0.0,
            max_per_frame: 64,
        }
    }

    pub fn with_max_per_frame(mut self, max: usize) -> Self {
        self.max_per_frame = max.max(1);
        self
    }

    pub fn curve(&self) -> &RateCurve {
        &self.curve
    }

    /// Current rate at progress `p`, bodies per second.
    #[inline]
    pub fn rate(&self, p: f32) -> f32 {
        self.curve.rate(p)
    }

    #[inline]
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Accumulate for one frame at progress `p`; returns how many to spawn.
    pub fn tick(&mut self, p: f32, dt: f32) -> usize {
        let rate = self.curve.rate(p);
        self.tick_rate(rate, dt)
    }

    /// Accumulate for one frame at an explicit rate.
    pub fn tick_rate(&mut self, rate: f32, dt: f32) -> usize {
        if !(rate > 0.0) || !(dt > 0.0) {
            return 0;
        }
        self.accumulator += rate * dt;
        let mut count = 0;
        while self.accumulator >= 1.0 && count < self.max_per_frame {
            self.accumulator -= 1.0;
            count += 1;
        }
        if count == self.max_per_frame {
            self.accumulator = self.accumulator.min(1.0);
        }
        count
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Insert `count` bodies built by `make`, respecting the pool cap.
///
/// Returns how many were stored.
pub fn emit(pool: &mut BodyPool, count: usize, mut make: impl FnMut(usize) -> FreeBody) -> usize {
    (0..count).filter(|&i| pool.push(make(i)).stored()).count()
}
