//! Per-category subsystems.
//!
//! Each subsystem exclusively owns its pools and exposes a single
//! `update(dt, ctx)` entry point that the scene calls once per frame in a
//! fixed order. Nothing here reads another subsystem's pool; cross-category
//! influence (wash, gusts, cursor) goes through the pure functions in
//! [`crate::forces`] applied by the owner.

pub mod clouds;
pub mod leaves;
pub mod pickups;
pub mod rain;
pub mod smoke;
pub mod trees;
pub mod wreckage;

pub use clouds::Clouds;
pub use leaves::Leaves;
pub use pickups::Pickups;
pub use rain::Rain;
pub use smoke::Smoke;
pub use trees::{Tree, TreeStand};
pub use wreckage::Wreckage;

use crate::context::FrameContext;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifies a subsystem for muting and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsystemId {
    Clouds,
    Rain,
    Leaves,
    Pickups,
    Wreckage,
    Smoke,
}

impl SubsystemId {
    /// Update order within a frame.
    pub const ORDER: [SubsystemId; 6] = [
        SubsystemId::Clouds,
        SubsystemId::Rain,
        SubsystemId::Leaves,
        SubsystemId::Pickups,
        SubsystemId::Wreckage,
        SubsystemId::Smoke,
    ];
}

/// One simulated category.
pub trait Subsystem {
    fn id(&self) -> SubsystemId;

    /// Advance one frame. Muted subsystems return immediately.
    fn update(&mut self, dt: f32, ctx: &FrameContext);

    /// Muting clears every pool; while muted nothing spawns or moves.
    fn set_muted(&mut self, muted: bool);

    fn is_muted(&self) -> bool;

    /// Live bodies across all of this subsystem's pools.
    fn live_count(&self) -> usize;
}

/// A large moving object: pushes nearby bodies and leaves exhaust.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub position: Vec2,
    /// Pixels per 60 Hz frame.
    pub velocity: Vec2,
    /// Exhaust pipe relative to `position`.
    pub exhaust: Vec2,
    /// Reach of the wash impulse.
    pub wash_radius: f32,
    /// Exhaust puffs per second.
    pub exhaust_rate: f32,
}

impl Vehicle {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            exhaust: Vec2::new(-40.0, -30.0),
            wash_radius: 140.0,
            exhaust_rate: 18.0,
        }
    }

    pub fn with_exhaust(mut self, offset: Vec2, rate: f32) -> Self {
        self.exhaust = offset;
        self.exhaust_rate = rate.max(0.0);
        self
    }

    pub fn with_wash_radius(mut self, radius: f32) -> Self {
        self.wash_radius = radius.max(0.0);
        self
    }

    #[inline]
    pub fn exhaust_point(&self) -> Vec2 {
        self.position + self.exhaust
    }

    /// Move along `velocity` for `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt * 60.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_moves_per_frame() {
        let mut v = Vehicle::new(Vec2::ZERO, Vec2::new(2.0, 0.0));
        v.advance(1.0 / 60.0);
        assert!((v.position.x - 2.0).abs() < 1e-5);
        assert_eq!(v.exhaust_point(), Vec2::new(-38.0, -30.0));
    }

    #[test]
    fn test_order_lists_each_once() {
        let mut seen = std::collections::HashSet::new();
        for id in SubsystemId::ORDER {
            assert!(seen.insert(id));
        }
    }
}
