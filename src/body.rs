//! Free-body state shared by every simulated category.
//!
//! Leaves, fruit, raindrops, smoke puffs and wreckage all use the same
//! [`FreeBody`] shape; what differs is the [`BodyKind`] tag, which selects a
//! physical profile and a draw style.

use crate::lifecycle::Lifecycle;
use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

/// Kind tag selecting physical constants and visuals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Leaf,
    Apple,
    Flower,
    Twig,
    Raindrop,
    Splash,
    Smoke,
    Spark,
    WreckFragment,
    Cloud,
}

impl BodyKind {
    /// Every kind, in declaration order.
    pub const ALL: [BodyKind; 10] = [
        BodyKind::Leaf,
        BodyKind::Apple,
        BodyKind::Flower,
        BodyKind::Twig,
        BodyKind::Raindrop,
        BodyKind::Splash,
        BodyKind::Smoke,
        BodyKind::Spark,
        BodyKind::WreckFragment,
        BodyKind::Cloud,
    ];

    /// Kinds that can be picked up and dragged.
    pub fn is_pickup(self) -> bool {
        matches!(self, BodyKind::Apple | BodyKind::Flower | BodyKind::Twig)
    }
}

/// Where a body is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Integrated every frame.
    #[default]
    Airborne,
    /// Resting on the ground, velocity zeroed, skipped by the integrator.
    Settled,
    /// Held by the cursor.
    Dragging,
    /// Fading out because its scene is going away.
    Retiring,
    /// Waiting for removal.
    Dead,
}

/// Per-body render state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualState {
    /// Full width and height in pixels.
    pub size: Vec2,
    /// Base RGBA color before brightness and alpha.
    pub color: Vec4,
    /// Brightness multiplier.
    pub brightness: f32,
    /// Current decay-sequence stage.
    pub stage: u8,
    /// Opacity, `[0, 1]`.
    pub alpha: f32,
    /// Squash/stretch pulse, `1` right after a stage change decaying to `0`.
    pub pulse: f32,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            size: Vec2::splat(8.0),
            color: Vec4::ONE,
            brightness: 1.0,
            stage: 0,
            alpha: 1.0,
            pulse: 0.0,
        }
    }
}

/// A single simulated particle.
#[derive(Clone, Debug, PartialEq)]
pub struct FreeBody {
    pub kind: BodyKind,
    /// Canvas coordinates, y grows downward.
    pub position: Vec2,
    /// Pixels per 60 Hz frame.
    pub velocity: Vec2,
    /// Radians.
    pub rotation: f32,
    /// Radians per 60 Hz frame.
    pub angular_velocity: f32,
    pub visual: VisualState,
    pub state: LifecycleState,
    /// Seconds since spawn.
    pub age: f32,
    /// Seconds spent retiring.
    pub retire_age: f32,
    pub lifecycle: Lifecycle,
    /// Per-body offset for flutter and gust variation.
    pub phase: f32,
    /// Touched the ground on the last step.
    pub grounded: bool,
    /// Spawn order within the owning pool.
    pub serial: u64,
}

impl FreeBody {
    /// New airborne body with the kind's lifecycle preset.
    pub fn new(kind: BodyKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            visual: VisualState::default(),
            state: LifecycleState::Airborne,
            age: 0.0,
            retire_age: 0.0,
            lifecycle: Lifecycle::preset(kind),
            phase: 0.0,
            grounded: false,
            serial: 0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.visual.size = size;
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.visual.color = color;
        self
    }

    pub fn with_spin(mut self, rotation: f32, angular_velocity: f32) -> Self {
        self.rotation = rotation;
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Distance from the center to the bottom edge.
    #[inline]
    pub fn half_height(&self) -> f32 {
        self.visual.size.y * 0.5
    }

    /// Radius used for rolling and grab tests.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.visual.size.max_element() * 0.5
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state != LifecycleState::Dead
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.state == LifecycleState::Settled
    }

    /// Airborne or retiring bodies still moving under physics.
    #[inline]
    pub fn is_falling(&self) -> bool {
        matches!(self.state, LifecycleState::Airborne | LifecycleState::Retiring) && !self.grounded
    }

    /// Push the body back into flight. Dead, dragged and retiring bodies keep their state.
    pub fn wake(&mut self) {
        if self.state == LifecycleState::Settled {
            self.state = LifecycleState::Airborne;
        }
        self.grounded = false;
    }

    /// Start fading out for a scene change.
    pub fn retire(&mut self) {
        if matches!(
            self.state,
            LifecycleState::Airborne | LifecycleState::Settled | LifecycleState::Dragging
        ) {
            self.state = LifecycleState::Retiring;
            self.retire_age = 0.0;
        }
    }

    pub fn kill(&mut self) {
        self.state = LifecycleState::Dead;
        self.visual.alpha = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_body_defaults() {
        let b = FreeBody::new(BodyKind::Apple, Vec2::new(10.0, 20.0));
        assert_eq!(b.state, LifecycleState::Airborne);
        assert_eq!(b.visual.alpha, 1.0);
        assert_eq!(b.age, 0.0);
        assert!(b.is_alive());
    }

    #[test]
    fn test_wake_only_lifts_settled() {
        let mut b = FreeBody::new(BodyKind::Leaf, Vec2::ZERO);
        b.state = LifecycleState::Settled;
        b.wake();
        assert_eq!(b.state, LifecycleState::Airborne);

        b.state = LifecycleState::Dragging;
        b.wake();
        assert_eq!(b.state, LifecycleState::Dragging);
    }

    #[test]
    fn test_retire_skips_dead() {
        let mut b = FreeBody::new(BodyKind::Leaf, Vec2::ZERO);
        b.kill();
        b.retire();
        assert_eq!(b.state, LifecycleState::Dead);
    }

    #[test]
    fn test_pickup_kinds() {
        assert!(BodyKind::Apple.is_pickup());
        assert!(BodyKind::Twig.is_pickup());
        assert!(!BodyKind::Leaf.is_pickup());
        assert!(!BodyKind::Smoke.is_pickup());
    }
}
