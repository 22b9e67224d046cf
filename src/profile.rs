//! Per-kind physical constants.
//!
//! Units are pixels and 60 Hz frames: a gravity scale of `1.0` adds
//! [`GRAVITY`] px/frame to the vertical velocity every frame. The numbers are
//! hand-tuned for the look of the scene and are kept as-is.

use crate::body::BodyKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Base downward acceleration, px/frame².
pub const GRAVITY: f32 = 0.5;

/// Vertical bounce speed below which a bounce is absorbed.
pub const BOUNCE_CUTOFF: f32 = 0.8;

/// Speed below which a grounded body comes to rest.
pub const SETTLE_EPSILON: f32 = 0.05;

/// Side-to-side motion added on top of wind.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Flutter {
    #[default]
    None,
    /// Falling-leaf sway: sinusoid of height and time, with a matching wobble in spin.
    Leaf { amplitude: f32, frequency: f32 },
    /// Slow lateral drift for rising smoke.
    Drift { amplitude: f32, frequency: f32 },
}

/// What happens when a body reaches the ground line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundResponse {
    /// Bounce with restitution and friction, then settle.
    #[default]
    Bounce,
    /// Die and report a splash point.
    Splash,
    /// Die silently.
    Vanish,
    /// Ignore the ground.
    Pass,
}

/// What happens at the left and right canvas edges.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WallResponse {
    /// Leave the canvas.
    #[default]
    None,
    /// Clamp and reflect horizontal velocity scaled by restitution.
    Bounce { restitution: f32 },
    /// Reappear on the opposite edge.
    Wrap,
}

/// Physical constants for one body kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalProfile {
    /// Multiplier on [`GRAVITY`]. Negative values rise.
    pub gravity_scale: f32,
    /// Cap on downward speed, px/frame. Zero disables the cap.
    pub terminal_vy: f32,
    /// Cap on upward speed, px/frame. Zero leaves rising bodies uncapped.
    pub rise_cap: f32,
    /// Per-frame velocity retention while airborne.
    pub air_drag: f32,
    /// Fraction of wind strength added to `vx` per frame.
    pub wind_susceptibility: f32,
    pub flutter: Flutter,
    /// Fraction of vertical speed kept on a bounce.
    pub restitution: f32,
    /// Per-frame horizontal velocity retention while touching the ground.
    pub ground_friction: f32,
    /// Per-frame angular velocity retention.
    pub rotational_damping: f32,
    /// How strongly ground contact couples `vx` into spin. Zero for non-round bodies.
    pub rolling_coupling: f32,
    /// Size growth, px/second (smoke puffs swell).
    pub growth: f32,
    pub ground: GroundResponse,
    pub walls: WallResponse,
}

impl Default for PhysicalProfile {
    fn default() -> Self {
        Self {
            gravity_scale: 1.0,
            terminal_vy: 12.0,
            rise_cap: 0.0,
            air_drag: 0.99,
            wind_susceptibility: 0.02,
            flutter: Flutter::None,
            restitution: 0.3,
            ground_friction: 0.8,
            rotational_damping: 0.97,
            rolling_coupling: 0.0,
            growth: 0.0,
            ground: GroundResponse::Bounce,
            walls: WallResponse::Bounce { restitution: 0.4 },
        }
    }
}

impl PhysicalProfile {
    /// Built-in constants for a kind.
    pub fn builtin(kind: BodyKind) -> Self {
        let base = Self::default();
        match kind {
            BodyKind::Leaf => Self {
                gravity_scale: 0.12,
                terminal_vy: 1.6,
                air_drag: 0.985,
                wind_susceptibility: 0.06,
                flutter: Flutter::Leaf { amplitude: 0.35, frequency: 2.7 },
                restitution: 0.1,
                ground_friction: 0.82,
                rotational_damping: 0.985,
                walls: WallResponse::Bounce { restitution: 0.3 },
                ..base
            },
            BodyKind::Apple => Self {
                gravity_scale: 1.0,
                terminal_vy: 14.0,
                air_drag: 0.995,
                wind_susceptibility: 0.005,
                restitution: 0.35,
                ground_friction: 0.9,
                rotational_damping: 0.97,
                rolling_coupling: 0.5,
                ..base
            },
            BodyKind::Flower => Self {
                gravity_scale: 0.35,
                terminal_vy: 3.5,
                air_drag: 0.99,
                wind_susceptibility: 0.03,
                flutter: Flutter::Leaf { amplitude: 0.12, frequency: 1.9 },
                restitution: 0.15,
                ground_friction: 0.8,
                rotational_damping: 0.98,
                ..base
            },
            BodyKind::Twig => Self {
                gravity_scale: 0.8,
                terminal_vy: 10.0,
                air_drag: 0.993,
                wind_susceptibility: 0.01,
                restitution: 0.25,
                ground_friction: 0.75,
                rotational_damping: 0.95,
                ..base
            },
            BodyKind::Raindrop => Self {
                gravity_scale: 1.2,
                terminal_vy: 18.0,
                air_drag: 1.0,
                wind_susceptibility: 0.12,
                restitution: 0.0,
                ground: GroundResponse::Splash,
                walls: WallResponse::None,
                ..base
            },
            BodyKind::Splash => Self {
                gravity_scale: 0.6,
                terminal_vy: 8.0,
                air_drag: 0.97,
                wind_susceptibility: 0.02,
                restitution: 0.0,
                ground: GroundResponse::Vanish,
                walls: WallResponse::None,
                ..base
            },
            BodyKind::Smoke => Self {
                gravity_scale: -0.04,
                terminal_vy: 3.0,
                rise_cap: 3.0,
                air_drag: 0.98,
                wind_susceptibility: 0.08,
                flutter: Flutter::Drift { amplitude: 0.2, frequency: 1.2 },
                rotational_damping: 0.99,
                growth: 14.0,
                ground: GroundResponse::Pass,
                walls: WallResponse::None,
                ..base
            },
            BodyKind::Spark => Self {
                gravity_scale: 0.7,
                terminal_vy: 12.0,
                air_drag: 0.96,
                wind_susceptibility: 0.01,
                restitution: 0.3,
                ground_friction: 0.6,
                walls: WallResponse::None,
                ..base
            },
            BodyKind::WreckFragment => Self {
                gravity_scale: 1.0,
                terminal_vy: 16.0,
                air_drag: 0.99,
                wind_susceptibility: 0.005,
                restitution: 0.3,
                ground_friction: 0.7,
                rotational_damping: 0.96,
                ..base
            },
            BodyKind::Cloud => Self {
                gravity_scale: 0.0,
                terminal_vy: 0.0,
                air_drag: 1.0,
                wind_susceptibility: 0.0,
                restitution: 0.0,
                rotational_damping: 1.0,
                ground: GroundResponse::Pass,
                walls: WallResponse::Wrap,
                ..base
            },
        }
    }
}

/// Profile lookup keyed by [`BodyKind`].
///
/// Overrides win; kinds without an override fall back to
/// [`PhysicalProfile::builtin`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileTable {
    overrides: HashMap<BodyKind, PhysicalProfile>,
}

impl ProfileTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, kind: BodyKind, profile: PhysicalProfile) -> Self {
        self.overrides.insert(kind, profile);
        self
    }

    pub fn set(&mut self, kind: BodyKind, profile: PhysicalProfile) {
        self.overrides.insert(kind, profile);
    }

    pub fn get(&self, kind: BodyKind) -> PhysicalProfile {
        self.overrides
            .get(&kind)
            .copied()
            .unwrap_or_else(|| PhysicalProfile::builtin(kind))
    }

    pub fn is_overridden(&self, kind: BodyKind) -> bool {
        self.overrides.contains_key(&kind)
    }
}
