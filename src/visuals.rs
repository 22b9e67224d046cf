//! Draw styles for free bodies.
//!
//! This module decides how a body looks, separate from the physical profile
//! that decides how it moves. Each [`BodyKind`] maps to a [`Style`] (shape,
//! blend mode, contact shadow) and colors come from small five-stop
//! [`Palette`]s sampled by season, decay stage or weather.
//!
//! # Usage
//!
//! ```
//! use forestfall::body::BodyKind;
//! use forestfall::visuals::{BodyShape, Palette, Style};
//!
//! let style = Style::for_kind(BodyKind::Raindrop);
//! assert_eq!(style.shape, BodyShape::Streak);
//!
//! let autumn = Palette::Foliage.sample(0.6);
//! assert!(autumn.x > autumn.z);
//! ```

use crate::body::{BodyKind, FreeBody};
use glam::{Vec3, Vec4};

/// Pre-defined color ramps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// Leaves from summer green through yellow and orange to dry brown.
    Foliage,
    /// Fruit rot stages: ripe red to black.
    Rot,
    /// Flower wilt stages: pink to papery tan.
    Blossom,
    /// Sky from clear day through overcast to city dusk.
    Sky,
    /// Cloud body from white to storm grey.
    Storm,
    /// Smoke from pale exhaust to brown smog.
    Smog,
}

impl Palette {
    /// The five color stops of this palette.
    pub fn colors(&self) -> [Vec3; 5] {
        match self {
            Palette::Foliage => [
                Vec3::new(0.30, 0.55, 0.20), // Summer green
                Vec3::new(0.62, 0.66, 0.18), // Turning
                Vec3::new(0.92, 0.68, 0.15), // Yellow
                Vec3::new(0.85, 0.38, 0.12), // Orange
                Vec3::new(0.48, 0.30, 0.16), // Dry brown
            ],
            Palette::Rot => [
                Vec3::new(0.80, 0.12, 0.10),
                Vec3::new(0.62, 0.16, 0.10),
                Vec3::new(0.42, 0.22, 0.10),
                Vec3::new(0.22, 0.14, 0.08),
                Vec3::new(0.12, 0.09, 0.06),
            ],
            Palette::Blossom => [
                Vec3::new(0.98, 0.70, 0.80),
                Vec3::new(0.92, 0.66, 0.70),
                Vec3::new(0.80, 0.62, 0.55),
                Vec3::new(0.66, 0.56, 0.44),
                Vec3::new(0.55, 0.48, 0.38),
            ],
            Palette::Sky => [
                Vec3::new(0.62, 0.80, 0.95),
                Vec3::new(0.70, 0.76, 0.82),
                Vec3::new(0.52, 0.56, 0.62),
                Vec3::new(0.40, 0.40, 0.46),
                Vec3::new(0.20, 0.18, 0.24),
            ],
            Palette::Storm => [
                Vec3::new(0.98, 0.98, 1.00),
                Vec3::new(0.86, 0.88, 0.90),
                Vec3::new(0.70, 0.72, 0.76),
                Vec3::new(0.52, 0.54, 0.58),
                Vec3::new(0.36, 0.37, 0.40),
            ],
            Palette::Smog => [
                Vec3::new(0.82, 0.82, 0.82),
                Vec3::new(0.70, 0.69, 0.66),
                Vec3::new(0.58, 0.55, 0.50),
                Vec3::new(0.48, 0.43, 0.36),
                Vec3::new(0.38, 0.33, 0.27),
            ],
        }
    }

    /// Linear interpolation across the stops; `t` is clamped to `[0, 1]`.
    pub fn sample(&self, t: f32) -> Vec3 {
        let stops = self.colors();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (stops.len() - 1) as f32;
        let i = (scaled.floor() as usize).min(stops.len() - 2);
        stops[i].lerp(stops[i + 1], scaled - i as f32)
    }

    /// The stop for a discrete stage, clamped to the last stop.
    pub fn stop(&self, index: usize) -> Vec3 {
        let stops = self.colors();
        stops[index.min(stops.len() - 1)]
    }
}

/// How colors combine with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source-over alpha blending (default).
    #[default]
    Alpha,
    /// Colors add up and saturate. Used for sparks.
    Additive,
}

/// Silhouette a body is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyShape {
    /// Rotated ellipse of the body's size.
    #[default]
    Ellipse,
    /// Round body; rotation is invisible so settled ones skip it.
    Circle,
    /// Line along the velocity (rain).
    Streak,
    /// Rotated rectangle (twigs, wreckage).
    Shard,
    /// Soft feathered disc (smoke, clouds).
    Puff,
}

/// Per-kind drawing rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub shape: BodyShape,
    pub blend: BlendMode,
    /// Soft edge fraction passed to the canvas.
    pub feather: f32,
    /// Draw a contact shadow while resting.
    pub shadow: bool,
    /// Squash amount applied by the decay-stage pulse.
    pub squash: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            shape: BodyShape::Ellipse,
            blend: BlendMode::Alpha,
            feather: 0.0,
            shadow: false,
            squash: 0.0,
        }
    }
}

impl Style {
    pub fn for_kind(kind: BodyKind) -> Self {
        let base = Self::default();
        match kind {
            BodyKind::Leaf => Self {
                feather: 0.15,
                shadow: true,
                ..base
            },
            BodyKind::Apple => Self {
                shape: BodyShape::Circle,
                feather: 0.1,
                shadow: true,
                squash: 0.25,
                ..base
            },
            BodyKind::Flower => Self {
                feather: 0.2,
                shadow: true,
                squash: 0.2,
                ..base
            },
            BodyKind::Twig | BodyKind::WreckFragment => Self {
                shape: BodyShape::Shard,
                shadow: true,
                ..base
            },
            BodyKind::Raindrop => Self {
                shape: BodyShape::Streak,
                ..base
            },
            BodyKind::Splash => Self {
                shape: BodyShape::Circle,
                feather: 0.3,
                ..base
            },
            BodyKind::Smoke | BodyKind::Cloud => Self {
                shape: BodyShape::Puff,
                feather: 0.6,
                ..base
            },
            BodyKind::Spark => Self {
                shape: BodyShape::Circle,
                blend: BlendMode::Additive,
                feather: 0.5,
                ..base
            },
        }
    }
}

/// Final RGBA for a body: decay-stage color, brightness and alpha applied.
pub fn tint(body: &FreeBody) -> Vec4 {
    let stage = body.visual.stage as usize;
    let rgb = match body.kind {
        BodyKind::Apple if body.lifecycle.has_decay() => Palette::Rot.stop(stage),
        BodyKind::Flower if body.lifecycle.has_decay() => Palette::Blossom.stop(stage),
        _ => body.visual.color.truncate(),
    };
    (rgb * body.visual.brightness)
        .clamp(Vec3::ZERO, Vec3::ONE)
        .extend((body.visual.color.w * body.visual.alpha).clamp(0.0, 1.0))
}

/// Sky clear color at progress `p`.
pub fn sky_color(progress: f32) -> Vec4 {
    Palette::Sky.sample(progress).extend(1.0)
}
