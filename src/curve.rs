//! Piecewise emission-rate curves keyed by progress.
//!
//! A [`RateCurve`] is a [`StageMap`] with a `(from, to)` level per stage;
//! inside a stage the level is blended with the eased intra-stage `t`. This
//! keeps every density band on the same smoothstep ease as the visual layers.

use crate::stage::{StageMap, StageSample};

/// Level at the start and end of one band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub from: f32,
    pub to: f32,
}

impl Band {
    pub const fn new(from: f32, to: f32) -> Self {
        Self { from, to }
    }

    pub const fn flat(level: f32) -> Self {
        Self { from: level, to: level }
    }
}

/// Rate (bodies per second) as a function of progress.
#[derive(Clone, Debug, PartialEq)]
pub struct RateCurve {
    map: StageMap,
    bands: Vec<Band>,
}

impl RateCurve {
    /// Build a curve from a stage map and one band per stage.
    ///
    /// Missing bands repeat the last one; surplus bands are ignored.
    pub fn new(map: StageMap, bands: &[Band]) -> Self {
        let last = bands.last().copied().unwrap_or(Band::flat(0.0));
        let bands = (0..map.stage_count())
            .map(|i| bands.get(i).copied().unwrap_or(last))
            .collect();
        Self { map, bands }
    }

    /// A curve that emits nothing.
    pub fn zero() -> Self {
        Self::new(StageMap::uniform(1), &[Band::flat(0.0)])
    }

    /// Rain: dry start, drizzle build, peak band, taper to a trickle.
    pub fn rain() -> Self {
        Self::new(
            StageMap::with_thresholds(&[0.05, 0.30, 0.55, 0.90]),
            &[
                Band::flat(0.0),
                Band::new(0.0, 420.0),
                Band::flat(420.0),
                Band::new(420.0, 10.0),
                Band::flat(10.0),
            ],
        )
    }

    /// Falling leaves across the Full/Mid1/Mid2/Bare seasons.
    pub fn leaves() -> Self {
        Self::new(
            StageMap::quarters(),
            &[
                Band::flat(0.5),
                Band::new(0.5, 12.0),
                Band::new(12.0, 30.0),
                Band::new(30.0, 4.0),
            ],
        )
    }

    /// Litter and twigs: density rises from stage 1 onward.
    pub fn litter() -> Self {
        Self::new(
            StageMap::thirds(),
            &[Band::flat(0.0), Band::new(0.0, 1.5), Band::new(1.5, 3.0)],
        )
    }

    /// Fruit and flowers dropping on their own.
    pub fn pickups() -> Self {
        Self::new(
            StageMap::quarters(),
            &[
                Band::new(0.1, 0.3),
                Band::new(0.3, 0.6),
                Band::new(0.6, 0.2),
                Band::flat(0.0),
            ],
        )
    }

    /// Chimney smoke: nothing before `threshold`, ramping up after it.
    pub fn chimney(threshold: f32) -> Self {
        Self::new(
            StageMap::with_thresholds(&[threshold]),
            &[Band::flat(0.0), Band::new(2.0, 14.0)],
        )
    }

    /// Stage sample for `p` on this curve's own map.
    #[inline]
    pub fn sample(&self, p: f32) -> StageSample {
        self.map.sample(p)
    }

    /// Rate at progress `p`.
    pub fn rate(&self, p: f32) -> f32 {
        let s = self.map.sample(p);
        let band = self.bands[s.stage];
        s.blend(band.from, band.to)
    }

    /// Largest level any band reaches.
    pub fn peak(&self) -> f32 {
        self.bands
            .iter()
            .map(|b| b.from.max(b.to))
            .fold(0.0, f32::max)
    }
}
