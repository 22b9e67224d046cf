//! Progress-to-stage mapping.
//!
//! Every scroll-reactive piece of the scene reads the same progress scalar
//! `p ∈ [0, 1]` and turns it into a discrete stage index plus an eased blend
//! inside that stage. The mapping is pure: the same `p` always yields the same
//! [`StageSample`].
//!
//! # Example
//!
//! ```
//! use forestfall::stage::{StageMap, Season};
//!
//! let seasons = StageMap::quarters();
//! let s = seasons.sample(0.6);
//! assert_eq!(Season::from(s.stage), Season::Mid2);
//! assert!(s.eased > 0.0 && s.eased < 1.0);
//! ```

/// Hermite ease `t²(3 - 2t)`, clamped to `[0, 1]`.
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Clamp a progress value into `[0, 1]`, mapping NaN to `0`.
#[inline]
pub fn clamp_progress(p: f32) -> f32 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Result of mapping a progress value onto a [`StageMap`].
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct StageSample {
    /// Stage index, `0..stage_count`.
    pub stage: usize,
    /// Linear position inside the stage, `[0, 1]`.
    pub t: f32,
    /// Smoothstep-eased `t`. This is what consumers blend with.
    pub eased: f32,
}

impl StageSample {
    /// Continuous position across all stages: `stage + eased`.
    ///
    /// At a boundary the left segment at `t = 1` and the right segment at
    /// `t = 0` yield the same value.
    #[inline]
    pub fn position(&self) -> f32 {
        self.stage as f32 + self.eased
    }

    /// Blend between two per-stage values using the eased `t`.
    #[inline]
    pub fn blend(&self, from: f32, to: f32) -> f32 {
        from + (to - from) * self.eased
    }
}

/// Partition of `[0, 1]` into consecutive stages.
///
/// Stores the inner boundaries only; `[0.25, 0.5, 0.75]` describes four
/// stages. Boundaries must be strictly increasing and inside `(0, 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct StageMap {
    bounds: Vec<f32>,
}

impl StageMap {
    /// Three equal stages: `[0, 1/3)`, `[1/3, 2/3)`, `[2/3, 1]`.
    pub fn thirds() -> Self {
        Self::uniform(3)
    }

    /// Four equal stages, used for the Full/Mid1/Mid2/Bare season sequence.
    pub fn quarters() -> Self {
        Self::uniform(4)
    }

    /// `count` stages of equal width. A count of zero is treated as one.
    pub fn uniform(count: usize) -> Self {
        let count = count.max(1);
        let bounds = (1..count).map(|i| i as f32 / count as f32).collect();
        Self { bounds }
    }

    /// Stages split at arbitrary inner boundaries.
    ///
    /// Out-of-range or non-increasing boundaries are dropped.
    pub fn with_thresholds(thresholds: &[f32]) -> Self {
        let mut bounds: Vec<f32> = Vec::with_capacity(thresholds.len());
        for &b in thresholds {
            if !(b > 0.0 && b < 1.0) {
                continue;
            }
            if bounds.last().map_or(true, |&last| b > last) {
                bounds.push(b);
            }
        }
        Self { bounds }
    }

    /// Number of stages.
    #[inline]
    pub fn stage_count(&self) -> usize {
        self.bounds.len() + 1
    }

    /// Start and end of a stage in progress space.
    pub fn stage_range(&self, stage: usize) -> (f32, f32) {
        let stage = stage.min(self.bounds.len());
        let start = if stage == 0 { 0.0 } else { self.bounds[stage - 1] };
        let end = self.bounds.get(stage).copied().unwrap_or(1.0);
        (start, end)
    }

    /// Map progress to `(stage, t, eased)`.
    pub fn sample(&self, p: f32) -> StageSample {
        let p = clamp_progress(p);
        let stage = self.bounds.iter().take_while(|&&b| p >= b).count();
        let (start, end) = self.stage_range(stage);
        let width = end - start;
        let t = if width > 0.0 {
            ((p - start) / width).clamp(0.0, 1.0)
        } else {
            0.0
        };
        StageSample {
            stage,
            t,
            eased: smoothstep(t),
        }
    }
}

impl Default for StageMap {
    fn default() -> Self {
        Self::thirds()
    }
}

/// Named forest seasons for a four-stage map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Season {
    Full,
    Mid1,
    Mid2,
    Bare,
}

impl From<usize> for Season {
    fn from(stage: usize) -> Self {
        match stage {
            0 => Season::Full,
            1 => Season::Mid1,
            2 => Season::Mid2,
            _ => Season::Bare,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert_eq!(smoothstep(-2.0), 0.0);
        assert_eq!(smoothstep(3.0), 1.0);
    }

    #[test]
    fn test_thirds_partition() {
        let map = StageMap::thirds();
        assert_eq!(map.stage_count(), 3);
        assert_eq!(map.sample(0.0).stage, 0);
        assert_eq!(map.sample(0.2).stage, 0);
        assert_eq!(map.sample(0.5).stage, 1);
        assert_eq!(map.sample(0.9).stage, 2);
        assert_eq!(map.sample(1.0).stage, 2);
        assert_eq!(map.sample(1.0).t, 1.0);
    }

    #[test]
    fn test_sample_is_pure() {
        let map = StageMap::quarters();
        for i in 0..=100 {
            let p = i as f32 / 100.0;
            assert_eq!(map.sample(p), map.sample(p));
        }
    }

    #[test]
    fn test_boundary_continuity() {
        let map = StageMap::thirds();
        for &b in &[1.0 / 3.0, 2.0 / 3.0] {
            let left = map.sample(b - 1e-5);
            let right = map.sample(b);
            assert!((left.position() - right.position()).abs() < 1e-3);
            assert_eq!(right.eased, 0.0);
        }
    }

    #[test]
    fn test_out_of_range_progress_clamps() {
        let map = StageMap::thirds();
        assert_eq!(map.sample(-1.0), map.sample(0.0));
        assert_eq!(map.sample(7.0), map.sample(1.0));
        assert_eq!(map.sample(f32::NAN), map.sample(0.0));
    }

    #[test]
    fn test_custom_thresholds_drop_invalid() {
        let map = StageMap::with_thresholds(&[0.5, 0.2, 0.7, 1.5, 0.0]);
        assert_eq!(map.stage_count(), 3);
        assert_eq!(map.stage_range(1), (0.5, 0.7));
    }

    #[test]
    fn test_season_from_stage() {
        assert_eq!(Season::from(0), Season::Full);
        assert_eq!(Season::from(3), Season::Bare);
        assert_eq!(Season::from(9), Season::Bare);
    }
}
