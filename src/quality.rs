//! Adaptive quality control.
//!
//! Under load the scene trades fidelity for frame time instead of failing:
//! an exponential moving average of measured frame time drives a quality
//! scalar in `[0, 1]`, and the offscreen smoke layer's resolution and rebuild
//! cadence are derived from it.

/// Frame budget controller.
#[derive(Clone, Debug, PartialEq)]
pub struct QualityController {
    budget_ms: f32,
    average_ms: f32,
    quality: f32,
    /// Step applied when over budget.
    step_down: f32,
    /// Step applied when comfortably under budget.
    step_up: f32,
    /// EMA weight of the newest sample.
    smoothing: f32,
    samples: u64,
}

impl QualityController {
    /// Controller targeting `budget_ms` per frame, starting at full quality.
    pub fn new(budget_ms: f32) -> Self {
        Self {
            budget_ms: budget_ms.max(1.0),
            average_ms: 0.0,
            quality: 1.0,
            step_down: 0.05,
            step_up: 0.02,
            smoothing: 0.1,
            samples: 0,
        }
    }

    #[inline]
    pub fn quality(&self) -> f32 {
        self.quality
    }

    #[inline]
    pub fn average_ms(&self) -> f32 {
        self.average_ms
    }

    #[inline]
    pub fn budget_ms(&self) -> f32 {
        self.budget_ms
    }

    /// Feed one measured frame time. Returns the new quality.
    pub fn observe(&mut self, frame_ms: f32) -> f32 {
        if !frame_ms.is_finite() || frame_ms < 0.0 {
            return self.quality;
        }
        self.average_ms = if self.samples == 0 {
            frame_ms
        } else {
            self.average_ms + (frame_ms - self.average_ms) * self.smoothing
        };
        self.samples += 1;

        let before = self.quality;
        if self.average_ms > self.budget_ms * 1.15 {
            self.quality = (self.quality - self.step_down).max(0.0);
        } else if self.average_ms < self.budget_ms * 0.85 {
            self.quality = (self.quality + self.step_up).min(1.0);
        }
        if (before >= 0.5) != (self.quality >= 0.5) {
            log::debug!(
                "quality crossed half budget: {:.2} -> {:.2} (avg {:.1}ms)",
                before,
                self.quality,
                self.average_ms
            );
        }
        self.quality
    }

    /// Offscreen layer resolution as a fraction of the canvas.
    ///
    /// Stepped to three tiers so a drifting quality does not reallocate the
    /// layer every frame.
    pub fn layer_scale(&self) -> f32 {
        let tier = (self.quality * 2.0).round() * 0.5;
        0.25 + 0.25 * tier
    }

    /// Rebuild the offscreen layer every this many frames.
    pub fn layer_cadence(&self) -> u64 {
        if self.quality >= 0.5 {
            1
        } else {
            2
        }
    }

    /// Whether frame `frame` should rebuild the offscreen layer.
    pub fn should_rebuild(&self, frame: u64) -> bool {
        frame % self.layer_cadence() == 0
    }
}

impl Default for QualityController {
    fn default() -> Self {
        Self::new(1000.0 / 60.0)
    }
}
