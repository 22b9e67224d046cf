//! Body lifetimes: fade-out, decay sequences and retirement.
//!
//! A [`Lifecycle`] is plain configuration; the integrator evaluates it against
//! a body's age every frame.
//!
//! | Phase | Driven by |
//! |-------|-----------|
//! | Decay stage | `age` crossing `stage_times` boundaries |
//! | Fade-out | `age` past `fade_start`, linear over `fade_duration` |
//! | Retirement | `retire_age` since a scene change, linear over `retire_duration` |
//!
//! # Example
//!
//! ```
//! use forestfall::lifecycle::Lifecycle;
//!
//! let rot = Lifecycle::new()
//!     .decay_stages([0.0, 5.0, 10.0, 15.0])
//!     .fade_after(20.0)
//!     .fade_over(2.0);
//!
//! assert_eq!(rot.stage_at(7.0), 1);
//! assert_eq!(rot.alpha_at(22.0), 0.0);
//! ```

use crate::body::BodyKind;

/// Seconds a squash/stretch pulse lasts after a decay stage change.
pub const PULSE_DURATION: f32 = 0.35;

/// Lifetime configuration for one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lifecycle {
    /// Age at which fading begins. `None` never fades.
    fade_start: Option<f32>,
    /// Seconds from fully opaque to invisible.
    fade_duration: f32,
    /// Age thresholds of each decay stage; the first is normally zero.
    stage_times: Option<[f32; 4]>,
    /// Seconds a retiring body takes to vanish.
    retire_duration: f32,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            fade_start: None,
            fade_duration: 1.0,
            stage_times: None,
            retire_duration: 1.2,
        }
    }
}

impl Lifecycle {
    /// Immortal, no decay sequence.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // BUILDER
    // =========================================================================

    /// Begin fading once the body is `seconds` old.
    pub fn fade_after(mut self, seconds: f32) -> Self {
        self.fade_start = Some(seconds.max(0.0));
        self
    }

    /// Fade duration. Clamped to a small positive value.
    pub fn fade_over(mut self, seconds: f32) -> Self {
        self.fade_duration = seconds.max(1e-3);
        self
    }

    /// Decay sequence boundaries `[0, t1, t2, t3]`.
    pub fn decay_stages(mut self, times: [f32; 4]) -> Self {
        self.stage_times = Some(times);
        self
    }

    pub fn retire_over(mut self, seconds: f32) -> Self {
        self.retire_duration = seconds.max(1e-3);
        self
    }

    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Default lifecycle for a body kind.
    pub fn preset(kind: BodyKind) -> Self {
        match kind {
            BodyKind::Leaf => Self::new().fade_after(25.0).fade_over(5.0),
            BodyKind::Apple => Self::fruit(),
            BodyKind::Flower => Self::new()
                .decay_stages([0.0, 4.0, 8.0, 12.0])
                .fade_after(15.0)
                .fade_over(3.0),
            BodyKind::Twig => Self::new().fade_after(30.0).fade_over(4.0),
            BodyKind::Raindrop => Self::new().fade_after(4.0).fade_over(0.5),
            BodyKind::Splash => Self::new().fade_after(0.0).fade_over(0.35),
            BodyKind::Smoke => Self::new().fade_after(0.6).fade_over(3.4),
            BodyKind::Spark => Self::new().fade_after(0.2).fade_over(0.8).retire_over(0.3),
            BodyKind::WreckFragment => Self::new().fade_after(8.0).fade_over(2.0),
            BodyKind::Cloud => Self::new().retire_over(3.0),
        }
    }

    /// Fruit rotting through four stages before fading.
    pub fn fruit() -> Self {
        Self::new()
            .decay_stages([0.0, 6.0, 12.0, 18.0])
            .fade_after(22.0)
            .fade_over(3.0)
    }

    // =========================================================================
    // EVALUATION
    // =========================================================================

    /// Age at which the body is fully faded, if it ever is.
    pub fn deadline(&self) -> Option<f32> {
        self.fade_start.map(|s| s + self.fade_duration)
    }

    pub fn has_decay(&self) -> bool {
        self.stage_times.is_some()
    }

    /// Opacity at `age`.
    pub fn alpha_at(&self, age: f32) -> f32 {
        match self.fade_start {
            Some(start) if age > start => {
                (1.0 - (age - start) / self.fade_duration).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    /// Decay stage at `age`: the count of boundaries after the first that
    /// `age` has reached.
    pub fn stage_at(&self, age: f32) -> u8 {
        match &self.stage_times {
            Some(times) => times[1..].iter().take_while(|&&t| age >= t).count() as u8,
            None => 0,
        }
    }

    /// Opacity multiplier after `retire_age` seconds of retirement.
    pub fn retire_alpha(&self, retire_age: f32) -> f32 {
        (1.0 - retire_age / self.retire_duration).clamp(0.0, 1.0)
    }
}
