//! Wind and gusts.
//!
//! Total wind each frame is `base + ambient(t) + gust`. `base` is pushed in
//! from outside, `ambient` is a fixed sum of slow sinusoids, and `gust` is
//! raised by microphone level (blowing at the screen) and decays back to
//! zero on its own.

/// Produces the wind value for each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct GustScheduler {
    base: f32,
    gust: f32,
    /// Amplitude of the ambient sway.
    ambient: f32,
    /// Mic level below this is treated as silence.
    mic_threshold: f32,
    /// Gust strength per unit of mic level above the threshold.
    mic_gain: f32,
    /// Fraction of gust left after one second.
    decay_per_second: f32,
}

impl Default for GustScheduler {
    fn default() -> Self {
        Self {
            base: 0.0,
            gust: 0.0,
            ambient: 0.35,
            mic_threshold: 0.08,
            mic_gain: 9.0,
            decay_per_second: 0.15,
        }
    }
}

impl GustScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ambient(mut self, amplitude: f32) -> Self {
        self.ambient = amplitude;
        self
    }

    pub fn set_base(&mut self, wind: f32) {
        self.base = if wind.is_finite() { wind } else { 0.0 };
    }

    #[inline]
    pub fn base(&self) -> f32 {
        self.base
    }

    #[inline]
    pub fn gust(&self) -> f32 {
        self.gust
    }

    /// Feed a microphone amplitude sample in `[0, 1]`.
    ///
    /// A level above the threshold raises the gust; it never lowers it.
    pub fn mic_response(&mut self, level: f32) {
        if !level.is_finite() {
            return;
        }
        let excess = (level.clamp(0.0, 1.0) - self.mic_threshold).max(0.0);
        self.gust = self.gust.max(excess * self.mic_gain);
    }

    /// Ambient sway at `time` seconds.
    pub fn ambient_at(&self, time: f32) -> f32 {
        self.ambient * ((time * 0.31).sin() + 0.5 * (time * 0.87 + 1.3).sin() + 0.25 * (time * 2.1).sin())
    }

    /// Decay the gust by `dt` and return the total wind for this frame.
    pub fn advance(&mut self, time: f32, dt: f32) -> f32 {
        if dt > 0.0 {
            self.gust *= self.decay_per_second.powf(dt);
            if self.gust < 1e-3 {
                self.gust = 0.0;
            }
        }
        self.base + self.ambient_at(time) + self.gust
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_mic_ignored() {
        let mut g = GustScheduler::new();
        g.mic_response(0.05);
        assert_eq!(g.gust(), 0.0);
    }

    #[test]
    fn test_mic_raises_gust_then_decays() {
        let mut g = GustScheduler::new();
        g.mic_response(0.6);
        let peak = g.gust();
        assert!(peak > 0.0);
        for i in 0..600 {
            g.advance(i as f32 / 60.0, 1.0 / 60.0);
        }
        assert!(g.gust() < peak * 0.01);
    }

    #[test]
    fn test_weaker_sample_keeps_stronger_gust() {
        let mut g = GustScheduler::new();
        g.mic_response(0.8);
        let strong = g.gust();
        g.mic_response(0.2);
        assert_eq!(g.gust(), strong);
    }

    #[test]
    fn test_no_ambient_returns_base() {
        let mut g = GustScheduler::new().with_ambient(0.0);
        g.set_base(1.5);
        assert_eq!(g.advance(3.0, 0.016), 1.5);
    }

    #[test]
    fn test_non_finite_base_rejected() {
        let mut g = GustScheduler::new();
        g.set_base(f32::INFINITY);
        assert_eq!(g.base(), 0.0);
    }
}
