//! Frame clock.
//!
//! The host drives the scene with raw frame deltas (from its animation
//! callback or a fixed test step). [`Time`] turns those into the simulation
//! delta: capped after stalls, scaled, optionally fixed, zero while paused.
//!
//! # Example
//!
//! ```
//! use forestfall::time::Time;
//!
//! let mut clock = Time::new();
//! let dt = clock.advance(1.0 / 60.0);
//! assert_eq!(clock.frame(), 1);
//! assert!((dt - 1.0 / 60.0).abs() < 1e-6);
//! ```

/// Longest delta a single frame may advance, seconds.
pub const MAX_DELTA: f32 = 0.1;

/// Simulation timing.
#[derive(Debug, Clone, PartialEq)]
pub struct Time {
    /// Simulated seconds since the scene started.
    seconds: f32,
    /// Simulated seconds in the last frame.
    step: f32,
    /// Frames advanced while running.
    frames: u64,
    /// Host frame rate, smoothed from raw deltas.
    host_fps: f32,
    paused: bool,
    /// Replaces the raw delta when set.
    fixed: Option<f32>,
    scale: f32,
    stall_cap: f32,
}

impl Default for Time {
    fn default() -> Self {
        Self {
            seconds: 0.0,
            step: 0.0,
            frames: 0,
            host_fps: 0.0,
            paused: false,
            fixed: None,
            scale: 1.0,
            stall_cap: MAX_DELTA,
        }
    }
}

impl Time {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw host delta. Returns the simulation delta for the frame.
    ///
    /// Non-finite or negative deltas count as zero. While paused the host
    /// rate is still tracked but no simulated time passes.
    pub fn advance(&mut self, raw_delta: f32) -> f32 {
        let raw = if raw_delta.is_finite() { raw_delta.max(0.0) } else { 0.0 };
        if raw > 0.0 {
            let instant = 1.0 / raw;
            self.host_fps = if self.host_fps == 0.0 {
                instant
            } else {
                self.host_fps + (instant - self.host_fps) * 0.1
            };
        }

        self.step = if self.paused {
            0.0
        } else {
            self.fixed.unwrap_or_else(|| raw.min(self.stall_cap)) * self.scale
        };
        if self.step > 0.0 {
            self.seconds += self.step;
            self.frames += 1;
        }
        self.step
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.seconds
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.step
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frames
    }

    /// Smoothed host frame rate.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.host_fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.scale
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Step by a fixed delta regardless of the host. `None` follows the host again.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed = delta.filter(|d| d.is_finite()).map(|d| d.max(0.0));
    }

    /// Slow motion below 1, fast forward above. Negative scales clamp to zero.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
    }

    /// Cap applied to raw deltas after a stall.
    pub fn set_max_delta(&mut self, max: f32) {
        self.stall_cap = max.max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let clock = Time::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_stall_is_capped() {
        let mut clock = Time::new();
        assert_eq!(clock.advance(2.0), MAX_DELTA);
        clock.set_max_delta(0.05);
        assert_eq!(clock.advance(2.0), 0.05);
    }

    #[test]
    fn test_paused_frames_do_not_count() {
        let mut clock = Time::new();
        clock.advance(0.016);
        clock.pause();
        let before = clock.elapsed();
        assert_eq!(clock.advance(0.016), 0.0);
        assert_eq!(clock.elapsed(), before);
        assert_eq!(clock.frame(), 1);
        assert!(clock.fps() > 0.0);

        clock.resume();
        clock.advance(0.016);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_slow_motion() {
        let mut clock = Time::new();
        clock.set_time_scale(0.5);
        assert!((clock.advance(0.02) - 0.01).abs() < 1e-6);
        clock.set_time_scale(-1.0);
        assert_eq!(clock.time_scale(), 0.0);
        assert_eq!(clock.advance(0.02), 0.0);
    }

    #[test]
    fn test_fixed_delta_ignores_host() {
        let mut clock = Time::new();
        clock.set_fixed_delta(Some(1.0 / 60.0));
        let dt = clock.advance(0.05);
        assert!((dt - 1.0 / 60.0).abs() < 1e-6);
        assert!((clock.fps() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_nan_delta_is_zero() {
        let mut clock = Time::new();
        assert_eq!(clock.advance(f32::NAN), 0.0);
        assert_eq!(clock.frame(), 0);
    }
}
