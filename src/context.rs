//! Per-frame shared state.
//!
//! External collaborators push values into [`SceneInputs`] whenever they like.
//! At the top of each frame the scene freezes them into a [`FrameContext`]
//! that every subsystem reads for the whole frame, so one subsystem can never
//! see a different progress or wind sample than another.

use crate::stage::{clamp_progress, StageMap, StageSample};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canvas extent and ground line.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
    /// Y coordinate bodies land on.
    pub ground_y: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32, ground_y: f32) -> Self {
        Self { width, height, ground_y }
    }

    /// Whether `p` lies inside the canvas grown by `margin` on every side.
    pub fn contains(&self, p: Vec2, margin: f32) -> bool {
        p.x >= -margin && p.x <= self.width + margin && p.y >= -margin && p.y <= self.height + margin
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(1280.0, 720.0, 640.0)
    }
}

/// Axis-aligned rectangle in canvas space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Rectangle spanning two corners in any order.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin, origin + size)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Upper `fraction` of the rectangle (a tree's crown).
    pub fn top(&self, fraction: f32) -> Rect {
        let h = self.size().y * fraction.clamp(0.0, 1.0);
        Rect::new(self.min, Vec2::new(self.max.x, self.min.y + h))
    }
}

/// Pointer sample in canvas space.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Cursor {
    pub position: Vec2,
    /// Pixels per 60 Hz frame.
    pub velocity: Vec2,
}

/// Values pushed in by external collaborators between frames.
#[derive(Clone, Debug, Default)]
pub struct SceneInputs {
    pub progress: f32,
    pub cursor: Option<Vec2>,
    last_cursor: Option<Vec2>,
}

impl SceneInputs {
    pub fn set_progress(&mut self, p: f32) {
        self.progress = clamp_progress(p);
    }

    pub fn set_cursor(&mut self, position: Option<Vec2>) {
        self.cursor = position;
    }

    /// Cursor sample for this frame, with velocity from the previous sample.
    pub(crate) fn take_cursor(&mut self, dt: f32) -> Option<Cursor> {
        let current = self.cursor;
        let previous = self.last_cursor;
        self.last_cursor = current;
        let position = current?;
        let frames = (dt * 60.0).max(1e-3);
        let velocity = previous.map_or(Vec2::ZERO, |prev| (position - prev) / frames);
        Some(Cursor { position, velocity })
    }
}

/// Immutable snapshot every subsystem reads during one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    /// Scroll progress, `[0, 1]`.
    pub progress: f32,
    /// Three-stage mapping of `progress`.
    pub stage: StageSample,
    /// Four-stage season mapping of `progress`.
    pub season: StageSample,
    /// Horizontal wind, px/frame² scale before per-kind susceptibility.
    pub wind: f32,
    /// Current gust strength above ambient, `>= 0`.
    pub gust: f32,
    /// Seconds since the scene started.
    pub time: f32,
    pub frame: u64,
    pub cursor: Option<Cursor>,
    pub bounds: Bounds,
    /// Progress past which the forest gives way to the city.
    pub city_threshold: f32,
}

impl FrameContext {
    /// Snapshot with the standard three- and four-stage maps.
    pub fn new(progress: f32, bounds: Bounds) -> Self {
        let progress = clamp_progress(progress);
        Self {
            progress,
            stage: StageMap::thirds().sample(progress),
            season: StageMap::quarters().sample(progress),
            wind: 0.0,
            gust: 0.0,
            time: 0.0,
            frame: 0,
            cursor: None,
            bounds,
            city_threshold: 0.85,
        }
    }

    pub fn with_wind(mut self, wind: f32) -> Self {
        self.wind = wind;
        self
    }

    pub fn with_time(mut self, time: f32) -> Self {
        self.time = time;
        self
    }

    pub fn with_cursor(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor;
        self
    }

    /// Whether the forest is being cleared away.
    #[inline]
    pub fn in_city(&self) -> bool {
        self.progress >= self.city_threshold
    }
}
