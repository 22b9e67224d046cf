//! The scene: one scheduler that owns every subsystem.
//!
//! External collaborators push inputs in between frames (progress, wind,
//! microphone level, cursor, triggers). [`Scene::tick`] then builds a single
//! [`FrameContext`] snapshot and updates every subsystem in a fixed order:
//!
//! 1. clouds
//! 2. rain
//! 3. leaves
//! 4. pickups
//! 5. wreckage (and the tree stand)
//! 6. smoke (vehicle exhaust first)
//!
//! Vehicle wash is applied before any subsystem updates, so every
//! subsystem sees the same perturbed state.
//!
//! # Example
//!
//! ```
//! use forestfall::prelude::*;
//!
//! let mut scene = Scene::new(SceneConfig::default());
//! scene.set_stage_progress(0.4);
//! for _ in 0..30 {
//!     scene.tick(1.0 / 60.0);
//! }
//! assert!(scene.rain().drops().len() > 0);
//! ```

use crate::canvas::Canvas;
use crate::config::SceneConfig;
use crate::context::{FrameContext, SceneInputs};
use crate::quality::QualityController;
use crate::render::{RenderFrame, RenderStats, Renderer};
use crate::stage::{Season, StageMap};
use crate::systems::trees::{FELL_LEAVES, FELL_TWIGS};
use crate::systems::{
    Clouds, Leaves, Pickups, Rain, Smoke, Subsystem, SubsystemId, TreeStand, Vehicle, Wreckage,
};
use crate::time::Time;
use crate::wind::GustScheduler;
use glam::Vec2;

/// A discrete event pushed in from outside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Trigger {
    /// Shake tree `i` and drop one pickup chosen by season.
    TreeClick(usize),
    /// Fell tree `i`: twig and leaf burst inside its rectangle, once.
    TreeFelled(usize),
    /// Break a flier into wreckage.
    KnockDown { at: Vec2, velocity: Vec2 },
    /// Immediate smoke puff burst.
    Exhaust { at: Vec2, count: usize },
}

/// The whole simulation.
pub struct Scene {
    config: SceneConfig,
    inputs: SceneInputs,
    time: Time,
    wind: GustScheduler,
    quality: QualityController,
    clouds: Clouds,
    rain: Rain,
    leaves: Leaves,
    pickups: Pickups,
    wreckage: Wreckage,
    smoke: Smoke,
    trees: TreeStand,
    renderer: Renderer,
    vehicle: Option<Vehicle>,
    ctx: FrameContext,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let seed = config.seed;
        let caps = config.caps;
        let profiles = &config.profiles;
        log::info!(
            "scene {}x{} seed {:#x}, {} trees, {} chimneys",
            config.bounds.width,
            config.bounds.height,
            seed,
            config.trees.len(),
            config.chimneys.len()
        );

        let mut ctx = FrameContext::new(0.0, config.bounds);
        ctx.city_threshold = config.city_threshold;

        Self {
            inputs: SceneInputs::default(),
            time: Time::new(),
            wind: GustScheduler::new(),
            quality: QualityController::new(config.frame_budget_ms),
            clouds: Clouds::new(caps.clouds, config.sky, profiles.clone(), seed),
            rain: Rain::new(caps.rain, caps.splashes, profiles.clone(), seed),
            leaves: Leaves::new(caps.leaves, config.canopy, profiles.clone(), seed),
            pickups: Pickups::new(caps.pickups, config.canopy, profiles.clone(), seed),
            wreckage: Wreckage::new(caps.fragments, caps.sparks, profiles.clone(), seed),
            smoke: Smoke::new(
                caps.smoke,
                config.chimneys.clone(),
                config.city_threshold,
                profiles.clone(),
                seed,
            ),
            trees: TreeStand::new(&config.trees, seed),
            renderer: Renderer::new(),
            vehicle: None,
            ctx,
            config,
        }
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    /// Push the scroll progress. Clamped to `[0, 1]`; NaN reads as `0`.
    pub fn set_stage_progress(&mut self, progress: f32) {
        self.inputs.set_progress(progress);
    }

    pub fn progress(&self) -> f32 {
        self.inputs.progress
    }

    /// Push the base horizontal wind.
    pub fn set_wind(&mut self, wind: f32) {
        self.wind.set_base(wind);
    }

    /// Push a microphone amplitude sample in `[0, 1]`.
    pub fn mic_response(&mut self, level: f32) {
        self.wind.mic_response(level);
    }

    /// Push the pointer position, `None` when it leaves the canvas.
    pub fn set_cursor(&mut self, position: Option<Vec2>) {
        self.inputs.set_cursor(position);
    }

    /// Pick up the nearest pickup near `point`.
    pub fn grab(&mut self, point: Vec2) -> bool {
        self.pickups.grab(point)
    }

    /// Let go of the held pickup, throwing it with the cursor's velocity.
    pub fn release(&mut self) -> bool {
        let throw = self.ctx.cursor.map_or(Vec2::ZERO, |c| c.velocity);
        self.pickups.release(throw)
    }

    pub fn set_vehicle(&mut self, vehicle: Option<Vehicle>) {
        if self.vehicle.is_some() != vehicle.is_some() {
            log::debug!("vehicle {}", if vehicle.is_some() { "enters" } else { "leaves" });
        }
        self.vehicle = vehicle;
    }

    pub fn vehicle(&self) -> Option<&Vehicle> {
        self.vehicle.as_ref()
    }

    /// Apply a discrete event. Returns how many bodies it spawned.
    pub fn trigger(&mut self, trigger: Trigger) -> usize {
        let season = StageMap::quarters().sample(self.inputs.progress);
        let spawned = match trigger {
            Trigger::TreeClick(i) => match self.trees.click(i) {
                Some(at) => {
                    let kind = Pickups::kind_for(Season::from(season.stage));
                    self.pickups.spawn(kind, at) as usize
                }
                None => 0,
            },
            Trigger::TreeFelled(i) => match self.trees.fell(i) {
                Some(rect) => {
                    let twigs = self.pickups.twig_burst(rect, FELL_TWIGS);
                    let leaves = self.leaves.burst(rect, FELL_LEAVES, season.position() / 3.0);
                    twigs + leaves
                }
                None => 0,
            },
            Trigger::KnockDown { at, velocity } => self.wreckage.knock_down(at, velocity),
            Trigger::Exhaust { at, count } => self.smoke.burst(at, count),
        };
        log::debug!("{:?} spawned {}", trigger, spawned);
        spawned
    }

    /// Mute or unmute one subsystem. Muting clears its pools.
    pub fn set_muted(&mut self, id: SubsystemId, muted: bool) {
        let system = self.subsystem_mut(id);
        if system.is_muted() != muted {
            system.set_muted(muted);
            log::info!("{:?} {}", id, if muted { "muted" } else { "unmuted" });
        }
    }

    pub fn is_muted(&self, id: SubsystemId) -> bool {
        self.subsystem(id).is_muted()
    }

    /// Feed a measured frame time into the quality controller.
    pub fn observe_frame_time(&mut self, frame_ms: f32) -> f32 {
        self.quality.observe(frame_ms)
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// Advance one frame of `raw_dt` seconds. Returns the frame's snapshot.
    pub fn tick(&mut self, raw_dt: f32) -> FrameContext {
        let dt = self.time.advance(raw_dt);
        if dt <= 0.0 {
            return self.ctx;
        }

        let time = self.time.elapsed();
        let mut ctx = FrameContext::new(self.inputs.progress, self.config.bounds)
            .with_wind(self.wind.advance(time, dt))
            .with_time(time)
            .with_cursor(self.inputs.take_cursor(dt));
        ctx.gust = self.wind.gust();
        ctx.frame = self.time.frame();
        ctx.city_threshold = self.config.city_threshold;
        self.ctx = ctx;

        if let Some(vehicle) = self.vehicle.as_mut() {
            vehicle.advance(dt);
            self.leaves.wash(vehicle.position, vehicle.velocity, vehicle.wash_radius, dt);
            self.pickups.wash(vehicle.position, vehicle.velocity, vehicle.wash_radius, dt);
        }

        self.clouds.update(dt, &ctx);
        self.rain.update(dt, &ctx);
        self.leaves.update(dt, &ctx);
        self.pickups.update(dt, &ctx);
        self.wreckage.update(dt, &ctx);
        self.trees.update(dt);
        if let Some(vehicle) = &self.vehicle {
            self.smoke.exhaust(vehicle, dt);
        }
        self.smoke.update(dt, &ctx);

        ctx
    }

    /// Draw the current state.
    pub fn render(&mut self, canvas: &mut dyn Canvas) -> RenderStats {
        let ctx = &self.ctx;
        let frame = RenderFrame {
            progress: ctx.progress,
            season: ctx.season.position() / 3.0,
            time: ctx.time,
            frame: ctx.frame,
            ground_y: ctx.bounds.ground_y,
            clouds: self.clouds.pool(),
            trees: &self.trees,
            leaves: self.leaves.pool(),
            pickups: self.pickups.pool(),
            fragments: self.wreckage.fragments(),
            drops: self.rain.drops(),
            splashes: self.rain.splashes(),
            sparks: self.wreckage.sparks(),
            smoke: self.smoke.pool(),
        };
        self.renderer.draw(canvas, &frame, &self.quality)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Snapshot of the last ticked frame.
    pub fn context(&self) -> &FrameContext {
        &self.ctx
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn time_mut(&mut self) -> &mut Time {
        &mut self.time
    }

    pub fn wind(&self) -> &GustScheduler {
        &self.wind
    }

    pub fn quality(&self) -> &QualityController {
        &self.quality
    }

    pub fn clouds(&self) -> &Clouds {
        &self.clouds
    }

    pub fn rain(&self) -> &Rain {
        &self.rain
    }

    pub fn leaves(&self) -> &Leaves {
        &self.leaves
    }

    /// Mutable leaves, for nudging settled leaves from outside.
    pub fn leaves_mut(&mut self) -> &mut Leaves {
        &mut self.leaves
    }

    pub fn pickups(&self) -> &Pickups {
        &self.pickups
    }

    pub fn wreckage(&self) -> &Wreckage {
        &self.wreckage
    }

    pub fn smoke(&self) -> &Smoke {
        &self.smoke
    }

    pub fn trees(&self) -> &TreeStand {
        &self.trees
    }

    pub fn subsystem(&self, id: SubsystemId) -> &dyn Subsystem {
        match id {
            SubsystemId::Clouds => &self.clouds,
            SubsystemId::Rain => &self.rain,
            SubsystemId::Leaves => &self.leaves,
            SubsystemId::Pickups => &self.pickups,
            SubsystemId::Wreckage => &self.wreckage,
            SubsystemId::Smoke => &self.smoke,
        }
    }

    fn subsystem_mut(&mut self, id: SubsystemId) -> &mut dyn Subsystem {
        match id {
            SubsystemId::Clouds => &mut self.clouds,
            SubsystemId::Rain => &mut self.rain,
            SubsystemId::Leaves => &mut self.leaves,
            SubsystemId::Pickups => &mut self.pickups,
            SubsystemId::Wreckage => &mut self.wreckage,
            SubsystemId::Smoke => &mut self.smoke,
        }
    }

    /// Live bodies across every subsystem.
    pub fn live_count(&self) -> usize {
        SubsystemId::ORDER
            .iter()
            .map(|&id| self.subsystem(id).live_count())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyKind;
    use crate::canvas::{DrawCall, DrawList};

    const DT: f32 = 1.0 / 60.0;

    fn scene() -> Scene {
        Scene::new(SceneConfig::default())
    }

    #[test]
    fn test_tick_snapshots_inputs() {
        let mut s = scene();
        s.set_stage_progress(0.4);
        s.set_wind(1.5);
        s.mic_response(0.6);
        let ctx = s.tick(DT);
        assert_eq!(ctx.progress, 0.4);
        assert!(ctx.gust > 0.0);
        assert_eq!(ctx.gust, s.wind().gust());
        assert_eq!(ctx.stage.stage, 1);
        assert_eq!(ctx.frame, 1);
        assert_eq!(s.context(), &ctx);
    }

    #[test]
    fn test_paused_tick_changes_nothing() {
        let mut s = scene();
        s.set_stage_progress(0.4);
        s.tick(DT);
        s.time_mut().pause();
        let before = s.live_count();
        let ctx = s.tick(DT);
        assert_eq!(ctx.frame, 1);
        assert_eq!(s.live_count(), before);
    }

    #[test]
    fn test_tree_click_drops_seasonal_pickup() {
        let mut s = scene();
        assert_eq!(s.trigger(Trigger::TreeClick(0)), 1);
        assert!(s.pickups().pool().iter().all(|b| b.kind == BodyKind::Flower));

        s.set_stage_progress(0.99);
        assert_eq!(s.trigger(Trigger::TreeClick(1)), 1);
        assert!(s.pickups().pool().iter().any(|b| b.kind == BodyKind::Twig));
    }

    #[test]
    fn test_tree_fell_once() {
        let mut s = scene();
        let first = s.trigger(Trigger::TreeFelled(2));
        assert_eq!(first, FELL_TWIGS + FELL_LEAVES);
        assert!(s.trees().is_gone(2));
        assert_eq!(s.trigger(Trigger::TreeFelled(2)), 0);
        assert_eq!(s.trigger(Trigger::TreeClick(2)), 0);
    }

    #[test]
    fn test_release_throws_with_cursor_velocity() {
        let mut s = scene();
        s.trigger(Trigger::TreeClick(0));
        let at = s.pickups().pool().iter().next().unwrap().position;
        s.set_cursor(Some(at));
        s.tick(DT);
        let at = s.pickups().pool().iter().next().unwrap().position;
        assert!(s.grab(at));
        s.set_cursor(Some(at + Vec2::new(12.0, 0.0)));
        s.tick(DT);
        assert!(s.release());
        let thrown = s.pickups().pool().iter().next().unwrap();
        assert!(thrown.velocity.x > 10.0);
    }

    #[test]
    fn test_vehicle_exhaust_and_wash() {
        let mut s = scene();
        let ground = s.config().bounds.ground_y;
        s.set_vehicle(Some(Vehicle::new(Vec2::new(100.0, ground), Vec2::new(2.0, 0.0))));
        for _ in 0..60 {
            s.tick(DT);
        }
        assert!(s.smoke().live_count() > 0);
        assert!(s.vehicle().unwrap().position.x > 200.0);
    }

    #[test]
    fn test_mute_round_trip() {
        let mut s = scene();
        s.set_stage_progress(0.4);
        for _ in 0..30 {
            s.tick(DT);
        }
        assert!(s.rain().live_count() > 0);
        s.set_muted(SubsystemId::Rain, true);
        assert!(s.is_muted(SubsystemId::Rain));
        assert_eq!(s.rain().live_count(), 0);
        s.tick(DT);
        assert_eq!(s.rain().live_count(), 0);
        s.set_muted(SubsystemId::Rain, false);
        for _ in 0..10 {
            s.tick(DT);
        }
        assert!(s.rain().live_count() > 0);
    }

    #[test]
    fn test_render_starts_with_clear() {
        let mut s = scene();
        s.tick(DT);
        let mut list = DrawList::new(s.config().bounds.width as u32, s.config().bounds.height as u32);
        s.render(&mut list);
        assert!(matches!(list.calls().first(), Some(DrawCall::Clear(_))));
    }
}
