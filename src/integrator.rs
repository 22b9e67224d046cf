//! Per-frame physics step.
//!
//! Velocities are in pixels per 60 Hz frame; `dt` in seconds is converted to
//! a frame count `k = dt * 60` so additive terms scale by `k` and per-frame
//! retention factors by `powf(k)`. At exactly 60 fps this reduces to the
//! plain per-frame update:
//!
//! ```text
//! vy += gravity_scale * G;  vy = min(vy, terminal);     vy *= air_drag
//! vx += wind * susceptibility + flutter;                 vx *= air_drag
//! ω  *= rotational_damping;                              θ  += ω
//! ```
//!
//! followed by ground and wall collision, then age-driven decay and fade.

use crate::body::{FreeBody, LifecycleState};
use crate::context::FrameContext;
use crate::lifecycle::PULSE_DURATION;
use crate::pool::BodyPool;
use crate::profile::{
    Flutter, GroundResponse, PhysicalProfile, ProfileTable, WallResponse, BOUNCE_CUTOFF, GRAVITY,
    SETTLE_EPSILON,
};
use glam::Vec2;

/// Extra room past the canvas edge before a body is culled.
pub const CULL_MARGIN: f32 = 200.0;

/// What happened to one body during a step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepEvents {
    /// First ground contact since the body was last airborne.
    pub landed: bool,
    /// Came to rest this step.
    pub settled: bool,
    /// Advanced to a new decay stage.
    pub stage_changed: bool,
    /// Hit the ground with [`GroundResponse::Splash`].
    pub splash: Option<Vec2>,
    /// Became dead this step.
    pub died: bool,
}

/// Totals from stepping a whole pool.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoolStep {
    pub landed: usize,
    pub settled: usize,
    pub died: usize,
    pub splashes: Vec<Vec2>,
}

/// Advance one body by `dt` seconds.
pub fn step(body: &mut FreeBody, profile: &PhysicalProfile, ctx: &FrameContext, dt: f32) -> StepEvents {
    let mut events = StepEvents::default();
    if dt <= 0.0 || body.state == LifecycleState::Dead {
        return events;
    }

    if matches!(body.state, LifecycleState::Airborne | LifecycleState::Retiring) {
        integrate_motion(body, profile, ctx, dt, &mut events);
    }

    if body.state != LifecycleState::Dead {
        advance_age(body, dt, &mut events);
    }

    if body.state != LifecycleState::Dead && profile.walls != WallResponse::Wrap && off_canvas(body, profile, ctx) {
        body.kill();
    }

    if body.state == LifecycleState::Dead {
        events.died = true;
    }
    events
}

/// Past the cull margin. Bodies that gravity pulls back down are kept above the top.
fn off_canvas(body: &FreeBody, profile: &PhysicalProfile, ctx: &FrameContext) -> bool {
    let margin = CULL_MARGIN.max(body.radius());
    if ctx.bounds.contains(body.position, margin) {
        return false;
    }
    let beside = body.position.x < -margin || body.position.x > ctx.bounds.width + margin;
    let below = body.position.y > ctx.bounds.height + margin;
    beside || below || profile.gravity_scale <= 0.0
}

/// Step every body in a pool, sweep the dead, and collect events.
pub fn step_pool(pool: &mut BodyPool, profiles: &ProfileTable, ctx: &FrameContext, dt: f32) -> PoolStep {
    let mut out = PoolStep::default();
    for body in pool.iter_mut() {
        let profile = profiles.get(body.kind);
        let ev = step(body, &profile, ctx, dt);
        out.landed += ev.landed as usize;
        out.settled += ev.settled as usize;
        out.died += ev.died as usize;
        if let Some(at) = ev.splash {
            out.splashes.push(at);
        }
    }
    pool.sweep();
    out
}

fn integrate_motion(
    body: &mut FreeBody,
    profile: &PhysicalProfile,
    ctx: &FrameContext,
    dt: f32,
    events: &mut StepEvents,
) {
    let k = dt * 60.0;
    let drag = profile.air_drag.powf(k);
    let was_grounded = body.grounded;

    // Vertical
    body.velocity.y += profile.gravity_scale * GRAVITY * k;
    if profile.terminal_vy > 0.0 {
        body.velocity.y = body.velocity.y.min(profile.terminal_vy);
    }
    if profile.rise_cap > 0.0 {
        body.velocity.y = body.velocity.y.max(-profile.rise_cap);
    }
    body.velocity.y *= drag;

    // Horizontal: the ground shields resting bodies from wind and flutter
    if !was_grounded {
        body.velocity.x += ctx.wind * profile.wind_susceptibility * k;
        match profile.flutter {
            Flutter::None => {}
            Flutter::Leaf { amplitude, frequency } => {
                let arg = body.position.y * 0.02 + ctx.time * frequency + body.phase;
                body.velocity.x += amplitude * arg.sin() * k;
                body.angular_velocity += amplitude * 0.02 * arg.cos() * k;
            }
            Flutter::Drift { amplitude, frequency } => {
                let arg = ctx.time * frequency + body.phase;
                body.velocity.x += amplitude * arg.sin() * k;
            }
        }
        body.velocity.x *= drag;
    }

    // Rotation
    if was_grounded && profile.rolling_coupling > 0.0 {
        let rolling = body.velocity.x / body.radius().max(1.0);
        let c = profile.rolling_coupling;
        body.angular_velocity = rolling * c + body.angular_velocity * (1.0 - c);
    } else {
        body.angular_velocity *= profile.rotational_damping.powf(k);
    }
    body.rotation += body.angular_velocity * k;

    body.position += body.velocity * k;

    if profile.growth != 0.0 {
        let aspect = body.visual.size.y / body.visual.size.x.max(1e-3);
        let w = (body.visual.size.x + profile.growth * dt).max(0.0);
        body.visual.size = Vec2::new(w, w * aspect);
    }

    collide_ground(body, profile, ctx, k, was_grounded, events);
    collide_walls(body, profile, ctx);
}

fn collide_ground(
    body: &mut FreeBody,
    profile: &PhysicalProfile,
    ctx: &FrameContext,
    k: f32,
    was_grounded: bool,
    events: &mut StepEvents,
) {
    let floor = ctx.bounds.ground_y - body.half_height();
    if profile.ground == GroundResponse::Pass || body.position.y < floor {
        body.grounded = false;
        return;
    }

    match profile.ground {
        GroundResponse::Pass => {}
        GroundResponse::Splash => {
            events.splash = Some(Vec2::new(body.position.x, ctx.bounds.ground_y));
            body.kill();
        }
        GroundResponse::Vanish => body.kill(),
        GroundResponse::Bounce => {
            body.position.y = floor;
            if body.velocity.y > 0.0 {
                body.velocity.y = -body.velocity.y * profile.restitution;
            }
            if body.velocity.y.abs() < BOUNCE_CUTOFF {
                body.velocity.y = 0.0;
            }
            body.velocity.x *= profile.ground_friction.powf(k);
            body.grounded = true;
            events.landed = !was_grounded;

            if body.velocity.x.abs() < SETTLE_EPSILON && body.velocity.y.abs() < SETTLE_EPSILON {
                body.velocity = Vec2::ZERO;
                body.angular_velocity = 0.0;
                if body.state == LifecycleState::Airborne {
                    body.state = LifecycleState::Settled;
                    events.settled = true;
                }
            }
        }
    }
}

fn collide_walls(body: &mut FreeBody, profile: &PhysicalProfile, ctx: &FrameContext) {
    let half_w = body.visual.size.x * 0.5;
    let width = ctx.bounds.width;
    match profile.walls {
        WallResponse::None => {}
        WallResponse::Bounce { restitution } => {
            if body.position.x < half_w {
                body.position.x = half_w;
                body.velocity.x = body.velocity.x.abs() * restitution;
            } else if body.position.x > width - half_w {
                body.position.x = width - half_w;
                body.velocity.x = -body.velocity.x.abs() * restitution;
            }
        }
        WallResponse::Wrap => {
            let span = width + 2.0 * half_w;
            if body.position.x < -half_w {
                body.position.x += span;
            } else if body.position.x > width + half_w {
                body.position.x -= span;
            }
        }
    }
}

/// Age, decay stage, pulse and fade. Runs for every live state.
fn advance_age(body: &mut FreeBody, dt: f32, events: &mut StepEvents) {
    body.age += dt;

    let stage = body.lifecycle.stage_at(body.age).max(body.visual.stage);
    if stage != body.visual.stage {
        body.visual.stage = stage;
        body.visual.pulse = 1.0;
        events.stage_changed = true;
    } else if body.visual.pulse > 0.0 {
        body.visual.pulse = (body.visual.pulse - dt / PULSE_DURATION).max(0.0);
    }

    let mut alpha = body.lifecycle.alpha_at(body.age);
    if body.state == LifecycleState::Retiring {
        body.retire_age += dt;
        alpha = alpha.min(body.lifecycle.retire_alpha(body.retire_age));
    }
    body.visual.alpha = alpha;
    if alpha <= 0.0 {
        body.kill();
    }
}
