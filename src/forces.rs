//! Impulses applied from outside a subsystem.
//!
//! Each function takes the bodies it may touch and perturbs their velocity
//! fields; nothing here owns state. Cursor sweeps, breath gusts and a passing
//! vehicle all go through these.

use crate::body::{FreeBody, LifecycleState};
use glam::Vec2;

/// Distance falloff for localized impulses.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Falloff {
    /// Same strength everywhere inside the radius.
    Constant,
    /// Linear to zero at the radius.
    Linear,
    /// Inverse with distance, softened so the center stays finite.
    #[default]
    Inverse,
    /// Smoothstep to zero at the radius.
    Smooth,
}

impl Falloff {
    /// Scale factor at `dist` for an effect of `radius`. Zero outside the radius.
    pub fn factor(&self, dist: f32, radius: f32) -> f32 {
        if radius <= 0.0 || dist > radius {
            return 0.0;
        }
        match self {
            Falloff::Constant => 1.0,
            Falloff::Linear => 1.0 - dist / radius,
            Falloff::Inverse => {
                let soft = radius * 0.1;
                soft / (soft + dist)
            }
            Falloff::Smooth => 1.0 - crate::stage::smoothstep(dist / radius),
        }
    }
}

fn can_be_pushed(body: &FreeBody) -> bool {
    matches!(
        body.state,
        LifecycleState::Airborne | LifecycleState::Settled | LifecycleState::Retiring
    )
}

/// Radial kick away from `point` with an upward lift.
///
/// Bodies within `radius` get an impulse of `strength` scaled inversely by
/// distance and are put back in the air. Returns how many were touched.
pub fn wake<'a>(
    bodies: impl IntoIterator<Item = &'a mut FreeBody>,
    point: Vec2,
    radius: f32,
    strength: f32,
) -> usize {
    let mut touched = 0;
    for body in bodies {
        if !can_be_pushed(body) {
            continue;
        }
        let offset = body.position - point;
        let dist = offset.length();
        let f = Falloff::Inverse.factor(dist, radius);
        if f <= 0.0 {
            continue;
        }
        let dir = offset.try_normalize().unwrap_or(Vec2::new(0.0, -1.0));
        let impulse = strength * f;
        body.velocity += Vec2::new(dir.x * impulse, -impulse.abs() * 0.8 + dir.y.min(0.0) * impulse);
        body.angular_velocity += dir.x * impulse * 0.05;
        body.wake();
        touched += 1;
    }
    touched
}

/// Push along a moving object's direction of travel.
///
/// A vehicle at `origin` moving with `velocity` drags nearby bodies with it
/// and throws them up slightly. Linear falloff to `radius`. Applied every
/// frame, so the impulse scales with `dt` like the integrator's forces.
pub fn wash<'a>(
    bodies: impl IntoIterator<Item = &'a mut FreeBody>,
    origin: Vec2,
    velocity: Vec2,
    radius: f32,
    dt: f32,
) -> usize {
    let speed = velocity.length();
    if speed <= f32::EPSILON || dt <= 0.0 {
        return 0;
    }
    let dir = velocity / speed;
    let k = dt * 60.0;
    let mut touched = 0;
    for body in bodies {
        if !can_be_pushed(body) {
            continue;
        }
        let f = Falloff::Linear.factor(body.position.distance(origin), radius);
        if f <= 0.0 {
            continue;
        }
        body.velocity += (dir * speed * 0.6 * f + Vec2::new(0.0, -speed * 0.35 * f)) * k;
        body.angular_velocity += dir.x * 0.08 * f * k;
        body.wake();
        touched += 1;
    }
    touched
}

/// Lift settled bodies when a gust exceeds `threshold`.
///
/// Each body's `phase` decides whether this gust catches it, so a moderate
/// gust lifts some leaves and a strong one lifts most.
pub fn gust_lift<'a>(
    bodies: impl IntoIterator<Item = &'a mut FreeBody>,
    gust: f32,
    threshold: f32,
) -> usize {
    if gust <= threshold {
        return 0;
    }
    let excess = gust - threshold;
    let catch = (excess / (threshold.max(1e-3) * 2.0)).min(1.0);
    let mut lifted = 0;
    for body in bodies {
        if body.state != LifecycleState::Settled {
            continue;
        }
        let roll = (body.phase * 12.9898).sin().abs();
        if roll > catch {
            continue;
        }
        body.velocity += Vec2::new(excess * (0.6 + roll), -excess * (0.8 + 0.4 * roll));
        body.angular_velocity += (roll - 0.5) * 0.2;
        body.wake();
        lifted += 1;
    }
    lifted
}

/// Cursor sweep: a fast-moving cursor wakes what it passes over.
pub fn cursor_sweep<'a>(
    bodies: impl IntoIterator<Item = &'a mut FreeBody>,
    position: Vec2,
    velocity: Vec2,
    radius: f32,
    min_speed: f32,
) -> usize {
    let speed = velocity.length();
    if speed < min_speed {
        return 0;
    }
    wake(bodies, position, radius, speed * 0.25)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyKind;

    fn settled_leaf(x: f32) -> FreeBody {
        let mut b = FreeBody::new(BodyKind::Leaf, Vec2::new(x, 500.0));
        b.state = LifecycleState::Settled;
        b.grounded = true;
        b
    }

    #[test]
    fn test_falloff_zero_outside_radius() {
        for f in [Falloff::Constant, Falloff::Linear, Falloff::Inverse, Falloff::Smooth] {
            assert_eq!(f.factor(11.0, 10.0), 0.0);
            assert!(f.factor(0.0, 10.0) > 0.99);
        }
    }

    #[test]
    fn test_inverse_falloff_decreases() {
        let f = Falloff::Inverse;
        assert!(f.factor(1.0, 50.0) > f.factor(10.0, 50.0));
        assert!(f.factor(10.0, 50.0) > f.factor(40.0, 50.0));
    }

    #[test]
    fn test_wake_inside_and_outside_radius() {
        let mut near = settled_leaf(105.0);
        let mut far = settled_leaf(300.0);
        let touched = wake([&mut near, &mut far], Vec2::new(100.0, 500.0), 50.0, 4.0);
        assert_eq!(touched, 1);
        assert_eq!(near.state, LifecycleState::Airborne);
        assert!(near.velocity.length() > 0.0);
        assert_eq!(far.state, LifecycleState::Settled);
        assert_eq!(far.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_wake_strength_inverse_with_distance() {
        let mut close = settled_leaf(102.0);
        let mut mid = settled_leaf(130.0);
        wake([&mut close, &mut mid], Vec2::new(100.0, 500.0), 50.0, 4.0);
        assert!(close.velocity.length() > mid.velocity.length());
    }

    #[test]
    fn test_wake_ignores_dragging() {
        let mut held = settled_leaf(100.0);
        held.state = LifecycleState::Dragging;
        assert_eq!(wake([&mut held], Vec2::new(100.0, 500.0), 50.0, 4.0), 0);
    }

    #[test]
    fn test_wash_follows_vehicle() {
        let mut b = settled_leaf(110.0);
        wash([&mut b], Vec2::new(100.0, 500.0), Vec2::new(3.0, 0.0), 60.0, 1.0 / 60.0);
        assert!(b.velocity.x > 0.0);
        assert!(b.velocity.y < 0.0);
        assert_eq!(b.state, LifecycleState::Airborne);
    }

    #[test]
    fn test_wash_same_push_at_any_frame_rate() {
        let origin = Vec2::new(100.0, 500.0);
        let velocity = Vec2::new(3.0, 0.0);

        let mut slow = settled_leaf(110.0);
        wash([&mut slow], origin, velocity, 60.0, 1.0 / 60.0);

        let mut fast = settled_leaf(110.0);
        wash([&mut fast], origin, velocity, 60.0, 1.0 / 120.0);
        wash([&mut fast], origin, velocity, 60.0, 1.0 / 120.0);

        assert!((slow.velocity - fast.velocity).length() < 1e-4);
        assert!((slow.angular_velocity - fast.angular_velocity).abs() < 1e-5);
        assert_eq!(wash([&mut slow], origin, velocity, 60.0, 0.0), 0);
    }

    #[test]
    fn test_gust_below_threshold_does_nothing() {
        let mut b = settled_leaf(100.0);
        assert_eq!(gust_lift([&mut b], 0.5, 1.0), 0);
        assert!(b.is_settled());
    }

    #[test]
    fn test_strong_gust_lifts() {
        let mut leaves: Vec<FreeBody> = (0..20)
            .map(|i| settled_leaf(i as f32 * 10.0).with_phase(i as f32 * 0.37))
            .collect();
        let lifted = gust_lift(leaves.iter_mut(), 10.0, 1.0);
        assert_eq!(lifted, 20);
    }

    #[test]
    fn test_slow_cursor_ignored() {
        let mut b = settled_leaf(100.0);
        assert_eq!(cursor_sweep([&mut b], Vec2::new(100.0, 500.0), Vec2::new(0.5, 0.0), 40.0, 2.0), 0);
        assert_eq!(cursor_sweep([&mut b], Vec2::new(100.0, 500.0), Vec2::new(8.0, 0.0), 40.0, 2.0), 1);
    }
}
