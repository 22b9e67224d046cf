//! Behavioral properties of the simulation core.
//!
//! These exercise the public API only: pools, the integrator, stage maps,
//! rate curves, the impulse functions and the scene's tree triggers.

use forestfall::forces;
use forestfall::integrator::step;
use forestfall::prelude::*;
use forestfall::systems::trees::{FELL_LEAVES, FELL_TWIGS};
use forestfall::{BodyPool, EvictionPolicy, FrameContext, RateCurve};

const DT: f32 = 1.0 / 60.0;

fn ctx(progress: f32) -> FrameContext {
    FrameContext::new(progress, Bounds::new(800.0, 600.0, 500.0))
}

// ============================================================================
// Pool bound
// ============================================================================

#[test]
fn test_pool_never_exceeds_cap() {
    for policy in [EvictionPolicy::EvictOldest, EvictionPolicy::Reject] {
        let mut pool = BodyPool::with_policy(25, policy);
        for i in 0..1000 {
            pool.push(FreeBody::new(BodyKind::Leaf, Vec2::new(i as f32, 0.0)));
            assert!(pool.len() <= 25);
        }
        assert_eq!(pool.len(), 25);
    }
}

#[test]
fn test_scene_pools_respect_caps() {
    let mut scene = Scene::new(SceneConfig::default());
    let caps = scene.config().caps;
    scene.set_stage_progress(0.45);
    for i in 0..300 {
        if i % 3 == 0 {
            scene.trigger(Trigger::KnockDown {
                at: Vec2::new(400.0, 200.0),
                velocity: Vec2::ZERO,
            });
            scene.trigger(Trigger::Exhaust {
                at: Vec2::new(300.0, 400.0),
                count: 20,
            });
        }
        scene.tick(DT);
        assert!(scene.rain().drops().len() <= caps.rain);
        assert!(scene.rain().splashes().len() <= caps.splashes);
        assert!(scene.wreckage().fragments().len() <= caps.fragments);
        assert!(scene.wreckage().sparks().len() <= caps.sparks);
        assert!(scene.smoke().pool().len() <= caps.smoke);
        assert!(scene.leaves().pool().len() <= caps.leaves);
        assert!(scene.clouds().pool().len() <= caps.clouds);
    }
}

// ============================================================================
// Settle convergence
// ============================================================================

#[test]
fn test_bodies_settle_without_perpetual_bounce() {
    let kinds = [
        BodyKind::Leaf,
        BodyKind::Apple,
        BodyKind::Flower,
        BodyKind::Twig,
        BodyKind::WreckFragment,
    ];
    for kind in kinds {
        let profile = PhysicalProfile::builtin(kind);
        let mut body = FreeBody::new(kind, Vec2::new(400.0, 100.0));
        let mut frames = 0;
        while !body.is_settled() && frames < 1200 {
            step(&mut body, &profile, &ctx(0.0), DT);
            frames += 1;
        }
        assert!(body.is_settled(), "{:?} still moving after {} frames", kind, frames);
        assert!(body.velocity.x.abs() < 0.05 && body.velocity.y.abs() < 0.05);
        assert_eq!(body.position.y, 500.0 - body.half_height());
    }
}

// ============================================================================
// Monotonic decay
// ============================================================================

#[test]
fn test_decay_stage_never_goes_back() {
    let lifecycle = Lifecycle::fruit();
    let deadline = lifecycle.deadline().unwrap();
    let profile = PhysicalProfile::builtin(BodyKind::Apple);
    let mut body = FreeBody::new(BodyKind::Apple, Vec2::new(400.0, 494.0)).with_size(Vec2::splat(12.0));
    body.state = LifecycleState::Settled;

    let mut last_stage = 0;
    while body.is_alive() {
        step(&mut body, &profile, &ctx(0.0), DT);
        assert!(body.visual.stage >= last_stage);
        last_stage = body.visual.stage;
        assert!(body.age <= deadline + 2.0 * DT, "alive past deadline at {}", body.age);
    }
    assert_eq!(last_stage, 3);
    assert_eq!(body.visual.alpha, 0.0);
}

#[test]
fn test_stage_at_monotonic_over_age() {
    let lifecycle = Lifecycle::new().decay_stages([0.0, 1.0, 2.5, 4.0]).fade_after(5.0).fade_over(1.0);
    let mut last = 0;
    for i in 0..700 {
        let stage = lifecycle.stage_at(i as f32 * 0.01);
        assert!(stage >= last);
        last = stage;
    }
    assert_eq!(last, 3);
    assert_eq!(lifecycle.alpha_at(6.0), 0.0);
}

// ============================================================================
// Stage mapping
// ============================================================================

#[test]
fn test_stage_mapping_is_pure() {
    for map in [StageMap::thirds(), StageMap::quarters()] {
        for i in 0..=200 {
            let p = i as f32 / 200.0;
            assert_eq!(map.sample(p), map.sample(p));
        }
    }
}

#[test]
fn test_no_pop_at_stage_boundaries() {
    let map = StageMap::thirds();
    for b in [1.0f32 / 3.0, 2.0 / 3.0] {
        let at = map.sample(b);
        assert_eq!(at.eased, 0.0);
        let left = map.sample(b - 1e-4);
        let right = map.sample(b + 1e-4);
        assert_eq!(left.stage + 1, at.stage);
        assert!((left.position() - at.position()).abs() < 1e-3);
        assert!((right.position() - at.position()).abs() < 1e-3);
    }
}

// ============================================================================
// Rain intensity
// ============================================================================

#[test]
fn test_rain_curve_checkpoints() {
    let rain = RateCurve::rain();
    assert_eq!(rain.rate(0.0), 0.0);
    assert!(rain.rate(0.4) >= 400.0);
    assert!((rain.rate(0.95) - 10.0).abs() < 1e-3);
}

#[test]
fn test_rain_curve_rises_then_falls() {
    let rain = RateCurve::rain();
    let mut last = rain.rate(0.0);
    for i in 1..=55 {
        let r = rain.rate(i as f32 / 100.0);
        assert!(r >= last - 1e-3, "dropped at p={}", i);
        last = r;
    }
    for i in 56..=100 {
        let r = rain.rate(i as f32 / 100.0);
        assert!(r <= last + 1e-3, "rose at p={}", i);
        last = r;
    }
}

// ============================================================================
// Leaf wake
// ============================================================================

fn resting_leaf(x: f32) -> FreeBody {
    let mut leaf = FreeBody::new(BodyKind::Leaf, Vec2::new(x, 496.0));
    leaf.state = LifecycleState::Settled;
    leaf.grounded = true;
    leaf
}

#[test]
fn test_wake_inside_radius_only() {
    let point = Vec2::new(100.0, 496.0);
    let mut leaves = vec![resting_leaf(110.0), resting_leaf(140.0), resting_leaf(300.0)];
    let touched = forces::wake(leaves.iter_mut(), point, 50.0, 4.0);

    assert_eq!(touched, 2);
    assert_eq!(leaves[0].state, LifecycleState::Airborne);
    assert_eq!(leaves[1].state, LifecycleState::Airborne);
    assert!(leaves[0].velocity.length() > leaves[1].velocity.length());
    assert!(leaves[0].velocity.y < 0.0);

    assert_eq!(leaves[2].state, LifecycleState::Settled);
    assert_eq!(leaves[2].velocity, Vec2::ZERO);
}

// ============================================================================
// Tree fell burst
// ============================================================================

#[test]
fn test_tree_fell_burst_is_bounded_and_local() {
    let mut scene = Scene::new(SceneConfig::default());
    let rect = scene.config().trees[1];

    let spawned = scene.trigger(Trigger::TreeFelled(1));
    assert!(spawned > 0 && spawned <= FELL_TWIGS + FELL_LEAVES);
    assert!(scene.trees().is_gone(1));

    let bodies: Vec<_> = scene
        .leaves()
        .pool()
        .iter()
        .chain(scene.pickups().pool().iter())
        .collect();
    assert_eq!(bodies.len(), spawned);
    assert!(bodies.iter().all(|b| rect.contains(b.position)));
}

#[test]
fn test_tree_fell_repeat_is_noop() {
    let mut scene = Scene::new(SceneConfig::default());
    scene.trigger(Trigger::TreeFelled(0));
    let live = scene.live_count();

    assert_eq!(scene.trigger(Trigger::TreeFelled(0)), 0);
    assert_eq!(scene.live_count(), live);
    assert_eq!(scene.trees().standing(), scene.config().trees.len() - 1);
}
