//! The tree stand.
//!
//! Trees are not simulated bodies; they are fixed rectangles that bodies
//! come out of. A click shakes a tree and drops one pickup from its crown.
//! Felling a tree empties it into a burst once and marks it `gone` for
//! good, so repeated fell triggers do nothing.

use crate::context::Rect;
use crate::spawn::SpawnContext;
use glam::Vec2;

const SALT: u64 = 7;

/// Twigs thrown by a felled tree.
pub const FELL_TWIGS: usize = 8;
/// Leaves thrown by a felled tree.
pub const FELL_LEAVES: usize = 24;

/// How long a shake takes to die down, seconds.
const SHAKE_DURATION: f32 = 0.6;

/// One tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tree {
    /// Trunk to crown.
    pub rect: Rect,
    pub gone: bool,
    /// Shake strength, `1` right after a click decaying to `0`.
    pub shake: f32,
}

/// All trees in the scene, indexed as configured.
#[derive(Clone, Debug)]
pub struct TreeStand {
    trees: Vec<Tree>,
    rng: SpawnContext,
}

impl TreeStand {
    pub fn new(rects: &[Rect], seed: u64) -> Self {
        Self {
            trees: rects
                .iter()
                .map(|&rect| Tree {
                    rect,
                    gone: false,
                    shake: 0.0,
                })
                .collect(),
            rng: SpawnContext::salted(seed, SALT),
        }
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn get(&self, index: usize) -> Option<&Tree> {
        self.trees.get(index)
    }

    pub fn is_gone(&self, index: usize) -> bool {
        self.trees.get(index).map_or(true, |t| t.gone)
    }

    /// Standing trees.
    pub fn standing(&self) -> usize {
        self.trees.iter().filter(|t| !t.gone).count()
    }

    /// Shake tree `index` and return where its pickup drops from.
    ///
    /// `None` for an unknown or felled tree.
    pub fn click(&mut self, index: usize) -> Option<Vec2> {
        let tree = self.trees.get_mut(index).filter(|t| !t.gone)?;
        tree.shake = 1.0;
        let crown = tree.rect.top(0.4);
        Some(self.rng.random_in_rect(crown.min, crown.max))
    }

    /// Fell tree `index`. Returns its rectangle the first time only.
    pub fn fell(&mut self, index: usize) -> Option<Rect> {
        let tree = self.trees.get_mut(index).filter(|t| !t.gone)?;
        tree.gone = true;
        tree.shake = 0.0;
        Some(tree.rect)
    }

    /// Let shakes die down.
    pub fn update(&mut self, dt: f32) {
        for tree in &mut self.trees {
            tree.shake = (tree.shake - dt / SHAKE_DURATION).max(0.0);
        }
    }

    /// Horizontal sway of tree `index` at `time` seconds.
    pub fn sway(&self, index: usize, time: f32) -> f32 {
        self.trees
            .get(index)
            .map_or(0.0, |t| (time * 38.0 + index as f32).sin() * 5.0 * t.shake)
    }
}
