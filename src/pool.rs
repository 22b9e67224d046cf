//! Fixed-capacity body pools.
//!
//! Each category owns one [`BodyPool`]. The pool is a ring buffer in spawn
//! order: the front is always the oldest live body, so evict-oldest is a
//! single pop. Capacity is reserved up front and never grows.

use crate::body::{FreeBody, LifecycleState};
use std::collections::VecDeque;

/// What to do when a pool is full.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Drop the oldest body to make room.
    #[default]
    EvictOldest,
    /// Refuse the new body.
    Reject,
}

/// Outcome of [`BodyPool::push`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inserted {
    Stored,
    /// Stored after evicting the oldest body.
    Evicted,
    Rejected,
}

impl Inserted {
    pub fn stored(self) -> bool {
        self != Inserted::Rejected
    }
}

/// Bounded collection of free bodies for one category.
#[derive(Clone, Debug)]
pub struct BodyPool {
    bodies: VecDeque<FreeBody>,
    capacity: usize,
    policy: EvictionPolicy,
    next_serial: u64,
}

impl BodyPool {
    /// Pool holding at most `capacity` bodies, evicting the oldest when full.
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, EvictionPolicy::EvictOldest)
    }

    pub fn with_policy(capacity: usize, policy: EvictionPolicy) -> Self {
        Self {
            bodies: VecDeque::with_capacity(capacity),
            capacity,
            policy,
            next_serial: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.bodies.len() >= self.capacity
    }

    /// Insert a body, applying the eviction policy if the pool is full.
    pub fn push(&mut self, mut body: FreeBody) -> Inserted {
        if self.capacity == 0 {
            return Inserted::Rejected;
        }
        let mut outcome = Inserted::Stored;
        if self.is_full() {
            match self.policy {
                EvictionPolicy::Reject => return Inserted::Rejected,
                EvictionPolicy::EvictOldest => {
                    self.bodies.pop_front();
                    outcome = Inserted::Evicted;
                }
            }
        }
        body.serial = self.next_serial;
        self.next_serial += 1;
        self.bodies.push_back(body);
        outcome
    }

    /// Drop every body in the `Dead` state. Returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.bodies.len();
        self.bodies.retain(|b| b.state != LifecycleState::Dead);
        before - self.bodies.len()
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    /// Bodies oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &FreeBody> {
        self.bodies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FreeBody> {
        self.bodies.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&FreeBody> {
        self.bodies.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut FreeBody> {
        self.bodies.get_mut(index)
    }

    /// Resting bodies.
    pub fn settled(&self) -> impl Iterator<Item = &FreeBody> {
        self.bodies.iter().filter(|b| b.is_settled())
    }

    /// Bodies still in the air.
    pub fn falling(&self) -> impl Iterator<Item = &FreeBody> {
        self.bodies.iter().filter(|b| b.is_falling())
    }

    /// Index of the live body matching `pred` closest to `point` within `radius`.
    pub fn nearest(
        &self,
        point: glam::Vec2,
        radius: f32,
        pred: impl Fn(&FreeBody) -> bool,
    ) -> Option<usize> {
        self.bodies
            .iter()
            .enumerate()
            .filter(|(_, b)| b.is_alive() && pred(b))
            .map(|(i, b)| (i, b.position.distance(point)))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyKind;
    use glam::Vec2;

    fn leaf(x: f32) -> FreeBody {
        FreeBody::new(BodyKind::Leaf, Vec2::new(x, 0.0))
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut pool = BodyPool::new(8);
        for i in 0..100 {
            pool.push(leaf(i as f32));
            assert!(pool.len() <= 8);
        }
        assert_eq!(pool.len(), 8);
    }

    #[test]
    fn test_evicts_oldest() {
        let mut pool = BodyPool::new(3);
        for i in 0..5 {
            pool.push(leaf(i as f32));
        }
        let xs: Vec<f32> = pool.iter().map(|b| b.position.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_reject_policy() {
        let mut pool = BodyPool::with_policy(2, EvictionPolicy::Reject);
        assert_eq!(pool.push(leaf(0.0)), Inserted::Stored);
        assert_eq!(pool.push(leaf(1.0)), Inserted::Stored);
        assert_eq!(pool.push(leaf(2.0)), Inserted::Rejected);
        assert_eq!(pool.iter().last().unwrap().position.x, 1.0);
    }

    #[test]
    fn test_zero_capacity_rejects() {
        let mut pool = BodyPool::new(0);
        assert!(!pool.push(leaf(0.0)).stored());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_sweep_removes_dead() {
        let mut pool = BodyPool::new(4);
        for i in 0..4 {
            pool.push(leaf(i as f32));
        }
        pool.get_mut(1).unwrap().kill();
        assert_eq!(pool.sweep(), 1);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_serials_increase() {
        let mut pool = BodyPool::new(2);
        for i in 0..4 {
            pool.push(leaf(i as f32));
        }
        let serials: Vec<u64> = pool.iter().map(|b| b.serial).collect();
        assert_eq!(serials, vec![2, 3]);
    }

    #[test]
    fn test_nearest_within_radius() {
        let mut pool = BodyPool::new(4);
        pool.push(leaf(0.0));
        pool.push(leaf(10.0));
        pool.push(leaf(30.0));
        assert_eq!(pool.nearest(Vec2::new(12.0, 0.0), 5.0, |_| true), Some(1));
        assert_eq!(pool.nearest(Vec2::new(20.0, 0.0), 5.0, |_| true), None);
    }
}
