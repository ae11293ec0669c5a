//! Swallow detection and object disposal
//!
//! An object is swallowed once it is fully inside the hole horizontally
//! (distance + own radius strictly less than the hole radius) and has fallen
//! below the depth threshold. Disposal goes through a `SwallowSink`, which
//! reports whether it actually removed anything, so checking an object that
//! is already gone is a no-op.

use glam::Vec3;

use super::hole::HoleSnapshot;
use crate::planar;

/// Identifier of a swallowable object
pub type ObjectId = u32;

/// What the swallow test needs to know about one object this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwallowCandidate {
    pub id: ObjectId,
    /// World position of the body
    pub position: Vec3,
    /// Approximate horizontal radius
    pub radius: f32,
}

/// Receives removal requests for swallowed objects
pub trait SwallowSink {
    /// Remove the object from physics and from the scene. Returns false when
    /// it was already removed.
    fn dispose(&mut self, id: ObjectId) -> bool;
}

/// Pure swallow rule
pub fn is_swallowed(candidate: &SwallowCandidate, hole: &HoleSnapshot, depth_threshold: f32) -> bool {
    let distance = planar(candidate.position).distance(hole.position);
    let contained = distance + candidate.radius < hole.radius;
    let below = candidate.position.y < depth_threshold;
    contained && below
}

/// Evaluate one object and dispose of it if swallowed.
///
/// Returns true only on the frame the object is actually removed.
pub fn check_swallow<S: SwallowSink>(
    candidate: &SwallowCandidate,
    hole: &HoleSnapshot,
    depth_threshold: f32,
    sink: &mut S,
) -> bool {
    is_swallowed(candidate, hole, depth_threshold) && sink.dispose(candidate.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use std::collections::HashSet;

    const THRESHOLD: f32 = -5.0;

    fn hole() -> HoleSnapshot {
        HoleSnapshot {
            position: Vec2::ZERO,
            radius: 1.5,
            velocity: Vec2::ZERO,
        }
    }

    fn at(x: f32, y: f32) -> SwallowCandidate {
        SwallowCandidate {
            id: 7,
            position: Vec3::new(x, y, 0.0),
            radius: 0.5,
        }
    }

    /// Sink that tracks which objects are still alive
    struct Registry {
        alive: HashSet<ObjectId>,
        removals: u32,
    }

    impl SwallowSink for Registry {
        fn dispose(&mut self, id: ObjectId) -> bool {
            let removed = self.alive.remove(&id);
            if removed {
                self.removals += 1;
            }
            removed
        }
    }

    #[test]
    fn test_centered_and_deep_is_swallowed() {
        assert!(is_swallowed(&at(0.0, -6.0), &hole(), THRESHOLD));
    }

    #[test]
    fn test_overlapping_edge_is_not_swallowed() {
        // 1.2 + 0.5 = 1.7, not < 1.5
        assert!(!is_swallowed(&at(1.2, -6.0), &hole(), THRESHOLD));
    }

    #[test]
    fn test_above_threshold_is_not_swallowed() {
        assert!(!is_swallowed(&at(0.0, -2.0), &hole(), THRESHOLD));
    }

    #[test]
    fn test_exact_fit_is_not_swallowed() {
        // distance + radius == hole radius stays supported
        assert!(!is_swallowed(&at(1.0, -6.0), &hole(), THRESHOLD));
        assert!(is_swallowed(&at(0.99, -6.0), &hole(), THRESHOLD));
    }

    #[test]
    fn test_exactly_at_threshold_is_not_swallowed() {
        assert!(!is_swallowed(&at(0.0, THRESHOLD), &hole(), THRESHOLD));
    }

    #[test]
    fn test_uses_ground_plane_distance() {
        let candidate = SwallowCandidate {
            id: 1,
            position: Vec3::new(0.3, -8.0, 0.4),
            radius: 0.4,
        };
        let mut h = hole();
        h.radius = 0.95;
        assert!(is_swallowed(&candidate, &h, THRESHOLD));
        h.radius = 0.85;
        assert!(!is_swallowed(&candidate, &h, THRESHOLD));
    }

    #[test]
    fn test_disposal_happens_once() {
        let mut registry = Registry {
            alive: HashSet::from([7]),
            removals: 0,
        };
        let candidate = at(0.0, -6.0);
        assert!(check_swallow(&candidate, &hole(), THRESHOLD, &mut registry));
        // Same object observed again in the same frame
        assert!(!check_swallow(&candidate, &hole(), THRESHOLD, &mut registry));
        assert!(!check_swallow(&candidate, &hole(), THRESHOLD, &mut registry));
        assert_eq!(registry.removals, 1);
    }

    #[test]
    fn test_not_swallowed_is_not_disposed() {
        let mut registry = Registry {
            alive: HashSet::from([7]),
            removals: 0,
        };
        assert!(!check_swallow(&at(1.2, -6.0), &hole(), THRESHOLD, &mut registry));
        assert_eq!(registry.removals, 0);
        assert!(registry.alive.contains(&7));
    }
}
