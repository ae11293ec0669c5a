//! Ground ring: four kinematic slabs around the hole opening
//!
//! The ground has no real hole in it. Instead four large flat colliders sit on
//! the +X, -X, -Z and +Z sides of the hole and leave a square opening of half
//! width `radius` in the middle. The X slabs run the full depth of the ring,
//! the Z slabs fill the gap between them, so the four never overlap.
//!
//! ```text
//!            +----+---------+----+
//!            |    |   +Z    |    |
//!            | -X +---------+ +X |
//!            |    |  open   |    |
//!            |    +---------+    |
//!            |    |   -Z    |    |
//!            +----+---------+----+
//! ```

use glam::{Vec2, Vec3};

use super::hole::HoleSnapshot;
use super::physics::{ColliderHandle, PhysicsWorld, RigidBodyHandle};
use crate::consts::GROUND_Y;
use crate::ground_to_world;

/// Which side of the hole a segment covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingSide {
    PosX,
    NegX,
    NegZ,
    PosZ,
}

impl RingSide {
    pub const ALL: [RingSide; 4] = [RingSide::PosX, RingSide::NegX, RingSide::NegZ, RingSide::PosZ];

    /// Outward direction on the ground plane, as (x, z)
    pub fn outward(self) -> Vec2 {
        match self {
            RingSide::PosX => Vec2::X,
            RingSide::NegX => Vec2::NEG_X,
            RingSide::NegZ => Vec2::NEG_Y,
            RingSide::PosZ => Vec2::Y,
        }
    }
}

/// Where one segment sits for a given hole state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPlacement {
    pub side: RingSide,
    /// Collider center in world space
    pub center: Vec3,
    /// Cuboid half extents
    pub half_extents: Vec3,
}

impl SegmentPlacement {
    /// Ground-plane bounds as (min, max) in (x, z)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let c = Vec2::new(self.center.x, self.center.z);
        let h = Vec2::new(self.half_extents.x, self.half_extents.z);
        (c - h, c + h)
    }
}

/// Compute all four segment placements.
///
/// Each segment center is `hole ± (radius + half_extent)` along its axis, so
/// the inner edges sit exactly `radius` from the hole center. Segment tops are
/// flush with the ground plane.
pub fn ring_placements(hole: &HoleSnapshot, half_extent: f32, thickness: f32) -> [SegmentPlacement; 4] {
    let r = hole.radius;
    let y = GROUND_Y - thickness / 2.0;
    RingSide::ALL.map(|side| {
        let center = hole.position + side.outward() * (r + half_extent);
        let half_extents = match side {
            RingSide::PosX | RingSide::NegX => Vec3::new(half_extent, thickness / 2.0, r + 2.0 * half_extent),
            RingSide::NegZ | RingSide::PosZ => Vec3::new(r, thickness / 2.0, half_extent),
        };
        SegmentPlacement {
            side,
            center: ground_to_world(center, y),
            half_extents,
        }
    })
}

/// One kinematic segment registered with the physics world
#[derive(Debug, Clone, Copy)]
struct RingSegment {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    placement: SegmentPlacement,
}

/// The four ring segments, owned by the hole
#[derive(Debug)]
pub struct GroundRing {
    segments: [RingSegment; 4],
    half_extent: f32,
    thickness: f32,
}

impl GroundRing {
    /// Register the four segments around the initial hole state
    pub fn new(physics: &mut PhysicsWorld, hole: &HoleSnapshot, half_extent: f32, thickness: f32) -> Self {
        let segments = ring_placements(hole, half_extent, thickness).map(|placement| {
            let (body, collider) = physics.add_kinematic_cuboid(placement.center, placement.half_extents);
            RingSegment {
                body,
                collider,
                placement,
            }
        });
        Self {
            segments,
            half_extent,
            thickness,
        }
    }

    /// Move (and when the radius changed, reshape) the segments for this
    /// frame's hole state. Must run before the physics step of the same frame.
    pub fn sync(&mut self, physics: &mut PhysicsWorld, hole: &HoleSnapshot) {
        let placements = ring_placements(hole, self.half_extent, self.thickness);
        for (segment, placement) in self.segments.iter_mut().zip(placements) {
            if placement.half_extents != segment.placement.half_extents {
                physics.resize_cuboid(segment.collider, placement.half_extents);
            }
            physics.move_kinematic(segment.body, placement.center);
            segment.placement = placement;
        }
    }

    /// Placements applied by the latest `sync`
    pub fn placements(&self) -> [SegmentPlacement; 4] {
        self.segments.map(|s| s.placement)
    }

    pub fn half_extent(&self) -> f32 {
        self.half_extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snapshot(x: f32, z: f32, radius: f32) -> HoleSnapshot {
        HoleSnapshot {
            position: Vec2::new(x, z),
            radius,
            velocity: Vec2::ZERO,
        }
    }

    fn overlap(a: &SegmentPlacement, b: &SegmentPlacement) -> bool {
        let (amin, amax) = a.bounds();
        let (bmin, bmax) = b.bounds();
        let eps = 1e-3;
        amin.x < bmax.x - eps && bmin.x < amax.x - eps && amin.y < bmax.y - eps && bmin.y < amax.y - eps
    }

    #[test]
    fn test_placement_formula() {
        let hole = snapshot(3.0, -2.0, 1.5);
        let h = 100.0;
        let p = ring_placements(&hole, h, 1.0);
        assert_eq!(p[0].side, RingSide::PosX);
        assert!((p[0].center.x - (3.0 + 1.5 + h)).abs() < 1e-4);
        assert!((p[1].center.x - (3.0 - 1.5 - h)).abs() < 1e-4);
        assert!((p[2].center.z - (-2.0 - 1.5 - h)).abs() < 1e-4);
        assert!((p[3].center.z - (-2.0 + 1.5 + h)).abs() < 1e-4);
        // Tops flush with the ground
        for s in &p {
            assert!((s.center.y + s.half_extents.y - GROUND_Y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_opening_is_uncovered() {
        let hole = snapshot(0.0, 0.0, 2.0);
        let p = ring_placements(&hole, 50.0, 1.0);
        let center = Vec2::ZERO;
        for s in &p {
            let (min, max) = s.bounds();
            let inside = center.x > min.x && center.x < max.x && center.y > min.y && center.y < max.y;
            assert!(!inside, "{:?} covers the hole center", s.side);
        }
    }

    #[test]
    fn test_sync_moves_bodies() {
        let mut physics = PhysicsWorld::new(9.81);
        let mut ring = GroundRing::new(&mut physics, &snapshot(0.0, 0.0, 1.5), 100.0, 1.0);
        let moved = snapshot(4.0, 1.0, 2.5);
        ring.sync(&mut physics, &moved);
        physics.step(1.0 / 60.0);
        let expected = ring_placements(&moved, 100.0, 1.0);
        assert_eq!(ring.placements(), expected);
        for (segment, placement) in ring.segments.iter().zip(expected) {
            let pose = physics.pose(segment.body).unwrap();
            assert!((pose.position - placement.center).length() < 1e-3);
        }
    }

    proptest! {
        #[test]
        fn prop_ring_edges_track_radius(
            x in -25.0f32..25.0,
            z in -25.0f32..25.0,
            radius in 0.1f32..12.0,
        ) {
            let h = 100.0;
            let hole = snapshot(x, z, radius);
            let p = ring_placements(&hole, h, 1.0);

            prop_assert!((p[0].center.x - (x + radius + h)).abs() < 1e-3);
            prop_assert!((p[1].center.x - (x - radius - h)).abs() < 1e-3);
            prop_assert!((p[2].center.z - (z - radius - h)).abs() < 1e-3);
            prop_assert!((p[3].center.z - (z + radius + h)).abs() < 1e-3);

            // Inner edges form a square of half width `radius` around the hole
            let (min, _) = p[0].bounds();
            prop_assert!((min.x - (x + radius)).abs() < 1e-3);
            let (_, max) = p[1].bounds();
            prop_assert!((max.x - (x - radius)).abs() < 1e-3);
            let (_, max) = p[2].bounds();
            prop_assert!((max.y - (z - radius)).abs() < 1e-3);
            let (min, _) = p[3].bounds();
            prop_assert!((min.y - (z + radius)).abs() < 1e-3);

            for i in 0..4 {
                for j in (i + 1)..4 {
                    prop_assert!(!overlap(&p[i], &p[j]), "{:?} overlaps {:?}", p[i].side, p[j].side);
                }
            }
        }
    }
}
