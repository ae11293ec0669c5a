//! Decoration spawner
//!
//! Produces object descriptors (visual, collision shape, mass, pivot offset)
//! for each object kind and scatters them over the ground with a seeded RNG.
//! The hole never sees the kind; it only gets positions and radii.

use glam::{Vec2, Vec3};
use rand::Rng;
use rand_pcg::Pcg32;

use super::physics::CollisionShape;
use crate::ground_to_world;
use crate::scene::{Part, SceneNode, ShapeSpec};
use crate::tuning::Tuning;

/// Object colours
pub mod colors {
    pub const TRUNK: [f32; 4] = [0.45, 0.3, 0.18, 1.0];
    pub const LEAVES: [f32; 4] = [0.18, 0.55, 0.25, 1.0];
    pub const ROCK: [f32; 4] = [0.55, 0.55, 0.58, 1.0];
    pub const STEM: [f32; 4] = [0.3, 0.65, 0.3, 1.0];
    pub const BLOOM: [f32; 4] = [0.95, 0.45, 0.65, 1.0];
    pub const GRASS: [f32; 4] = [0.4, 0.75, 0.3, 1.0];
    pub const CRATE: [f32; 4] = [0.75, 0.55, 0.3, 1.0];
}

/// Kinds of swallowable object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Tree,
    Rock,
    Flower,
    Grass,
    Crate,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Tree => "tree",
            ObjectKind::Rock => "rock",
            ObjectKind::Flower => "flower",
            ObjectKind::Grass => "grass",
            ObjectKind::Crate => "crate",
        }
    }

    /// Weighted random pick (trees most common, crates rare)
    pub fn random(rng: &mut Pcg32) -> Self {
        match rng.random_range(0..10) {
            0..=2 => ObjectKind::Tree,
            3..=4 => ObjectKind::Rock,
            5..=6 => ObjectKind::Flower,
            7..=8 => ObjectKind::Grass,
            _ => ObjectKind::Crate,
        }
    }
}

/// Everything the world needs to create one object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDescriptor {
    pub kind: ObjectKind,
    pub visual: SceneNode,
    pub collision: CollisionShape,
    pub mass: f32,
    /// Collider offset from the body origin (the visual pivot)
    pub pivot_offset: Option<Vec3>,
}

/// Build a descriptor for `kind`, with a little size variation
pub fn describe(kind: ObjectKind, rng: &mut Pcg32) -> ObjectDescriptor {
    let scale: f32 = rng.random_range(0.8..1.2);
    match kind {
        ObjectKind::Tree => {
            let trunk_h = 1.0 * scale;
            let crown_h = 1.4 * scale;
            let crown_r = 0.6 * scale;
            let half_height = (trunk_h + crown_h) / 2.0;
            ObjectDescriptor {
                kind,
                visual: SceneNode::new(vec![
                    Part::new(
                        ShapeSpec::Cylinder {
                            radius_top: 0.12 * scale,
                            radius_bottom: 0.16 * scale,
                            height: trunk_h,
                        },
                        colors::TRUNK,
                        Vec3::new(0.0, trunk_h / 2.0, 0.0),
                    ),
                    Part::new(
                        ShapeSpec::Cone {
                            radius: crown_r,
                            height: crown_h,
                        },
                        colors::LEAVES,
                        Vec3::new(0.0, trunk_h + crown_h / 2.0, 0.0),
                    ),
                ]),
                collision: CollisionShape::Cylinder {
                    half_height,
                    radius: crown_r * 0.75,
                },
                mass: 3.0 * scale,
                pivot_offset: Some(Vec3::new(0.0, half_height, 0.0)),
            }
        }
        ObjectKind::Rock => {
            let radius = 0.45 * scale;
            ObjectDescriptor {
                kind,
                visual: SceneNode::new(vec![Part::new(
                    ShapeSpec::Sphere { radius },
                    colors::ROCK,
                    Vec3::ZERO,
                )]),
                collision: CollisionShape::Ball { radius },
                mass: 4.0 * scale,
                pivot_offset: None,
            }
        }
        ObjectKind::Flower => {
            let stem_h = 0.5 * scale;
            let bloom_r = 0.15 * scale;
            let half_height = (stem_h + bloom_r * 2.0) / 2.0;
            ObjectDescriptor {
                kind,
                visual: SceneNode::new(vec![
                    Part::new(
                        ShapeSpec::Cylinder {
                            radius_top: 0.03,
                            radius_bottom: 0.04,
                            height: stem_h,
                        },
                        colors::STEM,
                        Vec3::new(0.0, stem_h / 2.0, 0.0),
                    ),
                    Part::new(
                        ShapeSpec::Sphere { radius: bloom_r },
                        colors::BLOOM,
                        Vec3::new(0.0, stem_h + bloom_r, 0.0),
                    ),
                ]),
                collision: CollisionShape::Cylinder {
                    half_height,
                    radius: bloom_r,
                },
                mass: 0.3 * scale,
                pivot_offset: Some(Vec3::new(0.0, half_height, 0.0)),
            }
        }
        ObjectKind::Grass => {
            let height = 0.4 * scale;
            let blade = |x: f32, z: f32| {
                Part::new(
                    ShapeSpec::Cone {
                        radius: 0.06,
                        height,
                    },
                    colors::GRASS,
                    Vec3::new(x, height / 2.0, z),
                )
            };
            ObjectDescriptor {
                kind,
                visual: SceneNode::new(vec![blade(-0.1, 0.0), blade(0.1, 0.05), blade(0.0, -0.1)]),
                collision: CollisionShape::Cone {
                    half_height: height / 2.0,
                    radius: 0.2,
                },
                mass: 0.2 * scale,
                pivot_offset: Some(Vec3::new(0.0, height / 2.0, 0.0)),
            }
        }
        ObjectKind::Crate => {
            let half = Vec3::splat(0.4 * scale);
            ObjectDescriptor {
                kind,
                visual: SceneNode::new(vec![Part::new(
                    ShapeSpec::Box { half_extents: half },
                    colors::CRATE,
                    Vec3::new(0.0, half.y, 0.0),
                )]),
                collision: CollisionShape::Cuboid { half_extents: half },
                mass: 2.0 * scale,
                pivot_offset: Some(Vec3::new(0.0, half.y, 0.0)),
            }
        }
    }
}

/// Scatter `tuning.object_count` objects over the spawn area, keeping clear of
/// the hole's start position. Positions are at the fixed spawn height.
pub fn scatter(rng: &mut Pcg32, tuning: &Tuning, hole_start: Vec2) -> Vec<(ObjectDescriptor, Vec3)> {
    let half = tuning.spawn_area_half;
    let clear = tuning.spawn_clear_radius;
    let mut placed = Vec::with_capacity(tuning.object_count);

    for _ in 0..tuning.object_count {
        let kind = ObjectKind::random(rng);
        let descriptor = describe(kind, rng);

        // Rejection sample outside the clear zone; give up after a few tries
        // rather than loop forever on a degenerate spawn area.
        let mut spot = None;
        for _ in 0..32 {
            let p = Vec2::new(rng.random_range(-half..=half), rng.random_range(-half..=half));
            if p.distance(hole_start) >= clear {
                spot = Some(p);
                break;
            }
        }
        let Some(spot) = spot else {
            log::warn!("No spawn spot found for {}", kind.as_str());
            continue;
        };

        placed.push((descriptor, ground_to_world(spot, tuning.spawn_height)));
    }

    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_scatter_is_deterministic() {
        let tuning = Tuning::default();
        let a = scatter(&mut Pcg32::seed_from_u64(42), &tuning, Vec2::ZERO);
        let b = scatter(&mut Pcg32::seed_from_u64(42), &tuning, Vec2::ZERO);
        assert_eq!(a.len(), tuning.object_count);
        assert_eq!(a, b);
    }

    #[test]
    fn test_scatter_respects_clear_zone_and_height() {
        let tuning = Tuning::default();
        let start = Vec2::new(2.0, -1.0);
        for (_, pos) in scatter(&mut Pcg32::seed_from_u64(7), &tuning, start) {
            assert!(Vec2::new(pos.x, pos.z).distance(start) >= tuning.spawn_clear_radius);
            assert!(pos.x.abs() <= tuning.spawn_area_half);
            assert!(pos.z.abs() <= tuning.spawn_area_half);
            assert_eq!(pos.y, tuning.spawn_height);
        }
    }

    #[test]
    fn test_descriptors_are_sane() {
        let mut rng = Pcg32::seed_from_u64(1);
        for kind in [
            ObjectKind::Tree,
            ObjectKind::Rock,
            ObjectKind::Flower,
            ObjectKind::Grass,
            ObjectKind::Crate,
        ] {
            let d = describe(kind, &mut rng);
            assert_eq!(d.kind, kind);
            assert!(d.mass > 0.0);
            assert!(!d.visual.parts.is_empty());
            assert!(d.collision.footprint_radius() > 0.0);
        }
    }

    #[test]
    fn test_tree_pivot_at_base() {
        let d = describe(ObjectKind::Tree, &mut Pcg32::seed_from_u64(3));
        let CollisionShape::Cylinder { half_height, .. } = d.collision else {
            panic!("tree should use a cylinder");
        };
        // Collider bottom sits at the body origin
        assert!((d.pivot_offset.unwrap().y - half_height).abs() < 1e-6);
    }
}
