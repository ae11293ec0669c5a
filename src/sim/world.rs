//! Per-frame world update
//!
//! Frame order:
//! 1. cap the elapsed time
//! 2. hole update (queued growth, movement, ring placement)
//! 3. physics step
//! 4. copy body poses onto scene nodes
//! 5. swallow / lost checks, disposal through one sink
//! 6. feed swallowed mass to the hole (applied next frame)

use std::collections::BTreeMap;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::hole::{Hole, HoleSnapshot};
use super::input::DirectionalInput;
use super::physics::{PhysicsWorld, RigidBodyHandle};
use super::spawner::{self, ObjectDescriptor, ObjectKind};
use super::swallow::{ObjectId, SwallowCandidate, SwallowSink, check_swallow};
use crate::scene::{Posable, Scene, sync_pose};
use crate::tuning::{SwallowRadius, Tuning};

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldEvent {
    Swallowed {
        id: ObjectId,
        kind: ObjectKind,
        mass: f32,
    },
    /// Fell out of the world without meeting the swallow rule
    Lost { id: ObjectId, kind: ObjectKind },
}

/// Running totals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SwallowStats {
    pub count: u32,
    pub mass: f32,
    pub lost: u32,
}

/// Bookkeeping for one live object
#[derive(Debug, Clone, Copy)]
struct WorldObject {
    kind: ObjectKind,
    body: RigidBodyHandle,
    mass: f32,
    radius: f32,
}

/// Removes objects from physics, the scene, and the registry together
struct Disposal<'a> {
    physics: &'a mut PhysicsWorld,
    scene: &'a mut Scene,
    objects: &'a mut BTreeMap<ObjectId, WorldObject>,
    removed: Vec<(ObjectId, WorldObject)>,
}

impl SwallowSink for Disposal<'_> {
    fn dispose(&mut self, id: ObjectId) -> bool {
        let Some(object) = self.objects.remove(&id) else {
            return false;
        };
        self.physics.remove(object.body);
        self.scene.remove(id);
        self.removed.push((id, object));
        true
    }
}

/// The whole playable world
pub struct World {
    tuning: Tuning,
    hole: Hole,
    /// Hole state used by everything during the current frame
    frame: HoleSnapshot,
    physics: PhysicsWorld,
    scene: Scene,
    objects: BTreeMap<ObjectId, WorldObject>,
    stats: SwallowStats,
    next_id: ObjectId,
    /// Ticks since creation
    pub time_ticks: u64,
}

impl World {
    /// Build a world with the hole at the origin and `tuning.object_count`
    /// objects scattered around it
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let mut physics = PhysicsWorld::new(tuning.gravity);
        let hole = Hole::new(&mut physics, &tuning, glam::Vec2::ZERO);
        let frame = hole.snapshot();

        let mut world = Self {
            tuning,
            hole,
            frame,
            physics,
            scene: Scene::new(),
            objects: BTreeMap::new(),
            stats: SwallowStats::default(),
            next_id: 1,
            time_ticks: 0,
        };

        let mut rng = Pcg32::seed_from_u64(seed);
        for (descriptor, position) in spawner::scatter(&mut rng, &world.tuning, frame.position) {
            world.spawn(descriptor, position);
        }

        log::info!(
            "World created: seed {seed}, {} objects, hole radius {:.2}",
            world.objects.len(),
            frame.radius
        );
        world
    }

    /// Add one object to physics and the scene
    pub fn spawn(&mut self, descriptor: ObjectDescriptor, position: Vec3) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;

        let body = self.physics.add_dynamic(
            position,
            &descriptor.collision,
            descriptor.mass,
            descriptor.pivot_offset,
        );
        let radius = match self.tuning.swallow_radius {
            SwallowRadius::Fixed(r) => r,
            SwallowRadius::FromShape => descriptor.collision.footprint_radius(),
        };

        let mut node = descriptor.visual;
        node.set_pose(position, glam::Quat::IDENTITY);
        self.scene.insert(id, node);
        self.objects.insert(
            id,
            WorldObject {
                kind: descriptor.kind,
                body,
                mass: descriptor.mass,
                radius,
            },
        );
        id
    }

    /// Remove an object outright. Returns false if it is already gone.
    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        let mut sink = self.disposal();
        sink.dispose(id)
    }

    /// Advance one frame
    pub fn tick(&mut self, input: &DirectionalInput, dt: f32) -> Vec<WorldEvent> {
        let dt = dt.min(self.tuning.max_frame_dt);
        if dt <= 0.0 {
            return Vec::new();
        }
        self.time_ticks += 1;

        self.frame = self.hole.update(input, dt, &mut self.physics);
        self.physics.step(dt);

        let mut candidates = Vec::with_capacity(self.objects.len());
        for (&id, object) in &self.objects {
            let Some(pose) = self.physics.pose(object.body) else {
                continue;
            };
            if let Some(node) = self.scene.get_mut(id) {
                sync_pose(node, pose.position, pose.rotation);
            }
            candidates.push(SwallowCandidate {
                id,
                position: pose.position,
                radius: object.radius,
            });
        }

        let frame = self.frame;
        let depth_threshold = self.tuning.depth_threshold;
        let lost_depth = self.tuning.lost_depth;

        // One entry per successful disposal, in the same order as `removed`
        let mut swallowed_flags = Vec::new();
        let removed = {
            let mut sink = self.disposal();
            for candidate in &candidates {
                if check_swallow(candidate, &frame, depth_threshold, &mut sink) {
                    swallowed_flags.push(true);
                } else if candidate.position.y < lost_depth && sink.dispose(candidate.id) {
                    swallowed_flags.push(false);
                }
            }
            sink.removed
        };

        let mut events = Vec::with_capacity(removed.len());
        for ((id, object), swallowed) in removed.into_iter().zip(swallowed_flags) {
            if swallowed {
                self.hole.feed(object.mass);
                self.stats.count += 1;
                self.stats.mass += object.mass;
                log::info!(
                    "Swallowed {} #{id} (mass {:.2}), radius -> {:.2}",
                    object.kind.as_str(),
                    object.mass,
                    self.hole.target_radius()
                );
                events.push(WorldEvent::Swallowed {
                    id,
                    kind: object.kind,
                    mass: object.mass,
                });
            } else {
                self.stats.lost += 1;
                log::debug!("Lost {} #{id} below {lost_depth}", object.kind.as_str());
                events.push(WorldEvent::Lost {
                    id,
                    kind: object.kind,
                });
            }
        }

        events
    }

    fn disposal(&mut self) -> Disposal<'_> {
        Disposal {
            physics: &mut self.physics,
            scene: &mut self.scene,
            objects: &mut self.objects,
            removed: Vec::new(),
        }
    }

    /// Hole state the current frame was simulated and should be drawn with
    pub fn hole_snapshot(&self) -> HoleSnapshot {
        self.frame
    }

    pub fn hole(&self) -> &Hole {
        &self.hole
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn stats(&self) -> SwallowStats {
        self.stats
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn object_kind(&self, id: ObjectId) -> Option<ObjectKind> {
        self.objects.get(&id).map(|o| o.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Part, SceneNode, ShapeSpec};
    use crate::sim::input::Direction;
    use crate::sim::physics::CollisionShape;

    const DT: f32 = 1.0 / 60.0;

    fn empty_world() -> World {
        let tuning = Tuning {
            object_count: 0,
            ..Tuning::default()
        };
        World::new(tuning, 0)
    }

    fn rock(radius: f32, mass: f32) -> ObjectDescriptor {
        ObjectDescriptor {
            kind: ObjectKind::Rock,
            visual: SceneNode::new(vec![Part::new(
                ShapeSpec::Sphere { radius },
                [0.5; 4],
                Vec3::ZERO,
            )]),
            collision: CollisionShape::Ball { radius },
            mass,
            pivot_offset: None,
        }
    }

    fn crate_box(half: f32, mass: f32) -> ObjectDescriptor {
        let half_extents = Vec3::splat(half);
        ObjectDescriptor {
            kind: ObjectKind::Crate,
            visual: SceneNode::new(vec![Part::new(
                ShapeSpec::Box { half_extents },
                [0.5; 4],
                Vec3::new(0.0, half, 0.0),
            )]),
            collision: CollisionShape::Cuboid { half_extents },
            mass,
            pivot_offset: Some(Vec3::new(0.0, half, 0.0)),
        }
    }

    fn run(world: &mut World, frames: usize) -> Vec<WorldEvent> {
        let idle = DirectionalInput::default();
        (0..frames).flat_map(|_| world.tick(&idle, DT)).collect()
    }

    #[test]
    fn test_new_world_spawns_objects() {
        let world = World::new(Tuning::default(), 9);
        assert_eq!(world.object_count(), Tuning::default().object_count);
        assert_eq!(world.scene().len(), world.object_count());
    }

    #[test]
    fn test_object_over_hole_is_swallowed_once() {
        let mut world = empty_world();
        let id = world.spawn(rock(0.45, 2.0), Vec3::new(0.0, 2.0, 0.0));
        let start = world.hole_snapshot().radius;

        let events = run(&mut world, 240);
        assert_eq!(
            events,
            vec![WorldEvent::Swallowed {
                id,
                kind: ObjectKind::Rock,
                mass: 2.0
            }]
        );
        assert!(!world.contains(id));
        assert!(!world.scene().contains(id));
        assert_eq!(world.stats().count, 1);

        // Growth shows up on the following frame
        world.tick(&DirectionalInput::default(), DT);
        let expected = start + 2.0 * world.tuning().growth_per_mass;
        assert!((world.hole_snapshot().radius - expected).abs() < 1e-5);
    }

    #[test]
    fn test_object_away_from_hole_rests_on_ground() {
        let mut world = empty_world();
        let id = world.spawn(rock(0.45, 2.0), Vec3::new(10.0, 2.0, 0.0));
        let events = run(&mut world, 180);
        assert!(events.is_empty());
        let y = world.scene().get(id).unwrap().position().y;
        assert!((y - 0.45).abs() < 0.1, "resting height {y}");
    }

    #[test]
    fn test_moving_hole_leaves_distant_objects_in_place() {
        let mut world = empty_world();
        let id = world.spawn(crate_box(0.4, 2.0), Vec3::new(0.0, 1.0, -15.0));
        assert!(run(&mut world, 120).is_empty());
        let before = world.scene().get(id).unwrap().position();

        let right = DirectionalInput::holding(&[Direction::Right]);
        for _ in 0..120 {
            assert!(world.tick(&right, DT).is_empty());
        }
        assert!(world.hole_snapshot().position.x > 10.0);

        let after = world.scene().get(id).unwrap().position();
        assert!(
            after.distance(before) < 0.05,
            "object moved from {before} to {after}"
        );
    }

    #[test]
    fn test_hole_driven_under_resting_object_swallows_it() {
        let mut world = empty_world();
        let id = world.spawn(rock(0.45, 2.0), Vec3::new(6.0, 1.0, 0.0));
        assert!(run(&mut world, 120).is_empty());

        // Release once the remaining glide distance would stop the hole
        // roughly under the rock.
        let right = DirectionalInput::holding(&[Direction::Right]);
        let mut events = Vec::new();
        for _ in 0..120 {
            if world.hole_snapshot().position.x >= 4.4 {
                break;
            }
            events.extend(world.tick(&right, DT));
        }
        events.extend(run(&mut world, 240));

        assert!(
            events.contains(&WorldEvent::Swallowed {
                id,
                kind: ObjectKind::Rock,
                mass: 2.0
            }),
            "events: {events:?}"
        );
        assert!(!world.contains(id));
    }

    #[test]
    fn test_corner_fall_is_lost_not_swallowed() {
        let mut world = empty_world();
        // Inside the square opening, outside the circular hole
        let id = world.spawn(rock(0.1, 1.0), Vec3::new(1.3, 2.0, 1.3));
        let start = world.hole_snapshot().radius;

        let events = run(&mut world, 300);
        assert_eq!(
            events,
            vec![WorldEvent::Lost {
                id,
                kind: ObjectKind::Rock
            }]
        );
        assert_eq!(world.stats().count, 0);
        assert_eq!(world.stats().lost, 1);
        assert_eq!(world.hole_snapshot().radius, start);
    }

    #[test]
    fn test_remove_object_is_idempotent() {
        let mut world = empty_world();
        let id = world.spawn(rock(0.3, 1.0), Vec3::new(5.0, 1.0, 5.0));
        assert!(world.remove_object(id));
        assert!(!world.remove_object(id));
        assert!(run(&mut world, 10).is_empty());
    }

    #[test]
    fn test_long_frame_is_capped() {
        let mut world = empty_world();
        let input = DirectionalInput::holding(&[Direction::Right]);
        world.tick(&input, 5.0);
        let cap = world.tuning().max_frame_dt;
        let snap = world.hole_snapshot();
        assert!(snap.position.x <= world.tuning().max_speed * cap + 1e-4);
        assert!(snap.position.x > 0.0);
    }

    #[test]
    fn test_zero_dt_is_a_no_op() {
        let mut world = empty_world();
        let before = world.hole_snapshot();
        assert!(world.tick(&DirectionalInput::holding(&[Direction::Up]), 0.0).is_empty());
        assert_eq!(world.hole_snapshot(), before);
        assert_eq!(world.time_ticks, 0);
    }
}
