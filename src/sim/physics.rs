//! Rigid body registry backed by rapier3d
//!
//! Owns the rapier sets and pipeline. Swallowable objects get one dynamic
//! body each; the ground ring gets four kinematic position-based bodies that
//! are teleported into place before every step.

use glam::{Quat, Vec3};
use rapier3d::prelude::*;

pub use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};

/// Collision geometry of a swallowable object
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionShape {
    Ball { radius: f32 },
    Cuboid { half_extents: Vec3 },
    /// Y-aligned cylinder
    Cylinder { half_height: f32, radius: f32 },
    /// Y-aligned cone, apex up
    Cone { half_height: f32, radius: f32 },
}

impl CollisionShape {
    /// Radius of the shape's horizontal footprint
    pub fn footprint_radius(&self) -> f32 {
        match *self {
            CollisionShape::Ball { radius } => radius,
            CollisionShape::Cuboid { half_extents } => {
                (half_extents.x * half_extents.x + half_extents.z * half_extents.z).sqrt()
            }
            CollisionShape::Cylinder { radius, .. } | CollisionShape::Cone { radius, .. } => radius,
        }
    }

    fn collider(&self) -> ColliderBuilder {
        match *self {
            CollisionShape::Ball { radius } => ColliderBuilder::ball(radius),
            CollisionShape::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            CollisionShape::Cylinder {
                half_height,
                radius,
            } => ColliderBuilder::cylinder(half_height, radius),
            CollisionShape::Cone {
                half_height,
                radius,
            } => ColliderBuilder::cone(half_height, radius),
        }
    }
}

/// World-space position and orientation of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

/// Owner of every rigid body in the scene
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Empty world with gravity pulling along -Y
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity: vector![0.0, -gravity, 0.0],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Add a dynamic body. The collider is offset by `pivot_offset` from the
    /// body origin, so the body origin stays at the visual pivot.
    pub fn add_dynamic(
        &mut self,
        position: Vec3,
        shape: &CollisionShape,
        mass: f32,
        pivot_offset: Option<Vec3>,
    ) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .can_sleep(false)
            .ccd_enabled(true)
            .build();
        let handle = self.bodies.insert(body);

        let offset = pivot_offset.unwrap_or(Vec3::ZERO);
        let collider = shape
            .collider()
            .translation(vector![offset.x, offset.y, offset.z])
            .mass(mass)
            .friction(0.6)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Add a kinematic cuboid whose placement is driven from outside
    pub fn add_kinematic_cuboid(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(vector![center.x, center.y, center.z])
            .build();
        let handle = self.bodies.insert(body);
        let collider =
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build();
        let collider = self
            .colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        (handle, collider)
    }

    /// Teleport a kinematic body. Current and next positions are both set, so
    /// the body carries no velocity and never drags what rests on it.
    pub fn move_kinematic(&mut self, handle: RigidBodyHandle, center: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_translation(vector![center.x, center.y, center.z], true);
        }
    }

    /// Reshape an existing cuboid collider in place
    pub fn resize_cuboid(&mut self, handle: ColliderHandle, half_extents: Vec3) {
        if let Some(collider) = self.colliders.get_mut(handle) {
            collider.set_shape(SharedShape::cuboid(
                half_extents.x,
                half_extents.y,
                half_extents.z,
            ));
        }
    }

    /// Remove a body and its colliders. Returns false when the body is
    /// already gone, so repeated removal is harmless.
    pub fn remove(&mut self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    /// Current pose of a body, if it still exists
    pub fn pose(&self, handle: RigidBodyHandle) -> Option<Pose> {
        let body = self.bodies.get(handle)?;
        let t = body.translation();
        let q = body.rotation().coords;
        Some(Pose {
            position: Vec3::new(t.x, t.y, t.z),
            rotation: Quat::from_xyzw(q.x, q.y, q.z, q.w),
        })
    }

    /// Number of live bodies (objects + ring)
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Advance the simulation by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }
}
