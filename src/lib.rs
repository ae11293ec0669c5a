//! Sinkhole - a hole that swallows a scattered 3D scene
//!
//! Core modules:
//! - `sim`: Simulation (hole movement, ground ring physics, swallow detection, world tick)
//! - `scene`: Render-agnostic scene graph for object visuals
//! - `renderer`: WebGPU stencil composition and draw submission
//! - `tuning`: Data-driven gameplay constants
//! - `settings`: Player preferences (LocalStorage on web)

pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::{QualityPreset, Settings};
pub use tuning::{SwallowRadius, Tuning, TuningError};

use glam::{Vec2, Vec3};

/// Game configuration constants
pub mod consts {
    /// Height of the ground plane. Everything "below ground" has y < GROUND_Y.
    pub const GROUND_Y: f32 = 0.0;

    /// Largest elapsed time a single frame may advance the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Nominal frame step used when no previous timestamp exists
    pub const NOMINAL_DT: f32 = 1.0 / 60.0;

    /// Hole defaults
    pub const HOLE_START_RADIUS: f32 = 1.5;
    pub const HOLE_MAX_RADIUS: f32 = 12.0;
    /// Radius gained per unit of swallowed mass
    pub const HOLE_GROWTH_PER_MASS: f32 = 0.04;

    /// Hole movement (units/s², units/s)
    pub const HOLE_ACCELERATION: f32 = 40.0;
    pub const HOLE_MAX_SPEED: f32 = 8.0;
    pub const HOLE_FRICTION: f32 = 20.0;

    /// Half extent of each ground ring segment. Large enough that the ring's
    /// outer edges sit far beyond the play area.
    pub const RING_HALF_EXTENT: f32 = 100.0;
    /// Vertical thickness of the ring colliders
    pub const RING_THICKNESS: f32 = 1.0;

    /// An object must fall below this height to count as swallowed
    pub const DEPTH_THRESHOLD: f32 = -5.0;
    /// Objects below this height are discarded as lost
    pub const LOST_DEPTH: f32 = -30.0;

    /// Playable square half size (the hole is clamped inside it)
    pub const PLAY_AREA_HALF: f32 = 25.0;

    /// Object spawning
    pub const SPAWN_HEIGHT: f32 = 2.0;
    pub const SPAWN_AREA_HALF: f32 = 22.0;
    pub const SPAWN_CLEAR_RADIUS: f32 = 4.0;
    pub const OBJECT_COUNT: usize = 80;

    /// Gravity (units/s², applied along -Y)
    pub const GRAVITY: f32 = 9.81;

    /// Stencil reference shared by the mask, ground and interior
    pub const HOLE_STENCIL_REF: u32 = 1;
    /// Mask disk lift above the ground plane (avoids z-fighting)
    pub const MASK_LIFT: f32 = 0.01;
    /// Depth of the visual interior shaft
    pub const INTERIOR_DEPTH: f32 = 8.0;
}

/// Lift a ground-plane coordinate (x, z) into world space at height `y`
#[inline]
pub fn ground_to_world(p: Vec2, y: f32) -> Vec3 {
    Vec3::new(p.x, y, p.y)
}

/// Project a world position onto the ground plane as (x, z)
#[inline]
pub fn planar(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}
