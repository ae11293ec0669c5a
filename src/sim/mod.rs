//! Simulation module
//!
//! Hole gameplay and physics. No rendering or platform dependencies:
//! - Elapsed-time steps, capped per frame
//! - Seeded RNG only
//! - Stable iteration order (by object ID)

pub mod hole;
pub mod input;
pub mod movement;
pub mod physics;
pub mod ring;
pub mod spawner;
pub mod swallow;
pub mod world;

pub use hole::{Hole, HoleSnapshot, HoleState};
pub use input::{Direction, DirectionalInput};
pub use movement::MovementParams;
pub use physics::{CollisionShape, PhysicsWorld, Pose};
pub use ring::{GroundRing, RingSide, SegmentPlacement, ring_placements};
pub use spawner::{ObjectDescriptor, ObjectKind};
pub use swallow::{ObjectId, SwallowCandidate, SwallowSink, check_swallow, is_swallowed};
pub use world::{SwallowStats, World, WorldEvent};
