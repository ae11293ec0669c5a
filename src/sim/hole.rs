//! The hole: movement, growth, and the ground ring it carries
//!
//! `HoleState` is only mutated here. Everything else (ring placement, swallow
//! checks, rendering) reads an immutable `HoleSnapshot` taken once per frame.

use glam::Vec2;

use super::input::DirectionalInput;
use super::movement::{self, MovementParams};
use super::physics::PhysicsWorld;
use super::ring::GroundRing;
use crate::tuning::Tuning;

/// Mutable hole state
#[derive(Debug, Clone, PartialEq)]
pub struct HoleState {
    /// Center on the ground plane, as (x, z)
    pub position: Vec2,
    /// Opening radius. Never decreases.
    pub radius: f32,
    /// Ground-plane velocity, as (x, z)
    pub velocity: Vec2,
}

/// Read-only view of the hole for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoleSnapshot {
    pub position: Vec2,
    pub radius: f32,
    pub velocity: Vec2,
}

/// The hole component
#[derive(Debug)]
pub struct Hole {
    state: HoleState,
    movement: MovementParams,
    max_radius: f32,
    growth_per_mass: f32,
    play_area_half: f32,
    /// Growth earned this frame, applied at the start of the next update
    pending_growth: f32,
    ring: GroundRing,
}

impl Hole {
    /// Create a hole at `position` and register its ground ring
    pub fn new(physics: &mut PhysicsWorld, tuning: &Tuning, position: Vec2) -> Self {
        let state = HoleState {
            position,
            radius: tuning.start_radius,
            velocity: Vec2::ZERO,
        };
        let snapshot = snapshot_of(&state);
        let ring = GroundRing::new(
            physics,
            &snapshot,
            tuning.ring_half_extent,
            tuning.ring_thickness,
        );
        Self {
            state,
            movement: MovementParams {
                acceleration: tuning.acceleration,
                friction: tuning.friction,
                max_speed: tuning.max_speed,
            },
            max_radius: tuning.max_radius,
            growth_per_mass: tuning.growth_per_mass,
            play_area_half: tuning.play_area_half,
            pending_growth: 0.0,
            ring,
        }
    }

    pub fn snapshot(&self) -> HoleSnapshot {
        snapshot_of(&self.state)
    }

    pub fn state(&self) -> &HoleState {
        &self.state
    }

    pub fn ring(&self) -> &GroundRing {
        &self.ring
    }

    /// Advance one frame: apply queued growth, integrate movement from input,
    /// then place the ring from the resulting state. Call before the physics
    /// step so objects collide with this frame's opening.
    pub fn update(
        &mut self,
        input: &DirectionalInput,
        dt: f32,
        physics: &mut PhysicsWorld,
    ) -> HoleSnapshot {
        self.apply_pending_growth();

        let (position, velocity) = movement::step(
            self.state.position,
            self.state.velocity,
            input.axis(),
            &self.movement,
            dt,
        );
        self.state.velocity = velocity;
        self.state.position = position;
        self.clamp_to_play_area();

        debug_assert!(self.state.velocity.length() <= self.movement.max_speed + 1e-4);

        let snapshot = self.snapshot();
        self.ring.sync(physics, &snapshot);
        snapshot
    }

    /// Queue growth for swallowing `mass`. Takes effect on the next update.
    pub fn feed(&mut self, mass: f32) {
        debug_assert!(mass >= 0.0, "negative mass fed to hole: {mass}");
        self.pending_growth += mass.max(0.0) * self.growth_per_mass;
    }

    /// Radius the hole will have after queued growth is applied
    pub fn target_radius(&self) -> f32 {
        (self.state.radius + self.pending_growth).min(self.max_radius.max(self.state.radius))
    }

    /// Set the radius directly. Shrinking is a programming error.
    pub fn set_radius(&mut self, radius: f32) {
        debug_assert!(
            radius >= self.state.radius,
            "hole radius decreased: {} -> {}",
            self.state.radius,
            radius
        );
        self.state.radius = radius.max(self.state.radius);
    }

    fn apply_pending_growth(&mut self) {
        if self.pending_growth > 0.0 {
            let target = self.target_radius();
            self.pending_growth = 0.0;
            self.set_radius(target);
        }
    }

    fn clamp_to_play_area(&mut self) {
        let limit = self.play_area_half;
        let pos = &mut self.state.position;
        let vel = &mut self.state.velocity;
        if pos.x.abs() > limit {
            pos.x = pos.x.clamp(-limit, limit);
            vel.x = 0.0;
        }
        if pos.y.abs() > limit {
            pos.y = pos.y.clamp(-limit, limit);
            vel.y = 0.0;
        }
    }
}

fn snapshot_of(state: &HoleState) -> HoleSnapshot {
    HoleSnapshot {
        position: state.position,
        radius: state.radius,
        velocity: state.velocity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::Direction;
    use crate::sim::ring::ring_placements;
    use proptest::prelude::*;

    fn hole() -> (Hole, PhysicsWorld) {
        let mut physics = PhysicsWorld::new(9.81);
        let hole = Hole::new(&mut physics, &Tuning::default(), Vec2::ZERO);
        (hole, physics)
    }

    #[test]
    fn test_update_moves_and_places_ring() {
        let (mut hole, mut physics) = hole();
        let input = DirectionalInput::holding(&[Direction::Right]);
        let snap = hole.update(&input, 0.1, &mut physics);
        assert!(snap.position.x > 0.0);
        let expected = ring_placements(&snap, hole.ring().half_extent(), 1.0);
        assert_eq!(hole.ring().placements(), expected);
    }

    #[test]
    fn test_growth_applies_next_frame() {
        let (mut hole, mut physics) = hole();
        let idle = DirectionalInput::default();
        let start = hole.snapshot().radius;

        hole.feed(10.0);
        // Not visible until the next update
        assert_eq!(hole.snapshot().radius, start);

        let snap = hole.update(&idle, 1.0 / 60.0, &mut physics);
        let expected = start + 10.0 * Tuning::default().growth_per_mass;
        assert!((snap.radius - expected).abs() < 1e-5);
        // Ring used the grown radius in the same frame
        let inner_edge = hole.ring().placements()[0].bounds().0.x;
        assert!((inner_edge - (snap.position.x + snap.radius)).abs() < 1e-3);
    }

    #[test]
    fn test_growth_caps_at_max() {
        let (mut hole, mut physics) = hole();
        hole.feed(1.0e6);
        let snap = hole.update(&DirectionalInput::default(), 0.01, &mut physics);
        assert_eq!(snap.radius, Tuning::default().max_radius);
    }

    #[test]
    fn test_clamped_to_play_area() {
        let (mut hole, mut physics) = hole();
        let input = DirectionalInput::holding(&[Direction::Left]);
        let mut snap = hole.snapshot();
        for _ in 0..1000 {
            snap = hole.update(&input, 0.05, &mut physics);
        }
        let limit = Tuning::default().play_area_half;
        assert_eq!(snap.position.x, -limit);
        assert_eq!(snap.velocity.x, 0.0);
    }

    #[test]
    #[should_panic(expected = "hole radius decreased")]
    #[cfg(debug_assertions)]
    fn test_shrinking_is_a_fault() {
        let (mut hole, _physics) = hole();
        hole.set_radius(0.5);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]
        #[test]
        fn prop_radius_monotonic_and_speed_bounded(
            frames in prop::collection::vec((0u8..16, 0.0f32..0.1, 0.0f32..5.0), 1..60)
        ) {
            let (mut hole, mut physics) = hole();
            let max_speed = Tuning::default().max_speed;
            let mut last_radius = hole.snapshot().radius;
            for (keys, dt, mass) in frames {
                let mut input = DirectionalInput::default();
                for (bit, d) in [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
                    .into_iter()
                    .enumerate()
                {
                    if keys & (1 << bit) != 0 {
                        input.press(d);
                    }
                }
                hole.feed(mass);
                let snap = hole.update(&input, dt, &mut physics);
                prop_assert!(snap.radius >= last_radius);
                prop_assert!(snap.velocity.length() <= max_speed + 1e-4);
                last_radius = snap.radius;
            }
        }
    }
}
