//! Hole movement integration
//!
//! Velocity accelerates toward the input direction while a key is held and
//! bleeds off by a constant friction deceleration otherwise. Friction never
//! overshoots zero, and speed is clamped to the maximum after every step.

use glam::Vec2;

/// Acceleration/friction constants for the hole
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementParams {
    /// Units/s² applied along the input direction
    pub acceleration: f32,
    /// Units/s² removed from the speed when no input is held
    pub friction: f32,
    /// Speed cap (units/s)
    pub max_speed: f32,
}

/// Advance velocity by one frame.
///
/// `axis` is the normalized input direction (zero when idle).
pub fn integrate_velocity(velocity: Vec2, axis: Vec2, params: &MovementParams, dt: f32) -> Vec2 {
    let next = if axis != Vec2::ZERO {
        velocity + axis * params.acceleration * dt
    } else {
        let speed = velocity.length();
        let slowed = (speed - params.friction * dt).max(0.0);
        if slowed == 0.0 {
            Vec2::ZERO
        } else {
            velocity * (slowed / speed)
        }
    };
    next.clamp_length_max(params.max_speed)
}

/// Advance position and velocity by one frame. Returns (position, velocity).
pub fn step(
    position: Vec2,
    velocity: Vec2,
    axis: Vec2,
    params: &MovementParams,
    dt: f32,
) -> (Vec2, Vec2) {
    let velocity = integrate_velocity(velocity, axis, params, dt);
    (position + velocity * dt, velocity)
}
