//! Follow camera
//!
//! Eases toward the hole every frame and backs off as the radius grows, so
//! the opening keeps a similar share of the screen.

use glam::{Mat4, Vec3};

use crate::ground_to_world;
use crate::sim::HoleSnapshot;

/// Camera that trails the hole from above and behind, pulling back as the
/// hole grows. Not part of the simulation.
#[derive(Debug, Clone)]
pub struct FollowCamera {
    /// Smoothed look-at point on the ground
    pub target: Vec3,
    /// Current distance from the target
    pub distance: f32,
    /// Elevation angle above the ground plane
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Distance at the starting radius, plus this much per unit of radius
    pub base_distance: f32,
    pub distance_per_radius: f32,
    /// Exponential follow rate (1/s)
    pub follow_rate: f32,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 18.0,
            pitch: 55.0_f32.to_radians(),
            fov: 50.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
            base_distance: 14.0,
            distance_per_radius: 3.0,
            follow_rate: 6.0,
        }
    }
}

impl FollowCamera {
    /// Distance the camera settles at for a given hole radius
    pub fn desired_distance(&self, radius: f32) -> f32 {
        self.base_distance + radius * self.distance_per_radius
    }

    /// Ease toward the hole
    pub fn follow(&mut self, hole: &HoleSnapshot, dt: f32) {
        let goal = ground_to_world(hole.position, 0.0);
        let k = 1.0 - (-self.follow_rate * dt).exp();
        self.target = self.target.lerp(goal, k);
        self.distance += (self.desired_distance(hole.radius) - self.distance) * k;
    }

    /// Jump straight to the hole (first frame)
    pub fn snap_to(&mut self, hole: &HoleSnapshot) {
        self.target = ground_to_world(hole.position, 0.0);
        self.distance = self.desired_distance(hole.radius);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn eye(&self) -> Vec3 {
        // Behind the target along +Z, looking toward -Z
        self.target + Vec3::new(0.0, self.pitch.sin(), self.pitch.cos()) * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn hole(x: f32, z: f32, radius: f32) -> HoleSnapshot {
        HoleSnapshot {
            position: Vec2::new(x, z),
            radius,
            velocity: Vec2::ZERO,
        }
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let mut cam = FollowCamera::default();
        cam.snap_to(&hole(4.0, -3.0, 1.5));
        let clip = cam.view_projection() * cam.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_pulls_back_as_hole_grows() {
        let mut cam = FollowCamera::default();
        cam.snap_to(&hole(0.0, 0.0, 1.5));
        let near = cam.eye().distance(cam.target);
        for _ in 0..300 {
            cam.follow(&hole(0.0, 0.0, 6.0), 1.0 / 60.0);
        }
        assert!(cam.eye().distance(cam.target) > near);
    }

    #[test]
    fn test_follow_converges() {
        let mut cam = FollowCamera::default();
        for _ in 0..600 {
            cam.follow(&hole(10.0, 5.0, 1.5), 1.0 / 60.0);
        }
        assert!((cam.target - Vec3::new(10.0, 0.0, 5.0)).length() < 1e-2);
    }
}
