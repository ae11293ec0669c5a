//! Data-driven gameplay tuning
//!
//! Every constant the hole subsystem depends on lives here so a level can
//! override it from JSON. Defaults come from `crate::consts`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// How the swallow test sizes an object
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwallowRadius {
    /// Every object uses the same approximate radius
    Fixed(f32),
    /// Use the horizontal footprint of the object's collision shape
    #[default]
    FromShape,
}

/// Errors produced while loading tuning overrides
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be a finite number (got {value})")]
    NotFinite { field: &'static str, value: f32 },
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("depth_threshold must be below ground (got {0})")]
    ThresholdAboveGround(f32),
    #[error("lost_depth ({lost}) must be below depth_threshold ({threshold})")]
    LostAboveThreshold { lost: f32, threshold: f32 },
    #[error("max_radius ({max}) is smaller than start_radius ({start})")]
    MaxBelowStart { start: f32, max: f32 },
    #[error("ring_half_extent ({0}) does not cover the play area")]
    RingTooSmall(f32),
}

/// Gameplay constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Hole ===
    pub start_radius: f32,
    pub max_radius: f32,
    pub growth_per_mass: f32,
    pub acceleration: f32,
    pub max_speed: f32,
    pub friction: f32,
    pub play_area_half: f32,

    // === Ground ring ===
    pub ring_half_extent: f32,
    pub ring_thickness: f32,

    // === Swallow ===
    pub depth_threshold: f32,
    pub lost_depth: f32,
    pub swallow_radius: SwallowRadius,

    // === World ===
    pub max_frame_dt: f32,
    pub gravity: f32,
    pub object_count: usize,
    pub spawn_height: f32,
    pub spawn_area_half: f32,
    pub spawn_clear_radius: f32,

    // === Visuals ===
    pub interior_depth: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_radius: HOLE_START_RADIUS,
            max_radius: HOLE_MAX_RADIUS,
            growth_per_mass: HOLE_GROWTH_PER_MASS,
            acceleration: HOLE_ACCELERATION,
            max_speed: HOLE_MAX_SPEED,
            friction: HOLE_FRICTION,
            play_area_half: PLAY_AREA_HALF,

            ring_half_extent: RING_HALF_EXTENT,
            ring_thickness: RING_THICKNESS,

            depth_threshold: DEPTH_THRESHOLD,
            lost_depth: LOST_DEPTH,
            swallow_radius: SwallowRadius::FromShape,

            max_frame_dt: MAX_FRAME_DT,
            gravity: GRAVITY,
            object_count: OBJECT_COUNT,
            spawn_height: SPAWN_HEIGHT,
            spawn_area_half: SPAWN_AREA_HALF,
            spawn_clear_radius: SPAWN_CLEAR_RADIUS,

            interior_depth: INTERIOR_DEPTH,
        }
    }
}

impl Tuning {
    /// Parse overrides from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check the semantic constraints the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let finite = [
            ("start_radius", self.start_radius),
            ("max_radius", self.max_radius),
            ("growth_per_mass", self.growth_per_mass),
            ("acceleration", self.acceleration),
            ("max_speed", self.max_speed),
            ("friction", self.friction),
            ("play_area_half", self.play_area_half),
            ("ring_half_extent", self.ring_half_extent),
            ("ring_thickness", self.ring_thickness),
            ("depth_threshold", self.depth_threshold),
            ("lost_depth", self.lost_depth),
            ("max_frame_dt", self.max_frame_dt),
            ("gravity", self.gravity),
            ("spawn_height", self.spawn_height),
            ("spawn_area_half", self.spawn_area_half),
            ("spawn_clear_radius", self.spawn_clear_radius),
            ("interior_depth", self.interior_depth),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(TuningError::NotFinite { field, value });
            }
        }

        let positive = [
            ("start_radius", self.start_radius),
            ("acceleration", self.acceleration),
            ("max_speed", self.max_speed),
            ("friction", self.friction),
            ("play_area_half", self.play_area_half),
            ("ring_half_extent", self.ring_half_extent),
            ("ring_thickness", self.ring_thickness),
            ("max_frame_dt", self.max_frame_dt),
            ("gravity", self.gravity),
            ("spawn_height", self.spawn_height),
            ("spawn_area_half", self.spawn_area_half),
            ("spawn_clear_radius", self.spawn_clear_radius),
            ("interior_depth", self.interior_depth),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        if let SwallowRadius::Fixed(r) = self.swallow_radius
            && !(r.is_finite() && r > 0.0)
        {
            return Err(TuningError::NotPositive {
                field: "swallow_radius",
                value: r,
            });
        }
        if self.growth_per_mass < 0.0 {
            return Err(TuningError::NotPositive {
                field: "growth_per_mass",
                value: self.growth_per_mass,
            });
        }
        if self.max_radius < self.start_radius {
            return Err(TuningError::MaxBelowStart {
                start: self.start_radius,
                max: self.max_radius,
            });
        }
        if self.depth_threshold >= GROUND_Y {
            return Err(TuningError::ThresholdAboveGround(self.depth_threshold));
        }
        if self.lost_depth >= self.depth_threshold {
            return Err(TuningError::LostAboveThreshold {
                lost: self.lost_depth,
                threshold: self.depth_threshold,
            });
        }
        // The ring's outer edge (hole at the play-area edge, smallest radius)
        // must still lie past every spawned object.
        let reach = self.start_radius + 2.0 * self.ring_half_extent - self.play_area_half;
        if reach < self.play_area_half.max(self.spawn_area_half) {
            return Err(TuningError::RingTooSmall(self.ring_half_extent));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.acceleration, 40.0);
        assert_eq!(tuning.max_speed, 8.0);
        assert_eq!(tuning.friction, 20.0);
        assert_eq!(tuning.depth_threshold, -5.0);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_speed": 12.0 }"#).unwrap();
        assert_eq!(tuning.max_speed, 12.0);
        assert_eq!(tuning.friction, HOLE_FRICTION);
    }

    #[test]
    fn test_fixed_swallow_radius_parses() {
        let tuning = Tuning::from_json(r#"{ "swallow_radius": { "fixed": 0.5 } }"#).unwrap();
        assert_eq!(tuning.swallow_radius, SwallowRadius::Fixed(0.5));
    }

    #[test]
    fn test_rejects_threshold_above_ground() {
        let err = Tuning::from_json(r#"{ "depth_threshold": 1.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::ThresholdAboveGround(_)));
    }

    #[test]
    fn test_rejects_small_ring() {
        let err = Tuning::from_json(r#"{ "ring_half_extent": 5.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::RingTooSmall(_)));
    }

    #[test]
    fn test_rejects_non_positive_fields() {
        for field in [
            "spawn_area_half",
            "spawn_clear_radius",
            "spawn_height",
            "gravity",
            "ring_half_extent",
            "start_radius",
            "max_speed",
        ] {
            for value in ["0.0", "-1.0"] {
                let json = format!(r#"{{ "{field}": {value} }}"#);
                let err = Tuning::from_json(&json).unwrap_err();
                assert!(
                    matches!(err, TuningError::NotPositive { field: f, .. } if f == field),
                    "{field} = {value} gave {err:?}"
                );
            }
        }
    }

    #[test]
    fn test_rejects_nan_fields() {
        let cases: [(&str, fn(&mut Tuning)); 6] = [
            ("max_radius", |t: &mut Tuning| t.max_radius = f32::NAN),
            ("depth_threshold", |t: &mut Tuning| t.depth_threshold = f32::NAN),
            ("lost_depth", |t: &mut Tuning| t.lost_depth = f32::NAN),
            ("spawn_area_half", |t: &mut Tuning| t.spawn_area_half = f32::NAN),
            ("gravity", |t: &mut Tuning| t.gravity = f32::INFINITY),
            ("growth_per_mass", |t: &mut Tuning| t.growth_per_mass = f32::NAN),
        ];
        for (field, corrupt) in cases {
            let mut tuning = Tuning::default();
            corrupt(&mut tuning);
            let err = tuning.validate().unwrap_err();
            assert!(
                matches!(err, TuningError::NotFinite { field: f, .. } if f == field),
                "{field} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(TuningError::Parse(_))
        ));
    }
}
