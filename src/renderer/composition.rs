//! Hole render composition
//!
//! The ground is never cut. Three primitives share one stencil reference:
//! the mask disk stamps the reference where the hole is, the ground draws
//! everywhere else, and the interior shell draws only inside the stamp. The
//! layering depends on their render order alone.

use glam::Vec3;

use super::draw_list::DrawList;
use super::mesh;
use super::vertex::colors;
use crate::consts::{GROUND_Y, MASK_LIFT};
use crate::ground_to_world;
use crate::sim::HoleSnapshot;

/// Render layers, in the order they must be submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Mask,
    Ground,
    Interior,
    Objects,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Mask, Layer::Ground, Layer::Interior, Layer::Objects];

    /// Explicit submission priority (lower draws first)
    pub const fn render_order(self) -> i32 {
        match self {
            Layer::Mask => -1,
            Layer::Ground => 0,
            Layer::Interior => 1,
            Layer::Objects => 2,
        }
    }

    /// Stencil behaviour against the shared reference
    pub const fn stencil(self) -> StencilTest {
        match self {
            Layer::Mask => StencilTest::Stamp,
            Layer::Ground => StencilTest::NotEqual,
            Layer::Interior => StencilTest::Equal,
            Layer::Objects => StencilTest::Ignore,
        }
    }
}

/// How a layer uses the stencil buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilTest {
    /// Always pass, write the reference, no color
    Stamp,
    /// Visible where the reference is absent
    NotEqual,
    /// Visible only where the reference was stamped
    Equal,
    Ignore,
}

/// Geometry of one hole primitive for this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoleShape {
    /// Flat disk. A cylinder would show its side walls at oblique angles.
    Disk { center: Vec3, radius: f32 },
    Plane { center: Vec3, half: f32 },
    /// Open inward-facing cylinder hanging from `top`
    Shell { top: Vec3, radius: f32, depth: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HolePrimitive {
    pub layer: Layer,
    pub shape: HoleShape,
}

/// The mask, ground and interior for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoleComposition {
    pub mask: HolePrimitive,
    pub ground: HolePrimitive,
    pub interior: HolePrimitive,
}

impl HoleComposition {
    /// Derive all three primitives from the frame's hole snapshot, so the
    /// visual radius is always the radius physics used this frame
    pub fn for_frame(hole: &HoleSnapshot, ground_half: f32, interior_depth: f32) -> Self {
        Self {
            mask: HolePrimitive {
                layer: Layer::Mask,
                shape: HoleShape::Disk {
                    center: ground_to_world(hole.position, GROUND_Y + MASK_LIFT),
                    radius: hole.radius,
                },
            },
            ground: HolePrimitive {
                layer: Layer::Ground,
                shape: HoleShape::Plane {
                    center: Vec3::new(0.0, GROUND_Y, 0.0),
                    half: ground_half,
                },
            },
            interior: HolePrimitive {
                layer: Layer::Interior,
                shape: HoleShape::Shell {
                    top: ground_to_world(hole.position, GROUND_Y),
                    radius: hole.radius,
                    depth: interior_depth,
                },
            },
        }
    }

    /// Primitives in submission order
    pub fn primitives(&self) -> [HolePrimitive; 3] {
        [self.mask, self.ground, self.interior]
    }

    /// Tessellate and queue all three
    pub fn emit(&self, list: &mut DrawList, segments: u32) {
        for primitive in self.primitives() {
            let (anchor, vertices) = match primitive.shape {
                HoleShape::Disk { center, radius } => (center, mesh::disk(center, radius, segments, colors::MASK)),
                HoleShape::Plane { center, half } => (center, mesh::plane(center, half, colors::GROUND)),
                HoleShape::Shell { top, radius, depth } => (
                    top,
                    mesh::inward_shell(
                        top,
                        radius,
                        depth,
                        segments,
                        colors::INTERIOR_TOP,
                        colors::INTERIOR_BOTTOM,
                    ),
                ),
            };
            list.push(primitive.layer, anchor, vertices);
        }
    }
}
