//! CPU mesh generation
//!
//! Everything is emitted as flat-shaded triangle lists already in world
//! space; the vertex buffer is rebuilt every frame. Winding is derived from a
//! facing hint per triangle, so callers only say which way a face points.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};

use super::vertex::Vertex;
use crate::scene::ShapeSpec;

/// Accumulates triangles
#[derive(Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<Vertex>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one triangle whose normal agrees with `facing`. Degenerate
    /// triangles are dropped.
    pub fn tri(&mut self, a: Vec3, b: Vec3, c: Vec3, facing: Vec3, color: [f32; 4]) {
        self.tri_colored(a, b, c, facing, [color; 3]);
    }

    /// Like `tri`, with one color per corner
    pub fn tri_colored(&mut self, a: Vec3, b: Vec3, c: Vec3, facing: Vec3, colors: [[f32; 4]; 3]) {
        let n = (b - a).cross(c - a);
        if n.length_squared() < 1e-12 {
            return;
        }
        let (b, c, colors, n) = if n.dot(facing) < 0.0 {
            (c, b, [colors[0], colors[2], colors[1]], -n)
        } else {
            (b, c, colors, n)
        };
        let n = n.normalize();
        self.vertices.push(Vertex::new(a, n, colors[0]));
        self.vertices.push(Vertex::new(b, n, colors[1]));
        self.vertices.push(Vertex::new(c, n, colors[2]));
    }

    /// Quad as two triangles; corners in perimeter order
    pub fn quad(&mut self, corners: [Vec3; 4], facing: Vec3, color: [f32; 4]) {
        let [a, b, c, d] = corners;
        self.tri(a, b, c, facing, color);
        self.tri(a, c, d, facing, color);
    }

    pub fn finish(self) -> Vec<Vertex> {
        self.vertices
    }
}

fn ring_point(center: Vec3, radius: f32, angle: f32) -> Vec3 {
    center + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
}

/// Flat disk in the XZ plane, facing +Y
pub fn disk(center: Vec3, radius: f32, segments: u32, color: [f32; 4]) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut mesh = MeshBuilder::new();
    for i in 0..segments {
        let a0 = i as f32 / segments as f32 * TAU;
        let a1 = (i + 1) as f32 / segments as f32 * TAU;
        mesh.tri(
            center,
            ring_point(center, radius, a0),
            ring_point(center, radius, a1),
            Vec3::Y,
            color,
        );
    }
    mesh.finish()
}

/// Square plane in the XZ plane, facing +Y
pub fn plane(center: Vec3, half: f32, color: [f32; 4]) -> Vec<Vertex> {
    let mut mesh = MeshBuilder::new();
    mesh.quad(
        [
            center + Vec3::new(-half, 0.0, -half),
            center + Vec3::new(half, 0.0, -half),
            center + Vec3::new(half, 0.0, half),
            center + Vec3::new(-half, 0.0, half),
        ],
        Vec3::Y,
        color,
    );
    mesh.finish()
}

/// Open cylinder hanging down from `top_center`, faces pointing inward,
/// shading from `top_color` at the rim to `bottom_color` at the far end
pub fn inward_shell(
    top_center: Vec3,
    radius: f32,
    depth: f32,
    segments: u32,
    top_color: [f32; 4],
    bottom_color: [f32; 4],
) -> Vec<Vertex> {
    let segments = segments.max(3);
    let bottom_center = top_center - Vec3::Y * depth;
    let mut mesh = MeshBuilder::new();
    for i in 0..segments {
        let a0 = i as f32 / segments as f32 * TAU;
        let a1 = (i + 1) as f32 / segments as f32 * TAU;
        let t0 = ring_point(top_center, radius, a0);
        let t1 = ring_point(top_center, radius, a1);
        let b0 = ring_point(bottom_center, radius, a0);
        let b1 = ring_point(bottom_center, radius, a1);
        let mid = (a0 + a1) / 2.0;
        let inward = -Vec3::new(mid.cos(), 0.0, mid.sin());
        mesh.tri_colored(b0, t0, b1, inward, [bottom_color, top_color, bottom_color]);
        mesh.tri_colored(b1, t0, t1, inward, [bottom_color, top_color, top_color]);
    }
    mesh.finish()
}

/// Triangulate one scene part in its local space, then place it with
/// `transform`
pub fn shape(spec: &ShapeSpec, transform: &Mat4, segments: u32, color: [f32; 4]) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut mesh = MeshBuilder::new();
    match *spec {
        ShapeSpec::Box { half_extents: h } => box_faces(&mut mesh, h, color),
        ShapeSpec::Sphere { radius } => sphere(&mut mesh, radius, segments, color),
        ShapeSpec::Cylinder {
            radius_top,
            radius_bottom,
            height,
        } => frustum(&mut mesh, radius_bottom, radius_top, height, segments, color),
        ShapeSpec::Cone { radius, height } => frustum(&mut mesh, radius, 0.0, height, segments, color),
    }

    mesh.finish()
        .into_iter()
        .map(|v| {
            let p = transform.transform_point3(Vec3::from(v.position));
            let n = transform.transform_vector3(Vec3::from(v.normal)).normalize_or_zero();
            Vertex::new(p, n, v.color)
        })
        .collect()
}

fn box_faces(mesh: &mut MeshBuilder, h: Vec3, color: [f32; 4]) {
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        for sign in [1.0, -1.0] {
            let normal = axis * sign;
            // Two axes spanning the face
            let (u, v) = if axis == Vec3::X {
                (Vec3::Y * h.y, Vec3::Z * h.z)
            } else if axis == Vec3::Y {
                (Vec3::X * h.x, Vec3::Z * h.z)
            } else {
                (Vec3::X * h.x, Vec3::Y * h.y)
            };
            let c = normal * h;
            mesh.quad([c - u - v, c + u - v, c + u + v, c - u + v], normal, color);
        }
    }
}

fn sphere(mesh: &mut MeshBuilder, radius: f32, segments: u32, color: [f32; 4]) {
    let stacks = (segments / 2).max(2);
    let point = |stack: u32, slice: u32| {
        let phi = stack as f32 / stacks as f32 * PI;
        let theta = slice as f32 / segments as f32 * TAU;
        Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()) * radius
    };
    for stack in 0..stacks {
        for slice in 0..segments {
            let a = point(stack, slice);
            let b = point(stack, slice + 1);
            let c = point(stack + 1, slice + 1);
            let d = point(stack + 1, slice);
            let outward = (a + b + c + d) / 4.0;
            mesh.tri(a, b, c, outward, color);
            mesh.tri(a, c, d, outward, color);
        }
    }
}

/// Y-aligned frustum centered on its midpoint, with caps. A zero top radius
/// gives a cone.
fn frustum(mesh: &mut MeshBuilder, bottom: f32, top: f32, height: f32, segments: u32, color: [f32; 4]) {
    let top_center = Vec3::Y * (height / 2.0);
    let bottom_center = -top_center;
    for i in 0..segments {
        let a0 = i as f32 / segments as f32 * TAU;
        let a1 = (i + 1) as f32 / segments as f32 * TAU;
        let b0 = ring_point(bottom_center, bottom, a0);
        let b1 = ring_point(bottom_center, bottom, a1);
        let t0 = ring_point(top_center, top, a0);
        let t1 = ring_point(top_center, top, a1);
        let mid = (a0 + a1) / 2.0;
        let outward = Vec3::new(mid.cos(), 0.0, mid.sin());

        mesh.tri(b0, t0, b1, outward, color);
        mesh.tri(b1, t0, t1, outward, color);
        mesh.tri(bottom_center, b0, b1, Vec3::NEG_Y, color);
        mesh.tri(top_center, t0, t1, Vec3::Y, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal(v: &Vertex) -> Vec3 {
        Vec3::from(v.normal)
    }

    #[test]
    fn test_disk_is_flat_and_faces_up() {
        let verts = disk(Vec3::new(2.0, 0.01, -1.0), 1.5, 24, [1.0; 4]);
        assert_eq!(verts.len(), 24 * 3);
        for v in &verts {
            assert_eq!(v.position[1], 0.01);
            assert!((normal(v) - Vec3::Y).length() < 1e-5);
        }
    }

    #[test]
    fn test_shell_faces_inward() {
        let center = Vec3::ZERO;
        for v in inward_shell(center, 2.0, 5.0, 16, [1.0; 4], [0.0; 4]) {
            let p = Vec3::from(v.position);
            let radial = Vec3::new(p.x, 0.0, p.z);
            assert!(normal(&v).dot(radial) < 0.0);
            assert!(p.y <= 0.0 && p.y >= -5.0);
        }
    }

    #[test]
    fn test_shell_darkens_with_depth() {
        let verts = inward_shell(Vec3::ZERO, 1.0, 4.0, 8, [1.0; 4], [0.0, 0.0, 0.0, 1.0]);
        for v in verts {
            let expected = if v.position[1] > -2.0 { 1.0 } else { 0.0 };
            assert_eq!(v.color[0], expected);
        }
    }

    #[test]
    fn test_closed_shapes_face_outward() {
        let specs = [
            ShapeSpec::Box {
                half_extents: Vec3::new(0.5, 1.0, 0.25),
            },
            ShapeSpec::Sphere { radius: 0.7 },
            ShapeSpec::Cylinder {
                radius_top: 0.2,
                radius_bottom: 0.3,
                height: 1.0,
            },
            ShapeSpec::Cone {
                radius: 0.5,
                height: 1.2,
            },
        ];
        for spec in specs {
            let verts = shape(&spec, &Mat4::IDENTITY, 12, [1.0; 4]);
            assert!(!verts.is_empty());
            for tri in verts.chunks(3) {
                let centroid = tri.iter().map(|v| Vec3::from(v.position)).sum::<Vec3>() / 3.0;
                assert!(normal(&tri[0]).dot(centroid) > -1e-4, "{spec:?} has an inward face");
            }
        }
    }

    #[test]
    fn test_shape_is_placed_by_transform() {
        let spec = ShapeSpec::Sphere { radius: 1.0 };
        let t = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        for v in shape(&spec, &t, 8, [1.0; 4]) {
            assert!((Vec3::from(v.position) - Vec3::new(10.0, 0.0, 0.0)).length() < 1.0 + 1e-4);
        }
    }
}
