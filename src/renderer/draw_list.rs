//! Ordered draw submission
//!
//! Items are sorted by their explicit render order first. Camera distance
//! only breaks ties inside one order (front to back), so the hole layers can
//! never be reordered by moving the camera.

use std::ops::Range;

use glam::Vec3;

use super::composition::Layer;
use super::vertex::Vertex;

/// One primitive waiting to be drawn
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub layer: Layer,
    pub render_order: i32,
    /// Reference point for tie-breaking by camera distance
    pub anchor: Vec3,
    pub vertices: Vec<Vertex>,
}

/// A contiguous run of vertices sharing one layer
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBatch {
    pub layer: Layer,
    pub vertices: Range<u32>,
}

/// Frame draw list
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a primitive at its layer's default order
    pub fn push(&mut self, layer: Layer, anchor: Vec3, vertices: Vec<Vertex>) {
        self.push_ordered(layer, layer.render_order(), anchor, vertices);
    }

    pub fn push_ordered(&mut self, layer: Layer, render_order: i32, anchor: Vec3, vertices: Vec<Vertex>) {
        if vertices.is_empty() {
            return;
        }
        self.items.push(DrawItem {
            layer,
            render_order,
            anchor,
            vertices,
        });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in submission order for a camera at `eye`
    pub fn sorted(&self, eye: Vec3) -> Vec<&DrawItem> {
        let mut items: Vec<&DrawItem> = self.items.iter().collect();
        items.sort_by(|a, b| {
            a.render_order.cmp(&b.render_order).then_with(|| {
                let da = a.anchor.distance_squared(eye);
                let db = b.anchor.distance_squared(eye);
                da.total_cmp(&db)
            })
        });
        items
    }

    /// Flatten into one vertex array plus per-layer batches, in submission
    /// order. Adjacent items on the same layer share a batch.
    pub fn into_batches(self, eye: Vec3) -> (Vec<Vertex>, Vec<DrawBatch>) {
        let mut vertices = Vec::new();
        let mut batches: Vec<DrawBatch> = Vec::new();
        for item in self.sorted(eye) {
            let start = vertices.len() as u32;
            vertices.extend_from_slice(&item.vertices);
            let end = vertices.len() as u32;
            match batches.last_mut() {
                Some(last) if last.layer == item.layer && last.vertices.end == start => {
                    last.vertices.end = end;
                }
                _ => batches.push(DrawBatch {
                    layer: item.layer,
                    vertices: start..end,
                }),
            }
        }
        (vertices, batches)
    }
}
