//! WebGPU rendering module
//!
//! Draws the hole with stencil composition (mask, ground, interior) and then
//! the scene objects. Geometry is rebuilt on the CPU every frame into a
//! single vertex buffer; per-layer pipelines do the rest.

pub mod camera;
pub mod composition;
pub mod draw_list;
pub mod mesh;
pub mod pipeline;
pub mod vertex;

pub use camera::FollowCamera;
pub use composition::{HoleComposition, Layer};
pub use draw_list::{DrawBatch, DrawList};

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::consts::HOLE_STENCIL_REF;
use crate::scene::{Posable, Scene};
use crate::settings::Settings;
use crate::sim::{HoleSnapshot, World};
use pipeline::LayerPipelines;
use vertex::{Vertex, colors};

/// Extra ground beyond the play area so the edge stays off-screen
const GROUND_MARGIN: f32 = 40.0;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4], // offset 0
    light_dir: [f32; 4],      // offset 64
}

/// Queue the hole composition and every scene node for one frame
pub fn build_draw_list(
    hole: &HoleSnapshot,
    scene: &Scene,
    ground_half: f32,
    interior_depth: f32,
    settings: &Settings,
) -> DrawList {
    let mut list = DrawList::new();
    HoleComposition::for_frame(hole, ground_half, interior_depth)
        .emit(&mut list, settings.quality.circle_segments());

    let segments = settings.quality.object_segments();
    for (_, node) in scene.iter() {
        let node_transform = node.transform();
        let mut vertices = Vec::new();
        for part in &node.parts {
            let transform = node_transform * glam::Mat4::from_translation(part.offset);
            vertices.extend(mesh::shape(&part.shape, &transform, segments, part.color));
        }
        list.push(Layer::Objects, node.position(), vertices);
    }
    list
}

/// Main render state
pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pipelines: LayerPipelines,
    globals_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    depth_stencil: wgpu::TextureView,
    pub camera: FollowCamera,
    camera_placed: bool,
    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl Renderer {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sinkhole-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
                light_dir: [0.3, 1.0, 0.5, 0.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipelines = LayerPipelines::new(&device, &pipeline_layout, &shader, config.format);
        let depth_stencil = pipeline::create_depth_stencil_view(&device, width, height);

        let mut camera = FollowCamera::default();
        camera.set_viewport(width, height);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipelines,
            globals_buffer,
            bind_group,
            depth_stencil,
            camera,
            camera_placed: false,
            size: (width, height),
        })
    }

    /// Reconfigure the surface and recreate the depth/stencil attachment
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.depth_stencil = pipeline::create_depth_stencil_view(&self.device, new_width, new_height);
            self.camera.set_viewport(new_width, new_height);
        }
    }

    /// Reapply the current configuration (after a lost or outdated surface)
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Draw the world as of its latest tick
    pub fn render(&mut self, world: &World, settings: &Settings, dt: f32) -> Result<(), wgpu::SurfaceError> {
        let hole = world.hole_snapshot();
        if self.camera_placed {
            self.camera.follow(&hole, dt);
        } else {
            self.camera.snap_to(&hole);
            self.camera_placed = true;
        }

        let tuning = world.tuning();
        let list = build_draw_list(
            &hole,
            world.scene(),
            tuning.play_area_half + GROUND_MARGIN,
            tuning.interior_depth,
            settings,
        );
        let (vertices, batches) = list.into_batches(self.camera.eye());

        self.queue.write_buffer(
            &self.globals_buffer,
            0,
            bytemuck::bytes_of(&Globals {
                view_proj: self.camera.view_projection().to_cols_array_2d(),
                light_dir: [0.3, 1.0, 0.5, 0.0],
            }),
        );

        // Recreate buffer every frame (simple approach; could pool)
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vertex_buffer"),
            contents: bytemuck::cast_slice::<Vertex, u8>(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let [r, g, b, a] = colors::BACKGROUND.map(f64::from);
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_stencil,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Store,
                    }),
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            render_pass.set_stencil_reference(HOLE_STENCIL_REF);
            for batch in &batches {
                render_pass.set_pipeline(self.pipelines.get(batch.layer));
                render_pass.draw(batch.vertices.clone(), 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Part, SceneNode, ShapeSpec};
    use glam::{Vec2, Vec3};

    #[test]
    fn test_frame_has_hole_layers_then_objects() {
        let mut scene = Scene::new();
        for id in 1..=3 {
            let mut node = SceneNode::new(vec![Part::new(
                ShapeSpec::Box {
                    half_extents: Vec3::splat(0.3),
                },
                [1.0; 4],
                Vec3::new(0.0, 0.3, 0.0),
            )]);
            // Objects sit much closer to the camera than the ground origin
            node.set_pose(Vec3::new(id as f32, 0.0, 20.0), glam::Quat::IDENTITY);
            scene.insert(id, node);
        }
        let hole = HoleSnapshot {
            position: Vec2::ZERO,
            radius: 1.5,
            velocity: Vec2::ZERO,
        };

        let list = build_draw_list(&hole, &scene, 60.0, 8.0, &Settings::default());
        assert_eq!(list.len(), 6);
        let (_, batches) = list.into_batches(Vec3::new(0.0, 15.0, 25.0));
        let layers: Vec<Layer> = batches.iter().map(|b| b.layer).collect();
        assert_eq!(
            layers,
            vec![Layer::Mask, Layer::Ground, Layer::Interior, Layer::Objects]
        );
    }
}
