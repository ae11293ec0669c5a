//! WebGPU render pipeline setup
//!
//! One pipeline per layer. They share the shader, vertex layout and bind
//! group; only color writes and the depth/stencil state differ.

use super::composition::{Layer, StencilTest};
use super::vertex::Vertex;

/// Combined depth/stencil attachment format
pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Depth and stencil state for a layer
pub fn depth_stencil_state(layer: Layer) -> wgpu::DepthStencilState {
    let (compare, pass_op) = match layer.stencil() {
        StencilTest::Stamp => (wgpu::CompareFunction::Always, wgpu::StencilOperation::Replace),
        StencilTest::NotEqual => (wgpu::CompareFunction::NotEqual, wgpu::StencilOperation::Keep),
        StencilTest::Equal => (wgpu::CompareFunction::Equal, wgpu::StencilOperation::Keep),
        StencilTest::Ignore => (wgpu::CompareFunction::Always, wgpu::StencilOperation::Keep),
    };
    let face = wgpu::StencilFaceState {
        compare,
        fail_op: wgpu::StencilOperation::Keep,
        depth_fail_op: wgpu::StencilOperation::Keep,
        pass_op,
    };

    // The mask must stamp every pixel it covers, whatever was drawn before
    let (depth_write_enabled, depth_compare) = match layer {
        Layer::Mask => (false, wgpu::CompareFunction::Always),
        _ => (true, wgpu::CompareFunction::LessEqual),
    };

    wgpu::DepthStencilState {
        format: DEPTH_STENCIL_FORMAT,
        depth_write_enabled,
        depth_compare,
        stencil: wgpu::StencilState {
            front: face,
            back: face,
            read_mask: 0xff,
            write_mask: if pass_op == wgpu::StencilOperation::Replace { 0xff } else { 0 },
        },
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Color channels a layer writes
pub fn color_writes(layer: Layer) -> wgpu::ColorWrites {
    match layer {
        Layer::Mask => wgpu::ColorWrites::empty(),
        _ => wgpu::ColorWrites::ALL,
    }
}

fn cull_mode(layer: Layer) -> Option<wgpu::Face> {
    match layer {
        // Flat primitives are only ever seen from above
        Layer::Mask | Layer::Ground => None,
        Layer::Interior | Layer::Objects => Some(wgpu::Face::Back),
    }
}

/// The four layer pipelines
pub struct LayerPipelines {
    mask: wgpu::RenderPipeline,
    ground: wgpu::RenderPipeline,
    interior: wgpu::RenderPipeline,
    objects: wgpu::RenderPipeline,
}

impl LayerPipelines {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
    ) -> Self {
        let build = |layer| create_layer_pipeline(device, layout, shader, format, layer);
        Self {
            mask: build(Layer::Mask),
            ground: build(Layer::Ground),
            interior: build(Layer::Interior),
            objects: build(Layer::Objects),
        }
    }

    pub fn get(&self, layer: Layer) -> &wgpu::RenderPipeline {
        match layer {
            Layer::Mask => &self.mask,
            Layer::Ground => &self.ground,
            Layer::Interior => &self.interior,
            Layer::Objects => &self.objects,
        }
    }
}

fn create_layer_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    layer: Layer,
) -> wgpu::RenderPipeline {
    let label = format!("{layer:?}_pipeline").to_lowercase();
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: color_writes(layer),
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: cull_mode(layer),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(depth_stencil_state(layer)),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

/// Depth/stencil view sized to the surface
pub fn create_depth_stencil_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_stencil_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_STENCIL_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
