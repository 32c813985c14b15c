use wgpu::{BindGroupLayout, Device, RenderPipeline, TextureView};
use wgpu::util::DeviceExt;

use super::shaders;
use super::util::{fullscreen_primitive, texture_entry, uniform_entry};
use crate::config::DEPTH_FORMAT;
use crate::scene::ViewRect;

/// Whether mesh injection needs its own depth copy for this view.
///
/// The scene depth can be used as-is only when the viewport starts at the
/// origin and the depth texture is exactly the state extent.
pub fn needs_depth_resample(rect: ViewRect, depth_extent: [u32; 2], state_extent: [u32; 2]) -> bool {
    rect.min() != [0, 0] || depth_extent != state_extent
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct DepthResampleParams {
    source_rect: [f32; 4],
    target_extent: [f32; 2],
    _padding: [f32; 2],
}

/// Per-view depth texture at state resolution
pub struct DepthScratch {
    pub texture: wgpu::Texture,
    pub view: TextureView,
}

impl DepthScratch {
    pub fn new(device: &Device, extent: [u32; 2]) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("gol-depth-scratch"),
            size: wgpu::Extent3d {
                width: extent[0],
                height: extent[1],
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }

    pub fn extent(&self) -> [u32; 2] {
        [self.texture.width(), self.texture.height()]
    }
}

/// Downsamples a viewport's region of the scene depth to state resolution,
/// alternating min and max per texel in a checkerboard.
pub struct DepthResampler {
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
}

impl DepthResampler {
    pub fn new(device: &Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gol-depth-downsample-shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::builtin(shaders::DEPTH_DOWNSAMPLE).into()),
        });

        let fragment = wgpu::ShaderStages::FRAGMENT;
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gol-depth-downsample-layout"),
            entries: &[
                uniform_entry(0, fragment),
                texture_entry(1, fragment, wgpu::TextureSampleType::Depth),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gol-depth-downsample-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gol-depth-downsample-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[],
                compilation_options: Default::default(),
            }),
            primitive: fullscreen_primitive(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    /// Record the downsample of `rect` in `scene_depth` into `target`.
    pub fn resample(
        &self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        scene_depth: &TextureView,
        rect: ViewRect,
        target: &DepthScratch,
    ) {
        let extent = target.extent();
        let params = DepthResampleParams {
            source_rect: rect.to_vec4(),
            target_extent: [extent[0] as f32, extent[1] as f32],
            _padding: [0.0; 2],
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gol-depth-downsample-params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gol-depth-downsample-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(scene_depth),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("gol-depth-downsample-pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &target.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_depth_only_at_matching_origin_and_extent() {
        assert!(!needs_depth_resample(ViewRect::new(0, 0, 64, 32), [32, 16], [32, 16]));
        assert!(needs_depth_resample(ViewRect::new(0, 0, 64, 32), [64, 32], [32, 16]));
        assert!(needs_depth_resample(ViewRect::new(32, 0, 64, 32), [32, 16], [32, 16]));
    }
}
