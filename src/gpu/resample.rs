use wgpu::{BindGroupLayout, Device, RenderPipeline, Sampler};

use super::shaders;
use super::state::StateTexture;
use super::util::{fullscreen_primitive, linear_clamp_sampler, sampler_entry, texture_entry};
use crate::config::STATE_FORMAT;

/// Copies a state texture into one of a different size with bilinear filtering.
///
/// Used when a viewport changes size so the running pattern survives the
/// reallocation, stretched to the new extent.
pub struct Resampler {
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    sampler: Sampler,
}

impl Resampler {
    pub fn new(device: &Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gol-resample-shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::builtin(shaders::RESAMPLE).into()),
        });

        let fragment = wgpu::ShaderStages::FRAGMENT;
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gol-resample-layout"),
            entries: &[
                texture_entry(0, fragment, wgpu::TextureSampleType::Float { filterable: true }),
                sampler_entry(1, fragment),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gol-resample-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gol-resample-pipeline"),
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
                targets: &[Some(wgpu::ColorTargetState {
                    format: STATE_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: fullscreen_primitive(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
            sampler: linear_clamp_sampler(device, "gol-resample-sampler"),
        }
    }

    /// Record a stretch-copy of `input` into the whole of `output`.
    pub fn resample(
        &self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        input: &StateTexture,
        output: &StateTexture,
    ) {
        assert_eq!(input.texture.format(), output.texture.format());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gol-resample-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&input.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("gol-resample-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &output.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
