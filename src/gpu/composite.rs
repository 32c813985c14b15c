use std::sync::Arc;

use wgpu::{Device, PipelineLayout, RenderPipeline, Sampler, TextureFormat};

use super::layouts::GolLayouts;
use super::params::FrameUniforms;
use super::shaders;
use super::state::StateTexture;
use super::util::{checked, fullscreen_primitive, linear_clamp_sampler};
use crate::config::DEPTH_FORMAT;
use crate::error::ProgramError;
use crate::graph::{compose, schema, EffectProgram, PassKind, ProgramCache, ProgramId, ProgramKey};
use crate::scene::{SceneTargets, ViewRect};

/// Multiplies the display program's output onto the scene color within a
/// viewport, depth-tested at the program's chosen depth.
pub struct Compositor {
    layouts: Arc<GolLayouts>,
    pipeline_layout: PipelineLayout,
    sampler: Sampler,
    cache: ProgramCache<RenderPipeline>,
}

impl Compositor {
    pub fn new(device: &Device, layouts: Arc<GolLayouts>) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gol-display-pipeline-layout"),
            bind_group_layouts: &[&layouts.frame_state],
            push_constant_ranges: &[],
        });
        Self {
            layouts,
            pipeline_layout,
            sampler: linear_clamp_sampler(device, "gol-display-sampler"),
            cache: ProgramCache::new(),
        }
    }

    /// Release every pipeline built from `program`.
    pub fn evict_program(&mut self, program: ProgramId) {
        self.cache.evict_program(program);
    }

    pub fn cached_pipelines(&self) -> usize {
        self.cache.len()
    }

    /// Record the overlay draw for one view. Returns false when the display
    /// program couldn't be compiled for the target format.
    pub fn composite(
        &mut self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        state: &StateTexture,
        targets: &SceneTargets<'_>,
        rect: ViewRect,
        program: &EffectProgram,
        frame: &FrameUniforms,
    ) -> bool {
        let key = ProgramKey::new(program.id(), PassKind::Display).with_target(targets.color_format);
        let pipeline_layout = &self.pipeline_layout;
        let format = targets.color_format;
        let Some(pipeline) = self
            .cache
            .resolve(key, || build_pipeline(device, pipeline_layout, program, format))
        else {
            return false;
        };

        let frame_buffer = frame.create_buffer(device);
        let bind_group =
            self.layouts
                .frame_state_bind_group(device, &frame_buffer, state, &self.sampler);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("gol-display-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: targets.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: targets.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_viewport(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
            0.0,
            1.0,
        );
        pass.set_scissor_rect(rect.x, rect.y, rect.width, rect.height);
        pass.set_pipeline(&pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
        true
    }
}

fn build_pipeline(
    device: &Device,
    layout: &PipelineLayout,
    program: &EffectProgram,
    format: TextureFormat,
) -> Result<RenderPipeline, ProgramError> {
    let source = compose(
        &shaders::gol_prelude(),
        shaders::COMPOSITE_TEMPLATE,
        program,
        &[&schema::GOL_DISPLAY],
    )?;

    checked(device, program.name(), "display", || {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gol-display-shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gol-display-pipeline"),
            layout: Some(layout),
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
                    format,
                    // result = overlay * scene
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::Dst,
                            dst_factor: wgpu::BlendFactor::Zero,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent::OVER,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: fullscreen_primitive(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    })
}
