use std::sync::Arc;

use wgpu::{Device, PipelineLayout, RenderPipeline};

use super::layouts::GolLayouts;
use super::params::FrameUniforms;
use super::shaders;
use super::state::StateTexture;
use super::util::{checked, fullscreen_primitive};
use crate::config::STATE_FORMAT;
use crate::graph::{compose, schema, EffectProgram, PassKind, ProgramCache, ProgramId, ProgramKey};

/// Fills a state texture from a program's init outputs.
pub struct Initializer {
    layouts: Arc<GolLayouts>,
    pipeline_layout: PipelineLayout,
    cache: ProgramCache<RenderPipeline>,
}

impl Initializer {
    pub fn new(device: &Device, layouts: Arc<GolLayouts>) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gol-init-pipeline-layout"),
            bind_group_layouts: &[&layouts.frame],
            push_constant_ranges: &[],
        });
        Self {
            layouts,
            pipeline_layout,
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

    /// Record a full overwrite of `target`. Returns false if the program
    /// couldn't be compiled, in which case nothing is recorded.
    pub fn initialize(
        &mut self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        target: &StateTexture,
        program: &EffectProgram,
        frame: &FrameUniforms,
    ) -> bool {
        let key = ProgramKey::new(program.id(), PassKind::Init);
        let pipeline_layout = &self.pipeline_layout;
        let Some(pipeline) = self
            .cache
            .resolve(key, || build_pipeline(device, pipeline_layout, program))
        else {
            return false;
        };

        let frame_buffer = frame.create_buffer(device);
        let bind_group = self.layouts.frame_bind_group(device, &frame_buffer);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("gol-init-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
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
) -> Result<RenderPipeline, crate::error::ProgramError> {
    let source = compose(
        &shaders::gol_prelude(),
        shaders::INIT_TEMPLATE,
        program,
        &[&schema::GOL_INIT],
    )?;

    checked(device, program.name(), "init", || {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gol-init-shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gol-init-pipeline"),
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
        })
    })
}
