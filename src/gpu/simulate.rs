use std::sync::Arc;

use wgpu::{ComputePipeline, Device, PipelineLayout, Sampler};

use super::layouts::GolLayouts;
use super::params::FrameUniforms;
use super::shaders;
use super::state::StateTexture;
use super::util::{checked, linear_clamp_sampler};
use crate::config::SIM_WORKGROUP_SIZE;
use crate::error::ProgramError;
use crate::graph::{compose, schema, EffectProgram, PassKind, ProgramCache, ProgramId, ProgramKey};
use crate::simulation::group_count;

/// Compute pass advancing the simulation one tick
pub struct SimulationStepper {
    layouts: Arc<GolLayouts>,
    pipeline_layout: PipelineLayout,
    sampler: Sampler,
    cache: ProgramCache<ComputePipeline>,
}

impl SimulationStepper {
    pub fn new(device: &Device, layouts: Arc<GolLayouts>) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gol-simulate-pipeline-layout"),
            bind_group_layouts: &[&layouts.simulate],
            push_constant_ranges: &[],
        });
        Self {
            layouts,
            pipeline_layout,
            sampler: linear_clamp_sampler(device, "gol-simulate-sampler"),
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

    /// Record one tick reading `previous` and writing every cell of `next`.
    ///
    /// Returns false when the program couldn't be compiled; the caller must
    /// not swap in that case.
    pub fn step(
        &mut self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        previous: &StateTexture,
        next: &StateTexture,
        program: &EffectProgram,
        frame: &FrameUniforms,
    ) -> bool {
        let extent = previous.extent();
        assert_eq!(extent, next.extent(), "ping-pong textures differ in size");

        let key = ProgramKey::new(program.id(), PassKind::Simulate);
        let pipeline_layout = &self.pipeline_layout;
        let Some(pipeline) = self
            .cache
            .resolve(key, || build_pipeline(device, pipeline_layout, program))
        else {
            return false;
        };

        let frame_buffer = frame.create_buffer(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gol-simulate-bind-group"),
            layout: &self.layouts.simulate,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&previous.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&next.view),
                },
            ],
        });

        let groups = group_count([extent[0], extent[1], 1], SIM_WORKGROUP_SIZE);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("gol-simulate-pass"),
            timestamp_writes: None,
        });

        pass.set_pipeline(&pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.dispatch_workgroups(groups[0], groups[1], groups[2]);
        true
    }
}

fn build_pipeline(
    device: &Device,
    layout: &PipelineLayout,
    program: &EffectProgram,
) -> Result<ComputePipeline, ProgramError> {
    let source = compose(
        &shaders::gol_prelude(),
        &shaders::simulate_template(),
        program,
        &[&schema::GOL_SIMULATE_PT1, &schema::GOL_SIMULATE_PT2],
    )?;

    checked(device, program.name(), "simulate", || {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gol-simulate-shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("gol-simulate-pipeline"),
            layout: Some(layout),
            module: &shader,
            entry_point: Some("cs_main"),
            compilation_options: Default::default(),
            cache: None,
        })
    })
}
