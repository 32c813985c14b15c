use std::sync::Arc;

use wgpu::{Device, PipelineLayout, RenderPipeline, Sampler, TextureView};

use super::layouts::GolLayouts;
use super::params::{FrameUniforms, PrimitiveUniforms};
use super::shaders;
use super::state::StateTextures;
use super::util::{checked, linear_clamp_sampler};
use crate::config::{DEPTH_FORMAT, STATE_FORMAT};
use crate::error::ProgramError;
use crate::graph::{compose, schema, EffectProgram, PassKind, ProgramCache, ProgramId, ProgramKey};
use crate::scene::{GpuMesh, MeshBlendMode, MeshVertexLayout, Scene, ViewInfo};

/// Split draws into the fixed blend-group order: Alpha, Additive, Multiply.
///
/// Draw order within a group is the order items arrive in.
pub fn group_by_blend_mode<T>(items: impl IntoIterator<Item = (MeshBlendMode, T)>) -> [Vec<T>; 3] {
    let mut groups: [Vec<T>; 3] = Default::default();
    for (mode, item) in items {
        groups[mode.index()].push(item);
    }
    groups
}

/// A mesh batch with its pipeline resolved, ready to record
pub struct MeshDraw {
    pipeline: Arc<RenderPipeline>,
    mesh: Arc<GpuMesh>,
    primitive: PrimitiveUniforms,
}

/// Draws tagged scene geometry into the simulation state.
pub struct MeshInjector {
    layouts: Arc<GolLayouts>,
    pipeline_layout: PipelineLayout,
    sampler: Sampler,
    cache: ProgramCache<RenderPipeline>,
}

impl MeshInjector {
    pub fn new(device: &Device, layouts: Arc<GolLayouts>) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gol-mesh-pipeline-layout"),
            bind_group_layouts: &[&layouts.frame_state, &layouts.primitive],
            push_constant_ranges: &[],
        });
        Self {
            layouts,
            pipeline_layout,
            sampler: linear_clamp_sampler(device, "gol-mesh-sampler"),
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

    /// Gather the view's Game of Life primitives as draws grouped by blend mode.
    ///
    /// Batches whose program fails to compile are left out.
    pub fn collect(&mut self, device: &Device, scene: &dyn Scene, view: &ViewInfo) -> [Vec<MeshDraw>; 3] {
        let mut pending = Vec::new();
        scene.for_each_tagged_primitive(
            view,
            &|tags| tags.game_of_life.is_some(),
            &mut |primitive, tags| {
                let Some(settings) = tags.game_of_life else {
                    return;
                };
                scene.for_each_batch(view, primitive, &mut |batch| {
                    pending.push((settings.blend_mode, primitive.model, batch.clone()));
                });
            },
        );

        let draws = pending.into_iter().filter_map(|(mode, model, batch)| {
            let pipeline = self.resolve(device, &batch.program, mode, batch.mesh.layout)?;
            Some((
                mode,
                MeshDraw {
                    pipeline,
                    mesh: batch.mesh,
                    primitive: PrimitiveUniforms::new(model),
                },
            ))
        });
        group_by_blend_mode(draws)
    }

    fn resolve(
        &mut self,
        device: &Device,
        program: &EffectProgram,
        mode: MeshBlendMode,
        layout: &'static MeshVertexLayout,
    ) -> Option<Arc<RenderPipeline>> {
        let key = ProgramKey::new(program.id(), PassKind::Mesh)
            .with_blend(mode)
            .with_layout(layout.name);
        let pipeline_layout = &self.pipeline_layout;
        self.cache
            .resolve(key, || build_pipeline(device, pipeline_layout, program, mode, layout))
    }

    /// Record the mesh pass: copy `current` into `next`, draw every group
    /// into `next` depth-tested against `depth`. The caller swaps afterwards.
    pub fn record(
        &self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        groups: &[Vec<MeshDraw>; 3],
        state: &StateTextures,
        depth: &TextureView,
        frame: &FrameUniforms,
    ) {
        let (current, next) = state.io();
        let extent = state.extent();

        // Areas no mesh covers keep the current state.
        encoder.copy_texture_to_texture(
            current.texture.as_image_copy(),
            next.texture.as_image_copy(),
            wgpu::Extent3d {
                width: extent[0],
                height: extent[1],
                depth_or_array_layers: 1,
            },
        );

        let frame_buffer = frame.create_buffer(device);
        let frame_bind_group =
            self.layouts
                .frame_state_bind_group(device, &frame_buffer, current, &self.sampler);
        let primitive_bind_groups: Vec<Vec<wgpu::BindGroup>> = groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|draw| {
                        let buffer = draw.primitive.create_buffer(device);
                        self.layouts.primitive_bind_group(device, &buffer)
                    })
                    .collect()
            })
            .collect();

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("gol-mesh-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &next.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            // Read-only: meshes are occluded by the scene but never occlude each other.
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: None,
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_bind_group(0, &frame_bind_group, &[]);
        for (group, bind_groups) in groups.iter().zip(&primitive_bind_groups) {
            for (draw, bind_group) in group.iter().zip(bind_groups) {
                pass.set_pipeline(&draw.pipeline);
                pass.set_bind_group(1, bind_group, &[]);
                draw.mesh.draw(&mut pass);
            }
        }
    }
}

/// Whether any group holds a draw
pub fn has_draws(groups: &[Vec<MeshDraw>; 3]) -> bool {
    groups.iter().any(|group| !group.is_empty())
}

fn build_pipeline(
    device: &Device,
    layout: &PipelineLayout,
    program: &EffectProgram,
    mode: MeshBlendMode,
    vertex_layout: &'static MeshVertexLayout,
) -> Result<RenderPipeline, ProgramError> {
    let source = compose(
        &shaders::gol_mesh_prelude(),
        shaders::MESH_TEMPLATE,
        program,
        &[&schema::GOL_MESH],
    )?;

    let pass = format!("mesh ({})", mode.label());
    checked(device, program.name(), &pass, || {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gol-mesh-shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("gol-mesh-pipeline"),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout.buffer_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: STATE_FORMAT,
                    blend: Some(mode.blend_state()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // Always back-face culled, whatever the batch's own setting.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_in_fixed_order() {
        let groups = group_by_blend_mode([
            (MeshBlendMode::Multiply, "m1"),
            (MeshBlendMode::Alpha, "a1"),
            (MeshBlendMode::Additive, "d1"),
            (MeshBlendMode::Alpha, "a2"),
        ]);
        assert_eq!(groups[0], vec!["a1", "a2"]);
        assert_eq!(groups[1], vec!["d1"]);
        assert_eq!(groups[2], vec!["m1"]);
    }

    #[test]
    fn test_empty_groups() {
        let groups = group_by_blend_mode(Vec::<(MeshBlendMode, u32)>::new());
        assert!(groups.iter().all(Vec::is_empty));
        let groups = group_by_blend_mode([(MeshBlendMode::Additive, 1u32)]);
        assert!(groups[0].is_empty() && groups[2].is_empty());
        assert_eq!(groups[1], vec![1]);
    }
}
