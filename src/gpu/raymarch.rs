use std::sync::Arc;

use wgpu::{Device, PipelineLayout, RenderPipeline, TextureFormat};

use super::layouts::GolLayouts;
use super::params::{FrameUniforms, PrimitiveUniforms};
use super::shaders;
use super::util::checked;
use crate::config::DEPTH_FORMAT;
use crate::error::ProgramError;
use crate::graph::{compose, schema, EffectProgram, PassKind, ProgramCache, ProgramKey};
use crate::scene::{GpuMesh, MeshVertexLayout, Scene, SceneTargets, ViewInfo};

struct SurfaceDraw {
    pipeline: Arc<RenderPipeline>,
    mesh: Arc<GpuMesh>,
    primitive: PrimitiveUniforms,
}

/// Draws ray-march tagged primitives straight onto the scene color.
///
/// Each surface fragment runs the program's setup, loop and render stages;
/// fragments whose opacity mask ends below one half are discarded.
pub struct RayMarchRenderer {
    layouts: Arc<GolLayouts>,
    pipeline_layout: PipelineLayout,
    cache: ProgramCache<RenderPipeline>,
}

impl RayMarchRenderer {
    pub fn new(device: &Device, layouts: Arc<GolLayouts>) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("bre-pipeline-layout"),
            bind_group_layouts: &[&layouts.frame, &layouts.primitive],
            push_constant_ranges: &[],
        });
        Self {
            layouts,
            pipeline_layout,
            cache: ProgramCache::new(),
        }
    }

    /// Draw every tagged primitive of the view. Returns the number of batches drawn.
    pub fn render(
        &mut self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        scene: &dyn Scene,
        view: &ViewInfo,
        targets: &SceneTargets<'_>,
    ) -> usize {
        if view.rect.width == 0 || view.rect.height == 0 {
            return 0;
        }
        let mut pending = Vec::new();
        scene.for_each_tagged_primitive(
            view,
            &|tags| tags.bonus.is_some(),
            &mut |primitive, _| {
                scene.for_each_batch(view, primitive, &mut |batch| {
                    pending.push((primitive.model, batch.clone()));
                });
            },
        );

        let format = targets.color_format;
        let draws: Vec<SurfaceDraw> = pending
            .into_iter()
            .filter_map(|(model, batch)| {
                let key = ProgramKey::new(batch.program.id(), PassKind::BonusMesh)
                    .with_layout(batch.mesh.layout.name)
                    .with_target(format);
                let pipeline_layout = &self.pipeline_layout;
                let layout = batch.mesh.layout;
                let program = &batch.program;
                let pipeline = self.cache.resolve(key, || {
                    build_pipeline(device, pipeline_layout, program, format, layout)
                })?;
                Some(SurfaceDraw {
                    pipeline,
                    mesh: batch.mesh,
                    primitive: PrimitiveUniforms::new(model),
                })
            })
            .collect();
        if draws.is_empty() {
            return 0;
        }

        let frame_buffer = FrameUniforms::new(view, targets.extent).create_buffer(device);
        let frame_bind_group = self.layouts.frame_bind_group(device, &frame_buffer);
        let primitive_bind_groups: Vec<wgpu::BindGroup> = draws
            .iter()
            .map(|draw| {
                let buffer = draw.primitive.create_buffer(device);
                self.layouts.primitive_bind_group(device, &buffer)
            })
            .collect();

        let rect = view.rect;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("bre-pass"),
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
                depth_ops: None,
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
        pass.set_bind_group(0, &frame_bind_group, &[]);
        for (draw, bind_group) in draws.iter().zip(&primitive_bind_groups) {
            pass.set_pipeline(&draw.pipeline);
            pass.set_bind_group(1, bind_group, &[]);
            draw.mesh.draw(&mut pass);
        }
        draws.len()
    }
}

fn build_pipeline(
    device: &Device,
    layout: &PipelineLayout,
    program: &EffectProgram,
    format: TextureFormat,
    vertex_layout: &'static MeshVertexLayout,
) -> Result<RenderPipeline, ProgramError> {
    let source = compose(
        &shaders::bre_prelude(),
        shaders::BONUS_TEMPLATE,
        program,
        &[&schema::BRE_SETUP, &schema::BRE_LOOP, &schema::BRE_RENDER],
    )?;

    checked(device, program.name(), "ray march", || {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("bre-shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("bre-pipeline"),
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
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Always one-sided, whatever the batch says.
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
