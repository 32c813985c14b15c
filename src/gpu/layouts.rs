use wgpu::{BindGroupLayout, Device, ShaderStages, TextureSampleType};

use super::state::StateTexture;
use super::util::{sampler_entry, texture_entry, uniform_entry};
use crate::config::STATE_FORMAT;

/// Bind group layouts shared by the overlay pipelines.
///
/// Group 0 carries the frame uniforms and, for passes that read the
/// simulation, the previous state plus its sampler. Mesh passes add the
/// per-primitive uniforms at group 1.
pub struct GolLayouts {
    /// frame uniforms only (init, bonus)
    pub frame: BindGroupLayout,
    /// frame uniforms + previous state + sampler (mesh, display)
    pub frame_state: BindGroupLayout,
    /// frame_state + write-only output state (simulate)
    pub simulate: BindGroupLayout,
    pub primitive: BindGroupLayout,
}

impl GolLayouts {
    pub fn new(device: &Device) -> Self {
        let render = ShaderStages::VERTEX_FRAGMENT;
        let filterable = TextureSampleType::Float { filterable: true };

        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gol-frame-layout"),
            entries: &[uniform_entry(0, render)],
        });

        let frame_state = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gol-frame-state-layout"),
            entries: &[
                uniform_entry(0, render),
                texture_entry(1, render, filterable),
                sampler_entry(2, render),
            ],
        });

        let simulate = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gol-simulate-layout"),
            entries: &[
                uniform_entry(0, ShaderStages::COMPUTE),
                texture_entry(1, ShaderStages::COMPUTE, filterable),
                sampler_entry(2, ShaderStages::COMPUTE),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: STATE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let primitive = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gol-primitive-layout"),
            entries: &[uniform_entry(0, render)],
        });

        Self {
            frame,
            frame_state,
            simulate,
            primitive,
        }
    }

    pub fn frame_bind_group(&self, device: &Device, frame: &wgpu::Buffer) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gol-frame-bind-group"),
            layout: &self.frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame.as_entire_binding(),
            }],
        })
    }

    pub fn frame_state_bind_group(
        &self,
        device: &Device,
        frame: &wgpu::Buffer,
        previous: &StateTexture,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gol-frame-state-bind-group"),
            layout: &self.frame_state,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&previous.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    pub fn primitive_bind_group(&self, device: &Device, primitive: &wgpu::Buffer) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gol-primitive-bind-group"),
            layout: &self.primitive,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: primitive.as_entire_binding(),
            }],
        })
    }
}
