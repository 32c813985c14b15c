use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::scene::ViewInfo;

/// Per-view uniforms shared by every overlay pass (192 bytes).
/// Layout matches `FrameUniforms` in `shaders/common.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub viewport: [f32; 4],
    pub state_extent: [f32; 2],
    pub delta_seconds: f32,
    pub time: f32,
    pub seed: u32,
    pub _padding: [u32; 3],
}

impl FrameUniforms {
    pub fn new(view: &ViewInfo, state_extent: [u32; 2]) -> Self {
        Self {
            view_proj: view.view_proj.to_cols_array_2d(),
            inv_view_proj: view.view_proj.inverse().to_cols_array_2d(),
            camera_position: view.camera_position.extend(1.0).to_array(),
            viewport: view.rect.to_vec4(),
            state_extent: [state_extent[0] as f32, state_extent[1] as f32],
            delta_seconds: 0.0,
            time: view.time,
            seed: 0,
            _padding: [0; 3],
        }
    }

    pub fn with_delta(mut self, delta_seconds: f32) -> Self {
        self.delta_seconds = delta_seconds;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gol-frame-uniforms"),
            contents: bytemuck::bytes_of(self),
            usage: wgpu::BufferUsages::UNIFORM,
        })
    }
}

/// Per-primitive transform uniforms (128 bytes), `shaders/mesh_common.wgsl`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PrimitiveUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
}

impl PrimitiveUniforms {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
        }
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("gol-primitive-uniforms"),
            contents: bytemuck::bytes_of(self),
            usage: wgpu::BufferUsages::UNIFORM,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{ViewId, ViewRect};
    use glam::Vec3;

    #[test]
    fn test_uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 192);
        assert_eq!(std::mem::size_of::<PrimitiveUniforms>(), 128);
    }

    #[test]
    fn test_frame_uniforms_from_view() {
        let view = ViewInfo {
            id: ViewId(0),
            rect: ViewRect::new(10, 20, 640, 360),
            view_proj: Mat4::IDENTITY,
            camera_position: Vec3::new(1.0, 2.0, 3.0),
            time: 4.5,
        };
        let frame = FrameUniforms::new(&view, [320, 180]).with_delta(0.25).with_seed(9);
        assert_eq!(frame.viewport, [10.0, 20.0, 640.0, 360.0]);
        assert_eq!(frame.state_extent, [320.0, 180.0]);
        assert_eq!(frame.camera_position, [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(frame.delta_seconds, 0.25);
        assert_eq!(frame.seed, 9);
        assert_eq!(frame.time, 4.5);
    }

    #[test]
    fn test_normal_matrix_undoes_scale() {
        let p = PrimitiveUniforms::new(Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)));
        assert_eq!(p.normal_matrix[0][0], 0.5);
        assert_eq!(p.normal_matrix[1][1], 1.0);
    }
}
