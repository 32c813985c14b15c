use glam::{Mat4, Vec3};

/// Stable identity of an on-screen viewport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u32);

/// Sub-rectangle of the scene targets covered by a viewport, in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ViewRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    pub fn min(&self) -> [u32; 2] {
        [self.x, self.y]
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    /// `[x, y, width, height]` as floats, the layout the shaders expect
    pub fn to_vec4(&self) -> [f32; 4] {
        [self.x as f32, self.y as f32, self.width as f32, self.height as f32]
    }
}

/// Per-frame description of one viewport.
#[derive(Clone, Copy, Debug)]
pub struct ViewInfo {
    pub id: ViewId,
    pub rect: ViewRect,
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    /// Seconds since the host started
    pub time: f32,
}

/// The host frame's color and depth buffers.
pub struct SceneTargets<'a> {
    pub color: &'a wgpu::TextureView,
    pub color_format: wgpu::TextureFormat,
    pub depth: &'a wgpu::TextureView,
    /// Full size of the color and depth textures (viewports are sub-rects)
    pub extent: [u32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_accessors() {
        let rect = ViewRect::new(640, 0, 640, 720);
        assert_eq!(rect.min(), [640, 0]);
        assert_eq!(rect.size(), [640, 720]);
        assert_eq!(rect.to_vec4(), [640.0, 0.0, 640.0, 720.0]);
        assert!((rect.aspect() - 640.0 / 720.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_aspect() {
        assert_eq!(ViewRect::new(0, 0, 0, 0).aspect(), 1.0);
    }
}
