use std::sync::atomic::{AtomicU64, Ordering};

use wgpu::{Device, Texture, TextureUsages, TextureView};

use crate::config::STATE_FORMAT;
use crate::simulation::state_extent;

static NEXT_STATE_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// One simulation state texture and its default view
pub struct StateTexture {
    pub texture: Texture,
    pub view: TextureView,
    id: u64,
}

impl StateTexture {
    fn new(device: &Device, label: &str, extent: [u32; 2]) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: extent[0],
                height: extent[1],
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STATE_FORMAT,
            usage: TextureUsages::TEXTURE_BINDING
                | TextureUsages::STORAGE_BINDING
                | TextureUsages::RENDER_ATTACHMENT
                | TextureUsages::COPY_SRC
                | TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            id: NEXT_STATE_TEXTURE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Process-unique identity; changes only when the texture is reallocated
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn extent(&self) -> [u32; 2] {
        [self.texture.width(), self.texture.height()]
    }
}

/// Ping-pong pair of state textures for one view.
///
/// `current` holds the latest state; passes write `next` and then `swap`.
/// Both textures always share the same extent and format.
pub struct StateTextures {
    texture_a: StateTexture,
    texture_b: StateTexture,
    /// true = A is current
    current_is_a: bool,
    viewport_size: [u32; 2],
}

impl StateTextures {
    /// Allocate a pair sized for `viewport_size`. The viewport must be at
    /// least `STATE_RESOLUTION_DIVISOR` pixels on each axis.
    pub fn new(device: &Device, viewport_size: [u32; 2]) -> Self {
        let extent = state_extent(viewport_size);
        assert!(
            extent[0] > 0 && extent[1] > 0,
            "viewport {:?} too small for a simulation state",
            viewport_size
        );
        Self {
            texture_a: StateTexture::new(device, "gol-state-a", extent),
            texture_b: StateTexture::new(device, "gol-state-b", extent),
            current_is_a: true,
            viewport_size,
        }
    }

    pub fn current(&self) -> &StateTexture {
        if self.current_is_a {
            &self.texture_a
        } else {
            &self.texture_b
        }
    }

    pub fn next(&self) -> &StateTexture {
        if self.current_is_a {
            &self.texture_b
        } else {
            &self.texture_a
        }
    }

    /// Get (current, next)
    pub fn io(&self) -> (&StateTexture, &StateTexture) {
        (self.current(), self.next())
    }

    /// Make `next` the current state
    pub fn swap(&mut self) {
        self.current_is_a = !self.current_is_a;
    }

    pub fn extent(&self) -> [u32; 2] {
        self.texture_a.extent()
    }

    pub fn viewport_size(&self) -> [u32; 2] {
        self.viewport_size
    }

    pub fn needs_resize(&self, viewport_size: [u32; 2]) -> bool {
        state_extent(viewport_size) != self.extent()
    }

    /// Reallocate both textures for a new viewport size.
    ///
    /// Returns the previous pair when the state extent actually changed so the
    /// caller can resample it into the new `current`. A size change that maps
    /// to the same extent keeps the existing textures.
    pub fn resize(&mut self, device: &Device, viewport_size: [u32; 2]) -> Option<StateTextures> {
        if !self.needs_resize(viewport_size) {
            self.viewport_size = viewport_size;
            return None;
        }
        let fresh = StateTextures::new(device, viewport_size);
        log::debug!(
            "Resizing simulation state {:?} -> {:?}",
            self.extent(),
            fresh.extent()
        );
        Some(std::mem::replace(self, fresh))
    }
}
