use std::sync::Arc;
use wgpu::{Adapter, Device, Instance, Queue, Surface, SurfaceConfiguration};
use winit::window::Window;

use crate::config::STATE_FORMAT;
use crate::error::GpuError;

/// GPU context holding the device, queue and window surface
pub struct GpuContext {
    pub surface: Surface<'static>,
    pub adapter: Adapter,
    pub device: Device,
    pub queue: Queue,
    pub config: SurfaceConfiguration,
}

impl GpuContext {
    /// Create a new GPU context for the given window
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        log::info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = request_device(&adapter).await?;

        let size = window.inner_size();
        let mut config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or_else(|| GpuError::SurfaceUnsupported(adapter.get_info().name))?;
        config.present_mode = wgpu::PresentMode::AutoVsync;

        surface.configure(&device, &config);

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            config,
        })
    }

    /// Handle window resize
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Get current surface texture format
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> [u32; 2] {
        [self.config.width, self.config.height]
    }
}

/// Device without a window, for offscreen rendering and tests
pub struct HeadlessGpu {
    pub adapter: Adapter,
    pub device: Device,
    pub queue: Queue,
}

impl HeadlessGpu {
    pub async fn new() -> Result<Self, GpuError> {
        let instance = Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .ok_or(GpuError::NoAdapter)?;
        let (device, queue) = request_device(&adapter).await?;
        Ok(Self {
            adapter,
            device,
            queue,
        })
    }
}

/// Whether compute shaders on `adapter` can write the simulation state format.
///
/// Two-channel 8-bit storage textures are outside the WebGPU baseline, so
/// this needs the adapter-specific format features.
pub fn state_format_supported(adapter: &Adapter) -> bool {
    adapter
        .features()
        .contains(wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES)
        && adapter
            .get_texture_format_features(STATE_FORMAT)
            .allowed_usages
            .contains(wgpu::TextureUsages::STORAGE_BINDING)
}

async fn request_device(adapter: &Adapter) -> Result<(Device, Queue), GpuError> {
    if !state_format_supported(adapter) {
        return Err(GpuError::StateFormatUnsupported(adapter.get_info().name));
    }

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("gol-overlay-device"),
                required_features: wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES,
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        )
        .await?;

    device.on_uncaptured_error(Box::new(|error| {
        log::error!("Uncaptured wgpu error: {}", error);
    }));

    Ok((device, queue))
}
