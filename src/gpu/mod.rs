mod composite;
mod context;
mod depth;
mod init;
mod inject;
mod layouts;
mod params;
mod raymarch;
mod resample;
pub mod shaders;
mod simulate;
mod state;
mod util;

pub use composite::Compositor;
pub use context::{state_format_supported, GpuContext, HeadlessGpu};
pub use depth::{needs_depth_resample, DepthResampler, DepthScratch};
pub use init::Initializer;
pub use inject::{group_by_blend_mode, has_draws, MeshDraw, MeshInjector};
pub use layouts::GolLayouts;
pub use params::{FrameUniforms, PrimitiveUniforms};
pub use raymarch::RayMarchRenderer;
pub use resample::Resampler;
pub use simulate::SimulationStepper;
pub use state::{StateTexture, StateTextures};
