//! Host-facing render passes.
//!
//! A host creates the passes it wants, calls [`RenderPass::init`] once with
//! its device, [`RenderPass::tick`] once per frame on the submission thread,
//! then [`RenderPass::render_view`] for every viewport after drawing the
//! scene into that viewport's targets.

mod bonus;
mod gol;
mod mailbox;
mod per_view;
mod view;

pub use bonus::BonusEffectPass;
pub use gol::GameOfLifePass;
pub use mailbox::{GolDriver, ParamMailbox, StagedParams};
pub use per_view::PerViewData;
pub use view::{FramePlan, SimulationView, ViewSchedule};

use crate::config::STALE_VIEW_FRAMES;
use crate::scene::{Scene, SceneTargets, ViewId, ViewInfo};

/// Runtime tunables of the Game of Life pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PassSettings {
    /// Frames a view may go unrendered before its data is dropped
    pub stale_view_frames: u64,
    /// Whether tagged meshes are drawn into the simulation
    pub inject_meshes: bool,
}

impl Default for PassSettings {
    fn default() -> Self {
        Self {
            stale_view_frames: STALE_VIEW_FRAMES,
            inject_meshes: true,
        }
    }
}

/// Everything a pass may touch while rendering one viewport.
pub struct ViewContext<'a> {
    pub device: &'a wgpu::Device,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub view: &'a ViewInfo,
    pub targets: &'a SceneTargets<'a>,
    pub scene: &'a dyn Scene,
}

/// A pass plugged into the host's frame.
pub trait RenderPass {
    fn name(&self) -> &'static str;

    /// Create device resources. Called once before any other method.
    fn init(&mut self, device: &wgpu::Device);

    /// Per-frame bookkeeping, before any view renders. `frame` increases by
    /// one every frame.
    fn tick(&mut self, frame: u64);

    /// Record this pass for one viewport.
    fn render_view(&mut self, ctx: &mut ViewContext<'_>);

    /// The host destroyed a viewport.
    fn view_destroyed(&mut self, _view: ViewId) {}
}
