use std::sync::Arc;

use super::mailbox::{GolDriver, ParamMailbox};
use super::per_view::PerViewData;
use super::view::SimulationView;
use super::{PassSettings, RenderPass, ViewContext};
use crate::gpu::{
    has_draws, needs_depth_resample, Compositor, DepthResampler, FrameUniforms, GolLayouts,
    Initializer, MeshInjector, Resampler, SimulationStepper,
};
use crate::graph::{ProgramId, ProgramRef};
use crate::scene::ViewId;
use crate::simulation::state_extent;

struct GolPipelines {
    resampler: Resampler,
    depth: DepthResampler,
    initializer: Initializer,
    stepper: SimulationStepper,
    injector: MeshInjector,
    compositor: Compositor,
}

impl GolPipelines {
    fn evict_program(&mut self, program: ProgramId) {
        self.initializer.evict_program(program);
        self.stepper.evict_program(program);
        self.injector.evict_program(program);
        self.compositor.evict_program(program);
    }

    fn cached_pipelines(&self) -> usize {
        self.initializer.cached_pipelines()
            + self.stepper.cached_pipelines()
            + self.injector.cached_pipelines()
            + self.compositor.cached_pipelines()
    }
}

/// The program `incoming` replaces, if it is a different one than `current`
fn retired_program(current: Option<&ProgramRef>, incoming: &ProgramRef) -> Option<ProgramId> {
    current
        .map(|current| current.id())
        .filter(|&id| id != incoming.id())
}

/// Screen-space Game of Life overlay.
///
/// Every viewport gets its own half-resolution simulation. Per view and
/// frame: follow viewport resizes, initialize if requested, step once if
/// time accumulated, draw tagged meshes into the state, then multiply the
/// display program's output onto the scene.
pub struct GameOfLifePass {
    settings: PassSettings,
    mailbox: Arc<ParamMailbox>,
    program: Option<ProgramRef>,
    views: PerViewData<SimulationView>,
    pipelines: Option<GolPipelines>,
    frame: u64,
    warned_no_program: bool,
}

impl GameOfLifePass {
    pub fn new(settings: PassSettings) -> Self {
        Self {
            settings,
            mailbox: Arc::new(ParamMailbox::new()),
            program: None,
            views: PerViewData::new(settings.stale_view_frames),
            pipelines: None,
            frame: 0,
            warned_no_program: false,
        }
    }

    /// Handle for the driving thread
    pub fn driver(&self) -> GolDriver {
        GolDriver::new(self.mailbox.clone())
    }

    pub fn settings(&self) -> &PassSettings {
        &self.settings
    }

    pub fn program(&self) -> Option<&ProgramRef> {
        self.program.as_ref()
    }

    pub fn view(&self, id: ViewId) -> Option<&SimulationView> {
        self.views.get(id)
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Pipelines currently compiled across all stages (0 before `init`)
    pub fn cached_pipelines(&self) -> usize {
        self.pipelines.as_ref().map_or(0, GolPipelines::cached_pipelines)
    }
}

impl Default for GameOfLifePass {
    fn default() -> Self {
        Self::new(PassSettings::default())
    }
}

impl RenderPass for GameOfLifePass {
    fn name(&self) -> &'static str {
        "game-of-life"
    }

    fn init(&mut self, device: &wgpu::Device) {
        let layouts = Arc::new(GolLayouts::new(device));
        self.pipelines = Some(GolPipelines {
            resampler: Resampler::new(device),
            depth: DepthResampler::new(device),
            initializer: Initializer::new(device, layouts.clone()),
            stepper: SimulationStepper::new(device, layouts.clone()),
            injector: MeshInjector::new(device, layouts.clone()),
            compositor: Compositor::new(device, layouts),
        });
        log::debug!("Game of Life pass initialized");
    }

    fn tick(&mut self, frame: u64) {
        self.frame = frame;
        for id in self.views.prune(frame) {
            log::info!("Dropped simulation of stale view {:?}", id);
        }

        let staged = self.mailbox.take();
        if let Some(program) = staged.program.clone() {
            let changed = self
                .program
                .as_ref()
                .map_or(true, |current| current.id() != program.id());
            if changed {
                log::info!("Effect program set to '{}'", program.name());
                self.warned_no_program = false;
            }
            if let Some(retired) = retired_program(self.program.as_ref(), &program) {
                if let Some(pipelines) = self.pipelines.as_mut() {
                    pipelines.evict_program(retired);
                    log::debug!("Evicted pipelines of {:?}", retired);
                }
            }
            self.program = Some(program);
        }

        if staged.reinitialize {
            log::info!("Re-initializing {} view(s)", self.views.len());
        }
        for view in self.views.values_mut() {
            view.schedule_mut().apply(&staged);
        }
    }

    fn render_view(&mut self, ctx: &mut ViewContext<'_>) {
        let pipelines = self
            .pipelines
            .as_mut()
            .expect("GameOfLifePass::render_view called before init");
        let Some(program) = self.program.clone() else {
            if !self.warned_no_program {
                log::warn!("No effect program set; Game of Life pass skipped");
                self.warned_no_program = true;
            }
            return;
        };

        let device = ctx.device;
        let view_id = ctx.view.id;
        let rect = ctx.view.rect;
        let viewport = rect.size();
        let extent = state_extent(viewport);
        if extent[0] == 0 || extent[1] == 0 {
            log::trace!("View {:?} too small ({:?}), skipped", view_id, viewport);
            return;
        }

        let (view, created) = self.views.get_or_insert_with(view_id, self.frame, || {
            SimulationView::new(device, view_id, viewport)
        });
        if created {
            log::info!("Created simulation for view {:?}, state {:?}", view_id, extent);
        } else {
            view.on_resize(device, ctx.encoder, &pipelines.resampler, viewport);
        }

        let plan = view.schedule_mut().take_plan();
        let frame = FrameUniforms::new(ctx.view, extent);
        log::trace!("View {:?} plan {:?}", view_id, plan);

        if plan.initialize {
            let seed = rand::random::<u32>();
            log::debug!("Initializing view {:?} with seed {}", view_id, seed);
            pipelines.initializer.initialize(
                device,
                ctx.encoder,
                view.state().current(),
                &program,
                &frame.with_seed(seed),
            );
        }

        if let Some(step_seconds) = plan.step_seconds {
            let (current, next) = view.state().io();
            let stepped = pipelines.stepper.step(
                device,
                ctx.encoder,
                current,
                next,
                &program,
                &frame.with_delta(step_seconds).with_seed(rand::random()),
            );
            if stepped {
                view.state_mut().swap();
            }
        }

        if self.settings.inject_meshes {
            let groups = pipelines.injector.collect(device, ctx.scene, ctx.view);
            if has_draws(&groups) {
                let targets = ctx.targets;
                let scratch = if needs_depth_resample(rect, targets.extent, extent) {
                    view.ensure_depth_scratch(device);
                    view.depth_scratch()
                } else {
                    None
                };
                if let Some(scratch) = scratch {
                    pipelines
                        .depth
                        .resample(device, ctx.encoder, targets.depth, rect, scratch);
                }
                let depth = scratch.map_or(targets.depth, |scratch| &scratch.view);
                pipelines.injector.record(
                    device,
                    ctx.encoder,
                    &groups,
                    view.state(),
                    depth,
                    &frame.with_seed(rand::random()),
                );
                view.state_mut().swap();
            }
        }

        pipelines.compositor.composite(
            device,
            ctx.encoder,
            view.state().current(),
            ctx.targets,
            rect,
            &program,
            &frame,
        );
    }

    fn view_destroyed(&mut self, view: ViewId) {
        if self.views.remove(view).is_some() {
            log::info!("Released simulation of destroyed view {:?}", view);
        }
    }
}
