use wgpu::Device;

use super::mailbox::StagedParams;
use crate::gpu::{DepthScratch, Resampler, StateTextures};
use crate::scene::ViewId;

/// What one view has to do this frame before it composites.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FramePlan {
    pub initialize: bool,
    /// Simulation seconds to step, if any accumulated
    pub step_seconds: Option<f32>,
}

/// Per-view scheduling state fed by the mailbox.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewSchedule {
    pending_tick_time: f32,
    needs_reinit: bool,
}

impl ViewSchedule {
    /// A new view initializes on its first frame.
    pub fn new() -> Self {
        Self {
            pending_tick_time: 0.0,
            needs_reinit: true,
        }
    }

    pub fn advance_time(&mut self, delta_seconds: f32) {
        if delta_seconds > 0.0 {
            self.pending_tick_time += delta_seconds;
        }
    }

    pub fn on_reinitialize_requested(&mut self) {
        self.needs_reinit = true;
    }

    /// Fold one drained mailbox snapshot into this view's pending work.
    pub fn apply(&mut self, staged: &StagedParams) {
        self.advance_time(staged.delta_seconds);
        if staged.reinitialize {
            self.on_reinitialize_requested();
        }
    }

    pub fn pending_tick_time(&self) -> f32 {
        self.pending_tick_time
    }

    pub fn needs_reinit(&self) -> bool {
        self.needs_reinit
    }

    /// Consume the pending work. All accumulated time goes into one step.
    pub fn take_plan(&mut self) -> FramePlan {
        let initialize = std::mem::take(&mut self.needs_reinit);
        let pending = std::mem::take(&mut self.pending_tick_time);
        FramePlan {
            initialize,
            step_seconds: (pending > 0.0).then_some(pending),
        }
    }
}

/// Everything the Game of Life pass keeps for one viewport.
pub struct SimulationView {
    id: ViewId,
    state: StateTextures,
    schedule: ViewSchedule,
    depth_scratch: Option<DepthScratch>,
}

impl SimulationView {
    pub fn new(device: &Device, id: ViewId, viewport_size: [u32; 2]) -> Self {
        Self {
            id,
            state: StateTextures::new(device, viewport_size),
            schedule: ViewSchedule::new(),
            depth_scratch: None,
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn state(&self) -> &StateTextures {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StateTextures {
        &mut self.state
    }

    pub fn schedule(&self) -> &ViewSchedule {
        &self.schedule
    }

    pub fn schedule_mut(&mut self) -> &mut ViewSchedule {
        &mut self.schedule
    }

    pub fn viewport_size(&self) -> [u32; 2] {
        self.state.viewport_size()
    }

    /// Follow a viewport size change, carrying the pattern over by resampling.
    /// Returns true when the state textures were reallocated.
    pub fn on_resize(
        &mut self,
        device: &Device,
        encoder: &mut wgpu::CommandEncoder,
        resampler: &Resampler,
        viewport_size: [u32; 2],
    ) -> bool {
        let old_size = self.viewport_size();
        let Some(old) = self.state.resize(device, viewport_size) else {
            return false;
        };
        log::info!(
            "View {:?} resized {:?} -> {:?}, state {:?} -> {:?}",
            self.id,
            old_size,
            viewport_size,
            old.extent(),
            self.state.extent()
        );
        resampler.resample(device, encoder, old.current(), self.state.current());
        true
    }

    /// Make sure the depth scratch matches the state extent.
    pub fn ensure_depth_scratch(&mut self, device: &Device) {
        let extent = self.state.extent();
        let stale = self
            .depth_scratch
            .as_ref()
            .map_or(true, |scratch| scratch.extent() != extent);
        if stale {
            self.depth_scratch = Some(DepthScratch::new(device, extent));
        }
    }

    pub fn depth_scratch(&self) -> Option<&DepthScratch> {
        self.depth_scratch.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_view_initializes_once() {
        let mut schedule = ViewSchedule::new();
        assert_eq!(
            schedule.take_plan(),
            FramePlan {
                initialize: true,
                step_seconds: None
            }
        );
        assert_eq!(schedule.take_plan(), FramePlan::default());
    }

    #[test]
    fn test_zero_delta_does_not_step() {
        let mut schedule = ViewSchedule::default();
        schedule.advance_time(0.0);
        schedule.advance_time(-0.5);
        assert_eq!(schedule.take_plan().step_seconds, None);
    }

    #[test]
    fn test_time_accumulates_into_one_step() {
        let mut schedule = ViewSchedule::default();
        schedule.advance_time(0.25);
        schedule.advance_time(0.5);
        assert_eq!(schedule.pending_tick_time(), 0.75);
        assert_eq!(schedule.take_plan().step_seconds, Some(0.75));
        assert_eq!(schedule.pending_tick_time(), 0.0);
    }

    #[test]
    fn test_repeated_reinit_requests_collapse() {
        let mut schedule = ViewSchedule::default();
        schedule.on_reinitialize_requested();
        schedule.on_reinitialize_requested();
        assert!(schedule.needs_reinit());
        assert!(schedule.take_plan().initialize);
        assert!(!schedule.take_plan().initialize);
    }

    #[test]
    fn test_every_view_reseeds_once_per_request_burst() {
        let mut views = [ViewSchedule::default(), ViewSchedule::default()];
        let staged = StagedParams {
            delta_seconds: 0.0,
            reinitialize: true,
            program: None,
        };
        for schedule in &mut views {
            schedule.apply(&staged);
            schedule.apply(&staged);
        }
        for schedule in &mut views {
            assert_eq!(
                schedule.take_plan(),
                FramePlan {
                    initialize: true,
                    step_seconds: None
                }
            );
            assert!(!schedule.take_plan().initialize);
        }
    }

    #[test]
    fn test_apply_adds_staged_time() {
        let mut schedule = ViewSchedule::default();
        schedule.apply(&StagedParams {
            delta_seconds: 0.5,
            ..Default::default()
        });
        assert!(!schedule.needs_reinit());
        assert_eq!(schedule.take_plan().step_seconds, Some(0.5));
    }
}
