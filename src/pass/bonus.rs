use std::sync::Arc;

use super::{RenderPass, ViewContext};
use crate::gpu::{GolLayouts, RayMarchRenderer};

/// Ray-march effect drawn on tagged primitives' surfaces.
#[derive(Default)]
pub struct BonusEffectPass {
    renderer: Option<RayMarchRenderer>,
}

impl BonusEffectPass {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderPass for BonusEffectPass {
    fn name(&self) -> &'static str {
        "bonus-ray-march"
    }

    fn init(&mut self, device: &wgpu::Device) {
        let layouts = Arc::new(GolLayouts::new(device));
        self.renderer = Some(RayMarchRenderer::new(device, layouts));
    }

    fn tick(&mut self, _frame: u64) {}

    fn render_view(&mut self, ctx: &mut ViewContext<'_>) {
        let renderer = self
            .renderer
            .as_mut()
            .expect("BonusEffectPass::render_view called before init");
        let drawn = renderer.render(ctx.device, ctx.encoder, ctx.scene, ctx.view, ctx.targets);
        log::trace!("Ray-march pass drew {} batch(es) in view {:?}", drawn, ctx.view.id);
    }
}
