use gol_overlay::{EffectProgram, ProgramRef};

/// The demo's user-authored programs
pub struct DemoPrograms {
    /// Init, simulate and display stages of the overlay
    pub life: ProgramRef,
    /// Mesh stage for the brush primitive
    pub brush: ProgramRef,
    /// Ray-march stages for the bonus primitive
    pub raymarch: ProgramRef,
}

impl DemoPrograms {
    pub fn load() -> Self {
        Self {
            life: EffectProgram::new("life", include_str!("programs/life.wgsl")).into_ref(),
            brush: EffectProgram::new("brush", include_str!("programs/brush.wgsl")).into_ref(),
            raymarch: EffectProgram::new("raymarch", include_str!("programs/raymarch.wgsl"))
                .with_constant("bre_setup.max_loops", 64.0)
                .into_ref(),
        }
    }
}
