/// How a primitive's mesh output combines with the simulation state it is drawn into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshBlendMode {
    /// Standard "over" compositing by the program's output alpha
    #[default]
    Alpha,
    /// Unclamped sum (clamped only by the unorm storage)
    Additive,
    /// Multiplies the existing state
    Multiply,
}

impl MeshBlendMode {
    /// Draw order of the blend groups within one mesh pass
    pub const ALL: [MeshBlendMode; 3] = [
        MeshBlendMode::Alpha,
        MeshBlendMode::Additive,
        MeshBlendMode::Multiply,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn blend_state(self) -> wgpu::BlendState {
        let color = match self {
            MeshBlendMode::Alpha => wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                operation: wgpu::BlendOperation::Add,
            },
            MeshBlendMode::Additive => wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            MeshBlendMode::Multiply => wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::Dst,
                dst_factor: wgpu::BlendFactor::Zero,
                operation: wgpu::BlendOperation::Add,
            },
        };
        wgpu::BlendState { color, alpha: color }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeshBlendMode::Alpha => "alpha",
            MeshBlendMode::Additive => "additive",
            MeshBlendMode::Multiply => "multiply",
        }
    }
}

/// Render settings of a primitive drawn into the simulation.
///
/// Equality and hashing cover only the blend mode, so primitives with equal
/// settings share a draw configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GolPrimitiveSettings {
    pub blend_mode: MeshBlendMode,
}

/// Marks a primitive for the ray-march effect. No settings yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BrePrimitiveSettings;

/// Which overlay passes a primitive participates in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrimitiveTags {
    pub game_of_life: Option<GolPrimitiveSettings>,
    pub bonus: Option<BrePrimitiveSettings>,
}

impl PrimitiveTags {
    pub fn game_of_life(blend_mode: MeshBlendMode) -> Self {
        Self {
            game_of_life: Some(GolPrimitiveSettings { blend_mode }),
            bonus: None,
        }
    }

    pub fn bonus() -> Self {
        Self {
            game_of_life: None,
            bonus: Some(BrePrimitiveSettings),
        }
    }

    pub fn is_tagged(&self) -> bool {
        self.game_of_life.is_some() || self.bonus.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_settings_dedupe_by_blend_mode() {
        let mut set = HashSet::new();
        for mode in [
            MeshBlendMode::Alpha,
            MeshBlendMode::Multiply,
            MeshBlendMode::Alpha,
            MeshBlendMode::Additive,
            MeshBlendMode::Multiply,
        ] {
            set.insert(GolPrimitiveSettings { blend_mode: mode });
        }
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_indices_follow_draw_order() {
        for (i, mode) in MeshBlendMode::ALL.into_iter().enumerate() {
            assert_eq!(mode.index(), i);
        }
    }

    #[test]
    fn test_multiply_uses_destination_color() {
        let state = MeshBlendMode::Multiply.blend_state();
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::Dst);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::Zero);
    }

    #[test]
    fn test_default_is_alpha() {
        assert_eq!(GolPrimitiveSettings::default().blend_mode, MeshBlendMode::Alpha);
        assert!(!PrimitiveTags::default().is_tagged());
        assert!(PrimitiveTags::bonus().is_tagged());
    }
}
