use crate::config::{
    DEFAULT_THRESHOLD_RESURRECT, DEFAULT_THRESHOLD_TOO_FEW, DEFAULT_THRESHOLD_TOO_MANY,
    STATE_RESOLUTION_DIVISOR,
};

/// Birth/survival/death thresholds applied to a cell's neighbor aggregate.
///
/// The simulate shader evaluates the same rule per cell, with each threshold
/// optionally driven by the effect program instead of these constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    /// Below this, a cell dies of underpopulation
    pub too_few: f32,
    /// At or above this, a dead cell comes alive
    pub resurrect: f32,
    /// Above this, a cell dies of overpopulation
    pub too_many: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            too_few: DEFAULT_THRESHOLD_TOO_FEW,
            resurrect: DEFAULT_THRESHOLD_RESURRECT,
            too_many: DEFAULT_THRESHOLD_TOO_MANY,
        }
    }
}

impl Thresholds {
    /// Next discrete state of a cell. Must stay in sync with `gol_apply_rule` in simulate.wgsl.
    pub fn next_alive(&self, alive: bool, aggregate: f32) -> bool {
        if aggregate < self.too_few || aggregate > self.too_many {
            return false;
        }
        alive || aggregate >= self.resurrect
    }
}

/// One texel of the state texture, decoded from `Rg8Unorm`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellState {
    /// Quantized alive/dead channel
    pub discrete: f32,
    /// Smoothly varying channel used for fades
    pub continuous: f32,
}

impl CellState {
    pub fn from_texel(texel: [u8; 2]) -> Self {
        Self {
            discrete: texel[0] as f32 / 255.0,
            continuous: texel[1] as f32 / 255.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.discrete >= 0.5
    }
}

/// Size of the state textures for a viewport of the given size.
pub fn state_extent(viewport_size: [u32; 2]) -> [u32; 2] {
    [
        viewport_size[0] / STATE_RESOLUTION_DIVISOR,
        viewport_size[1] / STATE_RESOLUTION_DIVISOR,
    ]
}

/// Number of workgroups needed to cover `extent`, rounding up on each axis.
pub fn group_count(extent: [u32; 3], group_size: [u32; 3]) -> [u32; 3] {
    [
        extent[0].div_ceil(group_size[0]),
        extent[1].div_ceil(group_size[1]),
        extent[2].div_ceil(group_size[2]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SIM_WORKGROUP_SIZE;

    #[test]
    fn test_state_extent_is_half_floor() {
        assert_eq!(state_extent([1920, 1080]), [960, 540]);
        assert_eq!(state_extent([801, 601]), [400, 300]);
        assert_eq!(state_extent([1, 3]), [0, 1]);
        for w in 0..64u32 {
            for h in [0u32, 1, 2, 7, 100] {
                assert_eq!(state_extent([w, h]), [w / 2, h / 2]);
            }
        }
    }

    #[test]
    fn test_group_count_rounds_up() {
        assert_eq!(group_count([64, 64, 1], SIM_WORKGROUP_SIZE), [8, 8, 1]);
        assert_eq!(group_count([65, 63, 1], SIM_WORKGROUP_SIZE), [9, 8, 1]);
        assert_eq!(group_count([1, 1, 1], SIM_WORKGROUP_SIZE), [1, 1, 1]);
        assert_eq!(group_count([0, 0, 1], SIM_WORKGROUP_SIZE), [0, 0, 1]);
    }

    #[test]
    fn test_underpopulated_cells_die() {
        let t = Thresholds::default();
        for n in [0.0, 1.0, 1.99] {
            assert!(!t.next_alive(true, n));
            assert!(!t.next_alive(false, n));
        }
    }

    #[test]
    fn test_survival_band() {
        let t = Thresholds::default();
        assert!(t.next_alive(true, 2.0));
        assert!(t.next_alive(true, 2.5));
        assert!(t.next_alive(true, 3.0));
    }

    #[test]
    fn test_overpopulated_cells_die() {
        let t = Thresholds::default();
        for n in [3.01, 4.0, 8.0] {
            assert!(!t.next_alive(true, n));
            assert!(!t.next_alive(false, n));
        }
    }

    #[test]
    fn test_resurrection() {
        let t = Thresholds::default();
        assert!(t.next_alive(false, 2.5));
        assert!(t.next_alive(false, 3.0));
        assert!(!t.next_alive(false, 2.0));
        assert!(!t.next_alive(false, 2.49));
    }

    #[test]
    fn test_defaults_match_classic_life() {
        // B3/S23 on whole neighbor counts
        let t = Thresholds::default();
        for n in 0..=8 {
            let n_f = n as f32;
            assert_eq!(t.next_alive(true, n_f), n == 2 || n == 3, "survive with {}", n);
            assert_eq!(t.next_alive(false, n_f), n == 3, "birth with {}", n);
        }
    }

    #[test]
    fn test_texel_decode() {
        let cell = CellState::from_texel([255, 0]);
        assert!(cell.is_alive());
        assert_eq!(cell.continuous, 0.0);
        assert!(!CellState::from_texel([0, 255]).is_alive());
    }
}
