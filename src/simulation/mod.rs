mod rule;

pub use rule::{group_count, state_extent, CellState, Thresholds};
