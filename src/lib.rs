//! Screen-space Game of Life overlay for a host renderer.
//!
//! Each viewport runs its own half-resolution simulation on the GPU. Scene
//! geometry tagged for the overlay is drawn into the simulation state, and a
//! user-authored display program multiplies the result onto the scene.
//! User programs are WGSL sources that fill in the named output slots of the
//! schemas in [`graph::schema`].

pub mod config;
pub mod error;
pub mod gpu;
pub mod graph;
pub mod pass;
pub mod scene;
pub mod simulation;

pub use error::{GpuError, ProgramError};
pub use graph::{EffectProgram, ProgramRef};
pub use pass::{BonusEffectPass, GameOfLifePass, GolDriver, PassSettings, RenderPass, ViewContext};
