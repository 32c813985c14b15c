//! User-authored programs and the output schemas they plug into.

mod cache;
mod compose;
mod program;
pub mod schema;

pub use cache::{PassKind, ProgramCache, ProgramKey};
pub use compose::{compose, declared_functions};
pub use program::{EffectProgram, ProgramId, ProgramRef};
