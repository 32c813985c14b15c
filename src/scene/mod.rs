//! Interfaces to the host engine.
//!
//! The overlay never owns the scene: the host hands it a [`ViewInfo`] and
//! [`SceneTargets`] per viewport and answers primitive/batch queries through
//! the [`Scene`] trait.

mod mesh;
mod settings;
mod view;

pub use mesh::{GpuMesh, MeshData, MeshVertexLayout, Vertex};
pub use settings::{BrePrimitiveSettings, GolPrimitiveSettings, MeshBlendMode, PrimitiveTags};
pub use view::{SceneTargets, ViewId, ViewInfo, ViewRect};

use std::sync::Arc;

use glam::Mat4;

use crate::graph::ProgramRef;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PrimitiveId(pub u32);

/// One drawable piece of a primitive: geometry plus the program it is shaded with.
#[derive(Clone)]
pub struct MeshBatch {
    pub mesh: Arc<GpuMesh>,
    pub program: ProgramRef,
    pub double_sided: bool,
}

/// A scene object, optionally tagged for the overlay's passes.
pub struct Primitive {
    pub id: PrimitiveId,
    pub name: String,
    pub model: Mat4,
    pub visible: bool,
    pub tags: PrimitiveTags,
    pub batches: Vec<MeshBatch>,
}

/// Scene queries the overlay passes need from the host.
pub trait Scene {
    /// Visit every visible primitive whose tags satisfy `predicate`.
    fn for_each_tagged_primitive(
        &self,
        view: &ViewInfo,
        predicate: &dyn Fn(&PrimitiveTags) -> bool,
        visit: &mut dyn FnMut(&Primitive, &PrimitiveTags),
    );

    /// Visit the drawable batches of one primitive as seen from `view`.
    fn for_each_batch(&self, view: &ViewInfo, primitive: &Primitive, visit: &mut dyn FnMut(&MeshBatch));
}
