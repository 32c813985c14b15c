use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use wgpu::Device;

use gol_overlay::scene::{
    GpuMesh, MeshBatch, MeshBlendMode, MeshData, Primitive, PrimitiveId, PrimitiveTags, Scene,
    ViewInfo,
};

use super::programs::DemoPrograms;

/// A scene object plus what the host renderer needs to draw it
pub struct DemoObject {
    pub primitive: Primitive,
    pub mesh: Arc<GpuMesh>,
    pub color: [f32; 4],
    /// Drawn by the host renderer (overlay passes ignore this)
    pub host_visible: bool,
}

pub struct DemoScene {
    objects: Vec<DemoObject>,
    brush: usize,
}

impl DemoScene {
    pub fn new(device: &Device, programs: &DemoPrograms) -> Self {
        let cube = Arc::new(MeshData::cube(1.0).upload(device, "cube"));
        let ground = Arc::new(MeshData::plane(24.0).upload(device, "ground"));

        let mut objects = Vec::new();
        let mut add = |name: &str, mesh: &Arc<GpuMesh>, model: Mat4, color: [f32; 4], tags: PrimitiveTags, batch: Option<MeshBatch>| {
            let id = PrimitiveId(objects.len() as u32);
            objects.push(DemoObject {
                primitive: Primitive {
                    id,
                    name: name.to_owned(),
                    model,
                    visible: true,
                    tags,
                    batches: batch.into_iter().collect(),
                },
                mesh: mesh.clone(),
                color,
                host_visible: tags.bonus.is_none(),
            });
            objects.len() - 1
        };

        add(
            "ground",
            &ground,
            Mat4::IDENTITY,
            [0.62, 0.6, 0.56, 1.0],
            PrimitiveTags::default(),
            None,
        );
        for (i, x) in [-2.5f32, 1.5].into_iter().enumerate() {
            add(
                &format!("pillar-{}", i),
                &cube,
                Mat4::from_scale_rotation_translation(
                    Vec3::new(0.6, 3.0, 0.6),
                    Quat::IDENTITY,
                    Vec3::new(x, 1.5, 1.5),
                ),
                [0.8, 0.45, 0.35, 1.0],
                PrimitiveTags::default(),
                None,
            );
        }
        let brush = add(
            "brush",
            &cube,
            Mat4::IDENTITY,
            [0.3, 0.4, 0.85, 1.0],
            PrimitiveTags::game_of_life(MeshBlendMode::Alpha),
            Some(MeshBatch {
                mesh: cube.clone(),
                program: programs.brush.clone(),
                double_sided: false,
            }),
        );
        add(
            "marcher",
            &cube,
            Mat4::from_scale_rotation_translation(
                Vec3::splat(2.0),
                Quat::IDENTITY,
                Vec3::new(3.0, 1.0, -2.0),
            ),
            [1.0; 4],
            PrimitiveTags::bonus(),
            Some(MeshBatch {
                mesh: cube.clone(),
                program: programs.raymarch.clone(),
                double_sided: false,
            }),
        );

        let mut scene = Self { objects, brush };
        scene.update(0.0);
        scene
    }

    /// Animate the brush along a figure-eight
    pub fn update(&mut self, time: f32) {
        let t = time * 0.6;
        let position = Vec3::new(t.sin() * 3.5, 1.2 + (t * 1.7).sin() * 0.4, (2.0 * t).sin() * 1.8);
        let rotation = Quat::from_rotation_y(time * 0.9) * Quat::from_rotation_x(time * 0.4);
        self.objects[self.brush].primitive.model =
            Mat4::from_scale_rotation_translation(Vec3::splat(1.4), rotation, position);
    }

    pub fn set_brush_blend_mode(&mut self, mode: MeshBlendMode) {
        self.objects[self.brush].primitive.tags = PrimitiveTags::game_of_life(mode);
        log::info!("Brush blend mode: {}", mode.label());
    }

    pub fn objects(&self) -> impl Iterator<Item = &DemoObject> {
        self.objects.iter()
    }
}

impl Scene for DemoScene {
    fn for_each_tagged_primitive(
        &self,
        _view: &ViewInfo,
        predicate: &dyn Fn(&PrimitiveTags) -> bool,
        visit: &mut dyn FnMut(&Primitive, &PrimitiveTags),
    ) {
        for object in &self.objects {
            let primitive = &object.primitive;
            if primitive.visible && predicate(&primitive.tags) {
                visit(primitive, &primitive.tags);
            }
        }
    }

    fn for_each_batch(&self, _view: &ViewInfo, primitive: &Primitive, visit: &mut dyn FnMut(&MeshBatch)) {
        for batch in &primitive.batches {
            visit(batch);
        }
    }
}
