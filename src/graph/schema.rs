//! Declarative output schemas for user-authored programs.
//!
//! Each schema is a fixed, named list of typed slots. A program fills a slot by
//! defining a WGSL function `<function_prefix><slot name>(m: <inputs>) -> <type>`;
//! any slot it leaves out gets the slot's default, and leaving out a required
//! slot is a compile error. The tables are consumed by [`super::compose`].

use crate::config::{
    DEFAULT_DISPLAY_DEPTH, DEFAULT_DISPLAY_OPACITY, DEFAULT_MESH_ALPHA, DEFAULT_MESH_CONTINUOUS,
    DEFAULT_MESH_DISCRETE, DEFAULT_RAY_MAX_LOOPS, DEFAULT_RAY_STEP_LENGTH,
    DEFAULT_THRESHOLD_RESURRECT, DEFAULT_THRESHOLD_TOO_FEW, DEFAULT_THRESHOLD_TOO_MANY,
};

/// WGSL value type of a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotType {
    Float,
    Float2,
    Float3,
    Float4,
}

impl SlotType {
    pub fn wgsl(self) -> &'static str {
        match self {
            SlotType::Float => "f32",
            SlotType::Float2 => "vec2<f32>",
            SlotType::Float3 => "vec3<f32>",
            SlotType::Float4 => "vec4<f32>",
        }
    }

    /// Expression that splats a scalar to this type.
    pub fn splat(self, value: f32) -> String {
        match self {
            SlotType::Float => format!("{:?}", value),
            other => format!("{}({:?})", other.wgsl(), value),
        }
    }
}

/// Shader stage a schema's functions are called from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaStage {
    Pixel,
    Compute,
}

/// Fallback used when a program doesn't define a slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SlotDefault {
    /// All components zero: "no contribution".
    Zero,
    /// A constant that programs may override by `schema.slot` name.
    Constant(f32),
    /// A WGSL expression over the inputs `m` (and other slot functions).
    Expr(&'static str),
    /// One of two expressions, picked by a boolean program flag.
    Select {
        flag: &'static str,
        when_set: &'static str,
        otherwise: &'static str,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputSlot {
    pub name: &'static str,
    pub ty: SlotType,
    pub required: bool,
    pub default: SlotDefault,
}

impl OutputSlot {
    const fn required(name: &'static str, ty: SlotType) -> Self {
        Self {
            name,
            ty,
            required: true,
            default: SlotDefault::Zero,
        }
    }

    const fn optional(name: &'static str, ty: SlotType, default: SlotDefault) -> Self {
        Self {
            name,
            ty,
            required: false,
            default,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct OutputSchema {
    /// Short name, also the namespace for constant overrides and flags
    pub name: &'static str,
    pub function_prefix: &'static str,
    /// WGSL struct passed to every slot function
    pub inputs: &'static str,
    pub stage: SchemaStage,
    pub slots: &'static [OutputSlot],
}

impl OutputSchema {
    pub fn function_name(&self, slot: &OutputSlot) -> String {
        format!("{}{}", self.function_prefix, slot.name)
    }

    pub fn slot(&self, name: &str) -> Option<&OutputSlot> {
        self.slots.iter().find(|s| s.name == name)
    }
}

// ============================================
// Game of Life
// ============================================

pub static GOL_INIT: OutputSchema = OutputSchema {
    name: "init",
    function_prefix: "gol_init_",
    inputs: "InitInputs",
    stage: SchemaStage::Pixel,
    slots: &[
        // Snapped to 0 or 1 by the pass.
        OutputSlot::required("binary_state", SlotType::Float),
        // Unsnapped binary value unless wired.
        OutputSlot::optional(
            "continuous_state",
            SlotType::Float,
            SlotDefault::Expr("gol_init_binary_state(m)"),
        ),
    ],
};

pub static GOL_SIMULATE_PT1: OutputSchema = OutputSchema {
    name: "simulate1",
    function_prefix: "gol_simulate1_",
    inputs: "SimulateInputs",
    stage: SchemaStage::Compute,
    slots: &[
        OutputSlot::optional(
            "threshold_too_few",
            SlotType::Float,
            SlotDefault::Constant(DEFAULT_THRESHOLD_TOO_FEW),
        ),
        OutputSlot::optional(
            "threshold_resurrect",
            SlotType::Float,
            SlotDefault::Constant(DEFAULT_THRESHOLD_RESURRECT),
        ),
        OutputSlot::optional(
            "threshold_too_many",
            SlotType::Float,
            SlotDefault::Constant(DEFAULT_THRESHOLD_TOO_MANY),
        ),
    ],
};

pub static GOL_SIMULATE_PT2: OutputSchema = OutputSchema {
    name: "simulate2",
    function_prefix: "gol_simulate2_",
    inputs: "SimulateInputs",
    stage: SchemaStage::Compute,
    slots: &[OutputSlot::optional(
        "continuous_value",
        SlotType::Float,
        SlotDefault::Expr("m.next_discrete"),
    )],
};

pub static GOL_MESH: OutputSchema = OutputSchema {
    name: "mesh",
    function_prefix: "gol_mesh_",
    inputs: "MeshInputs",
    stage: SchemaStage::Pixel,
    slots: &[
        OutputSlot::optional(
            "discrete_output",
            SlotType::Float,
            SlotDefault::Constant(DEFAULT_MESH_DISCRETE),
        ),
        OutputSlot::optional(
            "continuous_output",
            SlotType::Float,
            SlotDefault::Constant(DEFAULT_MESH_CONTINUOUS),
        ),
        OutputSlot::optional(
            "output_alpha",
            SlotType::Float,
            SlotDefault::Constant(DEFAULT_MESH_ALPHA),
        ),
    ],
};

pub static GOL_DISPLAY: OutputSchema = OutputSchema {
    name: "display",
    function_prefix: "gol_display_",
    inputs: "DisplayInputs",
    stage: SchemaStage::Pixel,
    slots: &[
        OutputSlot::required("emissive_color", SlotType::Float3),
        OutputSlot::optional(
            "opacity",
            SlotType::Float,
            SlotDefault::Constant(DEFAULT_DISPLAY_OPACITY),
        ),
        // Depth-tested LessEqual against the scene and written. The near-plane
        // default draws over all geometry; return 1.0 to sit behind it.
        OutputSlot::optional(
            "pixel_depth",
            SlotType::Float,
            SlotDefault::Constant(DEFAULT_DISPLAY_DEPTH),
        ),
    ],
};

// ============================================
// Bonus ray-march effect
// ============================================

pub static BRE_SETUP: OutputSchema = OutputSchema {
    name: "bre_setup",
    function_prefix: "bre_setup_",
    inputs: "BreSurfaceInputs",
    stage: SchemaStage::Pixel,
    slots: &[
        OutputSlot::optional(
            "start",
            SlotType::Float3,
            SlotDefault::Select {
                flag: "ray_starts_at_camera",
                when_set: "m.camera_position",
                otherwise: "m.world_position",
            },
        ),
        // Need not be normalized.
        OutputSlot::optional(
            "dir",
            SlotType::Float3,
            SlotDefault::Expr("-m.camera_vector"),
        ),
        OutputSlot::optional(
            "step_length",
            SlotType::Float,
            SlotDefault::Constant(DEFAULT_RAY_STEP_LENGTH),
        ),
        OutputSlot::optional(
            "max_loops",
            SlotType::Float,
            SlotDefault::Constant(DEFAULT_RAY_MAX_LOOPS),
        ),
        OutputSlot::optional("through_value_1", SlotType::Float4, SlotDefault::Zero),
        OutputSlot::optional("through_value_2", SlotType::Float4, SlotDefault::Zero),
        OutputSlot::optional("through_value_3", SlotType::Float4, SlotDefault::Zero),
    ],
};

pub static BRE_LOOP: OutputSchema = OutputSchema {
    name: "bre_loop",
    function_prefix: "bre_loop_",
    inputs: "BreLoopInputs",
    stage: SchemaStage::Pixel,
    slots: &[
        // < 0.5 keeps marching
        OutputSlot::required("should_exit", SlotType::Float),
        OutputSlot::optional("next_pos_offset", SlotType::Float3, SlotDefault::Zero),
        OutputSlot::optional(
            "new_dir_normalized",
            SlotType::Float3,
            SlotDefault::Expr("m.direction"),
        ),
        OutputSlot::optional(
            "new_step_length",
            SlotType::Float,
            SlotDefault::Expr("m.step_length"),
        ),
        OutputSlot::optional(
            "through_value_1",
            SlotType::Float4,
            SlotDefault::Expr("m.through_value_1"),
        ),
        OutputSlot::optional(
            "through_value_2",
            SlotType::Float4,
            SlotDefault::Expr("m.through_value_2"),
        ),
        OutputSlot::optional(
            "through_value_3",
            SlotType::Float4,
            SlotDefault::Expr("m.through_value_3"),
        ),
    ],
};

pub static BRE_RENDER: OutputSchema = OutputSchema {
    name: "bre_render",
    function_prefix: "bre_render_",
    inputs: "BreRenderInputs",
    stage: SchemaStage::Pixel,
    slots: &[
        OutputSlot::required("emissive_color", SlotType::Float3),
        // < 0.5 is invisible
        OutputSlot::required("opacity_mask", SlotType::Float),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> [&'static OutputSchema; 8] {
        [
            &GOL_INIT,
            &GOL_SIMULATE_PT1,
            &GOL_SIMULATE_PT2,
            &GOL_MESH,
            &GOL_DISPLAY,
            &BRE_SETUP,
            &BRE_LOOP,
            &BRE_RENDER,
        ]
    }

    #[test]
    fn test_function_names_are_unique() {
        let mut names = std::collections::HashSet::new();
        for schema in all() {
            for slot in schema.slots {
                assert!(names.insert(schema.function_name(slot)));
            }
        }
    }

    #[test]
    fn test_required_slots_have_no_default_value() {
        for schema in all() {
            for slot in schema.slots.iter().filter(|s| s.required) {
                assert_eq!(slot.default, SlotDefault::Zero, "{}.{}", schema.name, slot.name);
            }
        }
    }

    #[test]
    fn test_simulate_threshold_defaults() {
        let constant = |name| match GOL_SIMULATE_PT1.slot(name).map(|s| s.default) {
            Some(SlotDefault::Constant(v)) => v,
            other => panic!("unexpected default {:?}", other),
        };
        assert_eq!(constant("threshold_too_few"), 2.0);
        assert_eq!(constant("threshold_resurrect"), 2.5);
        assert_eq!(constant("threshold_too_many"), 3.0);
    }

    #[test]
    fn test_ray_march_defaults() {
        assert_eq!(
            BRE_SETUP.slot("max_loops").map(|s| s.default),
            Some(SlotDefault::Constant(100.0))
        );
        assert_eq!(
            BRE_SETUP.slot("step_length").map(|s| s.default),
            Some(SlotDefault::Constant(1.0))
        );
        assert!(BRE_LOOP.slot("should_exit").is_some_and(|s| s.required));
    }

    #[test]
    fn test_splat() {
        assert_eq!(SlotType::Float.splat(2.5), "2.5");
        assert_eq!(SlotType::Float3.splat(0.0), "vec3<f32>(0.0)");
    }
}
