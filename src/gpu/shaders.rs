//! WGSL sources and the preludes programs are composed against.

use crate::config::SIM_WORKGROUP_SIZE;

pub const COMMON: &str = include_str!("../shaders/common.wgsl");
const GOL_PRELUDE: &str = include_str!("../shaders/gol_prelude.wgsl");
const BRE_PRELUDE: &str = include_str!("../shaders/bre_prelude.wgsl");
const MESH_COMMON: &str = include_str!("../shaders/mesh_common.wgsl");

pub const INIT_TEMPLATE: &str = include_str!("../shaders/init.wgsl");
pub const SIMULATE_TEMPLATE: &str = include_str!("../shaders/simulate.wgsl");
pub const MESH_TEMPLATE: &str = include_str!("../shaders/mesh.wgsl");
pub const COMPOSITE_TEMPLATE: &str = include_str!("../shaders/composite.wgsl");
pub const BONUS_TEMPLATE: &str = include_str!("../shaders/bonus.wgsl");

pub const RESAMPLE: &str = include_str!("../shaders/resample.wgsl");
pub const DEPTH_DOWNSAMPLE: &str = include_str!("../shaders/depth_downsample.wgsl");

/// Prelude for full-screen Game of Life passes (init, simulate, display)
pub fn gol_prelude() -> String {
    [COMMON, GOL_PRELUDE].concat()
}

/// Prelude for the mesh injection pass
pub fn gol_mesh_prelude() -> String {
    [COMMON, GOL_PRELUDE, MESH_COMMON].concat()
}

/// Prelude for the ray-march surface pass
pub fn bre_prelude() -> String {
    [COMMON, BRE_PRELUDE, MESH_COMMON].concat()
}

/// Simulate template with the workgroup size baked in
pub fn simulate_template() -> String {
    format!(
        "const GOL_GROUP_SIZE_X: u32 = {}u;\nconst GOL_GROUP_SIZE_Y: u32 = {}u;\nconst GOL_GROUP_SIZE_Z: u32 = {}u;\n{}",
        SIM_WORKGROUP_SIZE[0], SIM_WORKGROUP_SIZE[1], SIM_WORKGROUP_SIZE[2], SIMULATE_TEMPLATE
    )
}

/// A built-in pass shader: the common helpers plus `body`
pub fn builtin(body: &str) -> String {
    [COMMON, body].concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{compose, declared_functions, schema, EffectProgram};

    #[test]
    fn test_templates_read_every_slot() {
        // A slot the template never calls would silently have no effect.
        let cases: [(&str, &[&schema::OutputSchema]); 5] = [
            (INIT_TEMPLATE, &[&schema::GOL_INIT]),
            (SIMULATE_TEMPLATE, &[&schema::GOL_SIMULATE_PT1, &schema::GOL_SIMULATE_PT2]),
            (MESH_TEMPLATE, &[&schema::GOL_MESH]),
            (COMPOSITE_TEMPLATE, &[&schema::GOL_DISPLAY]),
            (BONUS_TEMPLATE, &[&schema::BRE_SETUP, &schema::BRE_LOOP, &schema::BRE_RENDER]),
        ];
        for (template, schemas) in cases {
            for s in schemas.iter() {
                for slot in s.slots {
                    let function = s.function_name(slot);
                    assert!(
                        template.contains(&format!("{}(", function)),
                        "template never reads {}",
                        function
                    );
                }
            }
        }
    }

    #[test]
    fn test_composed_simulate_module_is_complete() {
        let program = EffectProgram::new(
            "life",
            "fn gol_init_binary_state(m: InitInputs) -> f32 { return 1.0; }",
        );
        let module = compose(
            &gol_prelude(),
            &simulate_template(),
            &program,
            &[&schema::GOL_SIMULATE_PT1, &schema::GOL_SIMULATE_PT2],
        )
        .unwrap();
        let functions = declared_functions(&module);
        for name in [
            "cs_main",
            "gol_apply_rule",
            "gol_simulate1_threshold_too_few",
            "gol_simulate2_continuous_value",
            "gol_hash",
        ] {
            assert!(functions.contains(name), "missing {}", name);
        }
        assert!(module.contains("const GOL_GROUP_SIZE_X: u32 = 8u;"));
    }

    #[test]
    fn test_preludes_do_not_declare_slot_functions() {
        for prelude in [gol_prelude(), gol_mesh_prelude(), bre_prelude()] {
            let functions = declared_functions(&prelude);
            assert!(!functions
                .iter()
                .any(|f| f.starts_with("gol_init_") || f.starts_with("bre_setup_")));
        }
    }
}
