use std::collections::HashSet;
use std::fmt::Write;

use super::program::EffectProgram;
use super::schema::{OutputSchema, OutputSlot, SlotDefault};
use crate::error::ProgramError;

/// Build the full WGSL module for one pass.
///
/// Layout of the result: `prelude`, the program's own source, generated
/// fallbacks for every slot the program leaves out, then `template` (which
/// holds the entry points and calls the slot functions).
pub fn compose(
    prelude: &str,
    template: &str,
    program: &EffectProgram,
    schemas: &[&OutputSchema],
) -> Result<String, ProgramError> {
    let defined = declared_functions(program.source());

    let mut fallbacks = String::new();
    for schema in schemas {
        for slot in schema.slots {
            let function = schema.function_name(slot);
            if defined.contains(&function) {
                continue;
            }
            if slot.required {
                return Err(ProgramError::MissingRequiredSlot {
                    program: program.name().to_owned(),
                    schema: schema.name,
                    slot: slot.name,
                });
            }
            // Writing to a String never fails.
            let _ = writeln!(
                fallbacks,
                "fn {}(m: {}) -> {} {{ return {}; }}",
                function,
                schema.inputs,
                slot.ty.wgsl(),
                default_expression(schema, slot, program)
            );
        }
    }

    let mut out = String::with_capacity(
        prelude.len() + program.source().len() + fallbacks.len() + template.len() + 128,
    );
    out.push_str(prelude);
    let _ = writeln!(out, "\n// ---- program: {} ----", program.name());
    out.push_str(program.source());
    out.push_str("\n// ---- slot fallbacks ----\n");
    out.push_str(&fallbacks);
    out.push_str("// ---- pass ----\n");
    out.push_str(template);
    Ok(out)
}

fn default_expression(schema: &OutputSchema, slot: &OutputSlot, program: &EffectProgram) -> String {
    match slot.default {
        SlotDefault::Zero => slot.ty.splat(0.0),
        SlotDefault::Constant(value) => {
            let key = format!("{}.{}", schema.name, slot.name);
            slot.ty.splat(program.constant(&key).unwrap_or(value))
        }
        SlotDefault::Expr(expr) => expr.to_owned(),
        SlotDefault::Select {
            flag,
            when_set,
            otherwise,
        } => {
            let key = format!("{}.{}", schema.name, flag);
            let chosen = if program.flag(&key) { when_set } else { otherwise };
            chosen.to_owned()
        }
    }
}

/// Names of all functions declared in a WGSL source, ignoring comments.
pub fn declared_functions(source: &str) -> HashSet<String> {
    let code = strip_comments(source);
    let mut names = HashSet::new();
    let mut tokens = code
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty());
    while let Some(token) = tokens.next() {
        if token == "fn" {
            if let Some(name) = tokens.next() {
                names.insert(name.to_owned());
            }
        }
    }
    names
}

/// Replace `//` and (nested) `/* */` comments with whitespace.
fn strip_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut depth = 0usize;
    let mut i = 0;
    let mut copy_from = 0;

    while i < bytes.len() {
        let pair = (bytes[i], bytes.get(i + 1).copied());
        match pair {
            (b'/', Some(b'*')) => {
                if depth == 0 {
                    out.push_str(&source[copy_from..i]);
                }
                depth += 1;
                i += 2;
            }
            (b'*', Some(b'/')) if depth > 0 => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    out.push(' ');
                    copy_from = i;
                }
            }
            (b'/', Some(b'/')) if depth == 0 => {
                out.push_str(&source[copy_from..i]);
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                copy_from = i;
            }
            _ => i += 1,
        }
    }
    if depth == 0 {
        out.push_str(&source[copy_from..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::schema::{BRE_SETUP, GOL_DISPLAY, GOL_INIT, GOL_SIMULATE_PT1, GOL_SIMULATE_PT2};

    #[test]
    fn test_declared_functions() {
        let src = "
            fn gol_init_binary_state(m: InitInputs) -> f32 { return 1.0; }
            // fn commented_out() {}
            /* fn blocked() { /* nested */ } */
            fn helper (x: f32)->f32 { return x; }
        ";
        let names = declared_functions(src);
        assert!(names.contains("gol_init_binary_state"));
        assert!(names.contains("helper"));
        assert!(!names.contains("commented_out"));
        assert!(!names.contains("blocked"));
        assert!(!names.contains("nested"));
    }

    #[test]
    fn test_missing_required_slot() {
        let program = EffectProgram::new("empty", "");
        let err = compose("", "", &program, &[&GOL_INIT]).unwrap_err();
        assert_eq!(
            err,
            ProgramError::MissingRequiredSlot {
                program: "empty".into(),
                schema: "init",
                slot: "binary_state",
            }
        );
    }

    #[test]
    fn test_defined_slots_are_not_shadowed() {
        let program = EffectProgram::new(
            "init",
            "fn gol_init_binary_state(m: InitInputs) -> f32 { return 1.0; }",
        );
        let out = compose("", "", &program, &[&GOL_INIT]).unwrap();
        assert_eq!(out.matches("fn gol_init_binary_state").count(), 1);
        assert!(out.contains(
            "fn gol_init_continuous_state(m: InitInputs) -> f32 { return gol_init_binary_state(m); }"
        ));
    }

    #[test]
    fn test_constant_defaults_and_overrides() {
        let program = EffectProgram::new("sim", "").with_constant("simulate1.threshold_too_many", 4.0);
        let out = compose("", "", &program, &[&GOL_SIMULATE_PT1, &GOL_SIMULATE_PT2]).unwrap();
        assert!(out.contains("fn gol_simulate1_threshold_too_few(m: SimulateInputs) -> f32 { return 2.0; }"));
        assert!(out.contains("fn gol_simulate1_threshold_resurrect(m: SimulateInputs) -> f32 { return 2.5; }"));
        assert!(out.contains("fn gol_simulate1_threshold_too_many(m: SimulateInputs) -> f32 { return 4.0; }"));
        assert!(out.contains("return m.next_discrete;"));
    }

    #[test]
    fn test_select_default_follows_flag() {
        let surface = EffectProgram::new("surface", "");
        let out = compose("", "", &surface, &[&BRE_SETUP]).unwrap();
        assert!(out.contains("-> vec3<f32> { return m.world_position; }"));

        let camera = EffectProgram::new("camera", "").with_flag("bre_setup.ray_starts_at_camera", true);
        let out = compose("", "", &camera, &[&BRE_SETUP]).unwrap();
        assert!(out.contains("-> vec3<f32> { return m.camera_position; }"));
        assert!(out.contains("fn bre_setup_through_value_1(m: BreSurfaceInputs) -> vec4<f32> { return vec4<f32>(0.0); }"));
    }

    #[test]
    fn test_section_order() {
        let program = EffectProgram::new(
            "display",
            "fn gol_display_emissive_color(m: DisplayInputs) -> vec3<f32> { return vec3<f32>(1.0); }",
        );
        let out = compose("PRELUDE", "TEMPLATE", &program, &[&GOL_DISPLAY]).unwrap();
        let prelude = out.find("PRELUDE").unwrap();
        let user = out.find("fn gol_display_emissive_color").unwrap();
        let fallback = out.find("fn gol_display_opacity").unwrap();
        let template = out.find("TEMPLATE").unwrap();
        assert!(prelude < user && user < fallback && fallback < template);
    }
}
