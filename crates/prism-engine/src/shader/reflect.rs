//! WGSL validation and vertex input reflection (naga).

use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::RenderError;
use crate::geometry::{ShaderAttribute, ShaderInputLayout};

use super::program::ProgramDesc;

/// Shader capabilities a device with `features` enabled can run.
///
/// Validating against these keeps a module that the device would reject
/// (an `f64` local without `SHADER_F64`, say) from reaching wgpu.
pub fn capabilities_for(features: wgpu::Features) -> Capabilities {
    let mut caps = Capabilities::empty();
    caps.set(Capabilities::FLOAT64, features.contains(wgpu::Features::SHADER_F64));
    caps.set(Capabilities::SHADER_FLOAT16, features.contains(wgpu::Features::SHADER_F16));
    caps.set(
        Capabilities::PRIMITIVE_INDEX,
        features.contains(wgpu::Features::SHADER_PRIMITIVE_INDEX),
    );
    caps
}

/// Parses and validates `source`, checking that both entry points exist and
/// that every vertex input is `f32` based.
///
/// A parse failure is a compile error; a validation failure, a missing entry
/// point or an unsupported vertex input is a link error. Both carry the full
/// diagnostic.
pub fn compile(
    desc: &ProgramDesc,
    source: &str,
    capabilities: Capabilities,
) -> Result<naga::Module, RenderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| RenderError::ShaderCompile {
        program: desc.name.clone(),
        log: e.emit_to_string(source),
    })?;

    let mut validator = Validator::new(ValidationFlags::all(), capabilities);
    validator.validate(&module).map_err(|e| RenderError::ShaderLink {
        program: desc.name.clone(),
        log: e.emit_to_string(source),
    })?;

    for (entry, stage) in [
        (&desc.vertex_entry, naga::ShaderStage::Vertex),
        (&desc.fragment_entry, naga::ShaderStage::Fragment),
    ] {
        let found = module
            .entry_points
            .iter()
            .any(|ep| ep.name == *entry && ep.stage == stage);
        if !found {
            return Err(RenderError::ShaderLink {
                program: desc.name.clone(),
                log: format!("no {stage:?} entry point named `{entry}`"),
            });
        }
    }

    // Vertex buffers only carry f32 attributes.
    reflect_inputs(&module, desc)?;

    Ok(module)
}

/// Collects the `@location` inputs of the vertex entry point.
///
/// Inputs may be declared as loose arguments or as members of a struct
/// argument. Builtins such as `@builtin(vertex_index)` are skipped.
pub fn reflect_inputs(
    module: &naga::Module,
    desc: &ProgramDesc,
) -> Result<ShaderInputLayout, RenderError> {
    let Some(ep) = module
        .entry_points
        .iter()
        .find(|ep| ep.name == desc.vertex_entry && ep.stage == naga::ShaderStage::Vertex)
    else {
        return Err(RenderError::ShaderLink {
            program: desc.name.clone(),
            log: format!("no vertex entry point named `{}`", desc.vertex_entry),
        });
    };

    let mut attributes = Vec::new();
    for arg in &ep.function.arguments {
        match &arg.binding {
            Some(binding) => push_location(module, desc, binding, arg.ty, &mut attributes)?,
            None => {
                if let naga::TypeInner::Struct { members, .. } = &module.types[arg.ty].inner {
                    for member in members {
                        if let Some(binding) = &member.binding {
                            push_location(module, desc, binding, member.ty, &mut attributes)?;
                        }
                    }
                }
            }
        }
    }

    ShaderInputLayout::from_attributes(attributes)
}

fn push_location(
    module: &naga::Module,
    desc: &ProgramDesc,
    binding: &naga::Binding,
    ty: naga::Handle<naga::Type>,
    out: &mut Vec<ShaderAttribute>,
) -> Result<(), RenderError> {
    let naga::Binding::Location { location, .. } = binding else {
        return Ok(());
    };

    let (scalar, component_count) = match &module.types[ty].inner {
        naga::TypeInner::Scalar(scalar) => (*scalar, 1),
        naga::TypeInner::Vector { size, scalar } => (*scalar, *size as u8),
        _ => return Err(RenderError::InvalidComponentCount(0)),
    };
    if scalar != naga::Scalar::F32 {
        return Err(RenderError::ShaderLink {
            program: desc.name.clone(),
            log: format!(
                "vertex input at location {location} is {:?}{}, only f32 attributes are supported",
                scalar.kind,
                scalar.width * 8
            ),
        });
    }

    out.push(ShaderAttribute { location: *location, component_count });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESH: &str = r#"
struct VsIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(v: VsIn) -> @builtin(position) vec4<f32> {
    return vec4<f32>(v.position + v.normal * 0.0, v.uv.x);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;

    const LOOSE: &str = r#"
@vertex
fn vs_main(@builtin(vertex_index) i: u32, @location(3) w: f32, @location(0) p: vec4<f32>) -> @builtin(position) vec4<f32> {
    return p * w;
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}

@vertex
fn vs_alt(@location(1) p: vec2<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(p, 0.0, 1.0);
}
"#;

    const CAPS: Capabilities = Capabilities::empty();

    fn desc() -> ProgramDesc {
        ProgramDesc::new("test", "test.wgsl")
    }

    fn locations(layout: &ShaderInputLayout) -> Vec<(u32, u8)> {
        layout.attributes().iter().map(|a| (a.location, a.component_count)).collect()
    }

    #[test]
    fn struct_inputs_are_reflected() {
        let module = compile(&desc(), MESH, CAPS).unwrap();
        let layout = reflect_inputs(&module, &desc()).unwrap();
        assert_eq!(locations(&layout), vec![(0, 3), (1, 3), (2, 2)]);
    }

    #[test]
    fn loose_inputs_skip_builtins() {
        let module = compile(&desc(), LOOSE, CAPS).unwrap();
        let layout = reflect_inputs(&module, &desc()).unwrap();
        assert_eq!(locations(&layout), vec![(3, 1), (0, 4)]);
    }

    #[test]
    fn alternate_entry_point() {
        let d = desc().with_entries("vs_alt", "fs_main");
        let module = compile(&d, LOOSE, CAPS).unwrap();
        let layout = reflect_inputs(&module, &d).unwrap();
        assert_eq!(locations(&layout), vec![(1, 2)]);
    }

    #[test]
    fn syntax_error_is_compile_error() {
        let err = compile(&desc(), "fn broken( {", CAPS).unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompile { .. }));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn missing_entry_is_link_error() {
        let d = desc().with_entries("vs_main", "fs_missing");
        let err = compile(&d, MESH, CAPS).unwrap_err();
        match err {
            RenderError::ShaderLink { log, .. } => assert!(log.contains("fs_missing")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn type_error_is_link_error() {
        let src = r#"
@vertex
fn vs_main() -> @builtin(position) vec4<f32> {
    let x: f32 = 1.0;
    return vec4<f32>(x) + 1u;
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        let err = compile(&desc(), src, CAPS).unwrap_err();
        assert!(err.is_shader_error());
    }

    #[test]
    fn integer_vertex_input_is_link_error() {
        let src = r#"
@vertex
fn vs_main(@location(0) p: vec3<u32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(vec3<f32>(p), 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        match compile(&desc(), src, CAPS).unwrap_err() {
            RenderError::ShaderLink { log, .. } => assert!(log.contains("location 0"), "{log}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    const DOUBLE: &str = r#"
@vertex
fn vs_main(@location(0) p: vec4<f32>) -> @builtin(position) vec4<f32> {
    let d: f64 = 1.0lf;
    return p * f32(d);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;

    #[test]
    fn f64_needs_device_feature() {
        let err = compile(&desc(), DOUBLE, CAPS).unwrap_err();
        assert!(matches!(err, RenderError::ShaderLink { .. }), "{err:?}");

        let caps = capabilities_for(wgpu::Features::SHADER_F64);
        assert!(caps.contains(Capabilities::FLOAT64));
        assert!(compile(&desc(), DOUBLE, caps).is_ok());
    }

    #[test]
    fn no_features_means_no_capabilities() {
        assert_eq!(capabilities_for(wgpu::Features::empty()), Capabilities::empty());
    }
}
