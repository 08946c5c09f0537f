//! Wavefront OBJ import (tobj).

use std::io::Cursor;
use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::error::RenderError;
use crate::geometry::{BufferLayout, SubmeshData};

/// Material as described by the model file, texture paths resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    pub name: String,
    pub albedo: Vec3,
    pub emissive: Vec3,
    pub smoothness: f32,
    pub albedo_texture: Option<PathBuf>,
    pub emissive_texture: Option<PathBuf>,
    pub specular_texture: Option<PathBuf>,
    pub normal_texture: Option<PathBuf>,
    pub bump_texture: Option<PathBuf>,
}

impl MaterialDesc {
    fn fallback() -> Self {
        Self {
            name: "default".to_owned(),
            albedo: Vec3::ONE,
            emissive: Vec3::ZERO,
            smoothness: 0.0,
            albedo_texture: None,
            emissive_texture: None,
            specular_texture: None,
            normal_texture: None,
            bump_texture: None,
        }
    }
}

/// Geometry and materials of one model file.
#[derive(Debug, Clone)]
pub struct ImportedModel {
    pub submeshes: Vec<SubmeshData>,
    /// Index into `materials` for each submesh.
    pub material_indices: Vec<usize>,
    pub materials: Vec<MaterialDesc>,
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

/// Imports an OBJ file and its material library.
///
/// Texture paths are resolved against the OBJ's directory.
pub fn import_obj(path: &Path) -> Result<ImportedModel, RenderError> {
    let (models, materials) = tobj::load_obj(path, &load_options()).map_err(|e| {
        RenderError::ModelImport {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    let base_dir = path.parent().unwrap_or(Path::new(""));
    let materials = materials.unwrap_or_else(|e| {
        log::warn!("{}: materials not loaded: {e}", path.display());
        Vec::new()
    });

    build(path, models, materials, base_dir)
}

/// Imports OBJ text with an optional in-memory material library.
pub fn import_obj_buf(
    obj: &str,
    mtl: Option<&str>,
    base_dir: &Path,
) -> Result<ImportedModel, RenderError> {
    let origin = base_dir.join("<memory>.obj");
    let (models, materials) = tobj::load_obj_buf(
        &mut Cursor::new(obj.as_bytes()),
        &load_options(),
        |_| tobj::load_mtl_buf(&mut Cursor::new(mtl.unwrap_or("").as_bytes())),
    )
    .map_err(|e| RenderError::ModelImport {
        path: origin.clone(),
        reason: e.to_string(),
    })?;

    build(&origin, models, materials.unwrap_or_default(), base_dir)
}

fn build(
    origin: &Path,
    models: Vec<tobj::Model>,
    materials: Vec<tobj::Material>,
    base_dir: &Path,
) -> Result<ImportedModel, RenderError> {
    let mut materials: Vec<MaterialDesc> =
        materials.iter().map(|m| convert_material(m, base_dir)).collect();

    let mut submeshes = Vec::with_capacity(models.len());
    let mut material_indices = Vec::with_capacity(models.len());
    let mut fallback = None;

    for model in models {
        let Some(data) = interleave(&model.mesh)? else {
            log::warn!("{}: skipping empty object `{}`", origin.display(), model.name);
            continue;
        };

        let material = match model.mesh.material_id.filter(|&i| i < materials.len()) {
            Some(i) => i,
            None => *fallback.get_or_insert_with(|| {
                materials.push(MaterialDesc::fallback());
                materials.len() - 1
            }),
        };

        submeshes.push(data);
        material_indices.push(material);
    }

    if submeshes.is_empty() {
        return Err(RenderError::ModelImport {
            path: origin.to_path_buf(),
            reason: "no geometry".to_owned(),
        });
    }

    log::info!(
        "imported {}: {} submeshes, {} materials",
        origin.display(),
        submeshes.len(),
        materials.len()
    );

    Ok(ImportedModel { submeshes, material_indices, materials })
}

/// Interleaves position (location 0), normal (1) and texcoord (2) per vertex.
///
/// Normals and texcoords are included only when the object provides one per
/// vertex.
fn interleave(mesh: &tobj::Mesh) -> Result<Option<SubmeshData>, RenderError> {
    let count = mesh.positions.len() / 3;
    if count == 0 || mesh.indices.is_empty() {
        return Ok(None);
    }

    let has_normals = mesh.normals.len() == count * 3;
    let has_uvs = mesh.texcoords.len() == count * 2;

    let mut attrs = vec![(0, 3)];
    if has_normals {
        attrs.push((1, 3));
    }
    if has_uvs {
        attrs.push((2, 2));
    }
    let layout = BufferLayout::packed(&attrs)?;

    let mut vertices = Vec::with_capacity(count * layout.floats_per_vertex());
    for i in 0..count {
        vertices.extend_from_slice(&mesh.positions[i * 3..i * 3 + 3]);
        if has_normals {
            vertices.extend_from_slice(&mesh.normals[i * 3..i * 3 + 3]);
        }
        if has_uvs {
            vertices.extend_from_slice(&mesh.texcoords[i * 2..i * 2 + 2]);
        }
    }

    Ok(Some(SubmeshData {
        layout,
        vertices,
        indices: mesh.indices.clone(),
    }))
}

fn convert_material(m: &tobj::Material, base_dir: &Path) -> MaterialDesc {
    let resolve = |name: &str| base_dir.join(name.replace('\\', "/"));
    let texture = |slot: &Option<String>| slot.as_deref().map(resolve);
    let param = |key: &str| m.unknown_param.get(key).map(|s| s.as_str());

    let emissive = param("Ke")
        .and_then(parse_vec3)
        .unwrap_or(Vec3::ZERO);

    MaterialDesc {
        name: m.name.clone(),
        albedo: m.diffuse.map(Vec3::from).unwrap_or(Vec3::ONE),
        emissive,
        smoothness: (m.shininess.unwrap_or(0.0) / 256.0).clamp(0.0, 1.0),
        albedo_texture: texture(&m.diffuse_texture),
        emissive_texture: param("map_Ke").map(resolve),
        specular_texture: texture(&m.specular_texture),
        normal_texture: param("norm").map(resolve),
        bump_texture: texture(&m.normal_texture),
    }
}

fn parse_vec3(s: &str) -> Option<Vec3> {
    let mut it = s.split_whitespace().map(|v| v.parse::<f32>());
    let x = it.next()?.ok()?;
    let y = it.next()?.ok()?;
    let z = it.next()?.ok()?;
    Some(Vec3::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD_OBJ: &str = "\
mtllib quad.mtl
o quad
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 1 0
usemtl ground
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    const QUAD_MTL: &str = "\
newmtl ground
Kd 0.5 0.25 1.0
Ns 128
map_Kd textures/ground.png
";

    #[test]
    fn quad_is_triangulated_and_interleaved() {
        let model = import_obj_buf(QUAD_OBJ, Some(QUAD_MTL), Path::new("assets")).unwrap();
        assert_eq!(model.submeshes.len(), 1);

        let sub = &model.submeshes[0];
        assert_eq!(sub.indices.len(), 6);
        assert_eq!(sub.layout.stride(), 32);
        assert_eq!(sub.vertex_count(), 4);
        let locs: Vec<u32> = sub.layout.attributes().iter().map(|a| a.location).collect();
        assert_eq!(locs, vec![0, 1, 2]);
        // second vertex: position, normal, uv
        assert_eq!(&sub.vertices[8..16], &[1.0, 0.0, -1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn material_is_resolved() {
        let model = import_obj_buf(QUAD_OBJ, Some(QUAD_MTL), Path::new("assets")).unwrap();
        let mat = &model.materials[model.material_indices[0]];
        assert_eq!(mat.name, "ground");
        assert_eq!(mat.albedo, Vec3::new(0.5, 0.25, 1.0));
        assert_eq!(mat.smoothness, 0.5);
        assert_eq!(
            mat.albedo_texture.as_deref(),
            Some(Path::new("assets/textures/ground.png"))
        );
        assert!(mat.specular_texture.is_none());
    }

    #[test]
    fn positions_only_object() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let model = import_obj_buf(obj, None, Path::new("")).unwrap();
        let sub = &model.submeshes[0];
        assert_eq!(sub.layout.stride(), 12);
        assert_eq!(sub.layout.attributes().len(), 1);
        // no usemtl: a fallback material is added
        assert_eq!(model.materials[model.material_indices[0]].name, "default");
    }

    #[test]
    fn empty_file_has_no_geometry() {
        let err = import_obj_buf("# nothing\n", None, Path::new("")).unwrap_err();
        assert!(matches!(err, RenderError::ModelImport { .. }));
    }

    #[test]
    fn missing_file_is_import_error() {
        let err = import_obj(Path::new("nope/missing.obj")).unwrap_err();
        assert!(matches!(err, RenderError::ModelImport { .. }));
    }

    #[test]
    fn parse_vec3_reads_three_floats() {
        assert_eq!(parse_vec3("1 2.5 -3"), Some(Vec3::new(1.0, 2.5, -3.0)));
        assert_eq!(parse_vec3("1 2"), None);
    }
}
