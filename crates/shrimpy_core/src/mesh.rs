//! Wavefront OBJ import.
//!
//! Meshes are flattened straight into scene triangles; there is no shared
//! vertex representation on the render side.

use std::path::Path;

use shrimpy_math::Vec3;

use crate::error::{SceneError, SceneResult};
use crate::primitives::Triangle;

/// Load every model in an OBJ file as triangles using `material_id`.
///
/// Faces are triangulated on load; texture coordinates and normals are
/// ignored.
pub fn load_obj<P: AsRef<Path>>(path: P, material_id: u32) -> SceneResult<Vec<Triangle>> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
    )?;

    let triangles: Vec<Triangle> = models
        .iter()
        .flat_map(|model| mesh_triangles(&model.mesh, material_id))
        .collect();

    if triangles.is_empty() {
        return Err(SceneError::EmptyMesh(path.to_path_buf()));
    }

    log::info!(
        "Loaded {} triangles from {} model(s) in {:?}",
        triangles.len(),
        models.len(),
        path
    );

    Ok(triangles)
}

/// Convert an indexed tobj mesh into triangles, skipping faces with
/// out-of-range indices.
fn mesh_triangles(mesh: &tobj::Mesh, material_id: u32) -> impl Iterator<Item = Triangle> + '_ {
    let vertex = move |index: u32| -> Option<Vec3> {
        let i = index as usize * 3;
        let p = mesh.positions.get(i..i + 3)?;
        Some(Vec3::new(p[0], p[1], p[2]))
    };

    mesh.indices.chunks_exact(3).filter_map(move |face| {
        Some(Triangle::new(
            [vertex(face[0])?, vertex(face[1])?, vertex(face[2])?],
            material_id,
        ))
    })
}
