//! JSON scene descriptions.
//!
//! A description names its materials and refers to them by name from
//! spheres, triangles and OBJ meshes. Mesh paths are resolved relative to
//! the description file.
//!
//! ```json
//! {
//!   "camera": { "position": [0, 1, -4], "direction": [0, 0, 1] },
//!   "materials": [
//!     { "name": "floor", "type": "diffuse", "color": [0.8, 0.8, 0.8], "roughness": 1.0 },
//!     { "name": "glass", "type": "dielectric", "ior": 1.5 }
//!   ],
//!   "spheres": [ { "center": [0, 1, 0], "radius": 1, "material": "glass" } ],
//!   "meshes": [ { "path": "floor.obj", "material": "floor" } ]
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shrimpy_math::Vec3;

use crate::camera::Camera;
use crate::error::{SceneError, SceneResult};
use crate::material::Material;
use crate::mesh::load_obj;
use crate::primitives::{Sphere, Triangle};
use crate::scene::Scene;

/// Top-level scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_gamma")]
    pub gamma: f32,
    #[serde(default)]
    pub camera: CameraDescription,
    pub materials: Vec<MaterialDescription>,
    #[serde(default)]
    pub spheres: Vec<SphereDescription>,
    #[serde(default)]
    pub triangles: Vec<TriangleDescription>,
    #[serde(default)]
    pub meshes: Vec<MeshDescription>,
    /// Directory relative mesh paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_gamma() -> f32 {
    2.2
}

/// Camera settings. Angles are in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDescription {
    pub position: Vec3,
    pub direction: Vec3,
    pub fov: f32,
    pub sensor_width: f32,
    pub focus_distance: f32,
    pub aperture: f32,
    pub diverge_strength: f32,
    pub max_bounces: u32,
}

impl Default for CameraDescription {
    fn default() -> Self {
        let camera = Camera::new();
        Self {
            position: camera.position,
            direction: camera.direction,
            fov: camera.fov.to_degrees(),
            sensor_width: camera.width,
            focus_distance: camera.focus_distance,
            aperture: camera.aperture,
            diverge_strength: camera.diverge_strength,
            max_bounces: camera.max_ray_bounces,
        }
    }
}

impl CameraDescription {
    pub fn to_camera(&self) -> Camera {
        Camera::new()
            .with_position(self.position, self.direction)
            .with_lens(self.fov, self.focus_distance, self.aperture)
            .with_sensor(self.sensor_width, self.diverge_strength)
            .with_max_bounces(self.max_bounces)
    }
}

/// Scattering model of a described material.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialModel {
    Diffuse {
        #[serde(default = "default_roughness")]
        roughness: f32,
    },
    Dielectric {
        ior: f32,
    },
}

fn default_roughness() -> f32 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialDescription {
    pub name: String,
    #[serde(default = "default_color")]
    pub color: Vec3,
    #[serde(flatten)]
    pub model: MaterialModel,
    #[serde(default)]
    pub emission: f32,
    #[serde(default = "default_density")]
    pub volume_density: f32,
}

fn default_color() -> Vec3 {
    Vec3::ONE
}

fn default_density() -> f32 {
    1.0
}

impl MaterialDescription {
    pub fn to_material(&self) -> Material {
        let material = match self.model {
            MaterialModel::Diffuse { roughness } => Material::diffuse(self.color, roughness),
            MaterialModel::Dielectric { ior } => Material::dielectric(self.color, ior),
        };
        material
            .with_emission(self.emission)
            .with_volume_density(self.volume_density)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SphereDescription {
    pub center: Vec3,
    pub radius: f32,
    pub material: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleDescription {
    pub vertices: [Vec3; 3],
    pub material: String,
}

/// An OBJ file placed in the scene: scaled about its origin, then moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDescription {
    pub path: PathBuf,
    pub material: String,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub offset: Vec3,
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl SceneDescription {
    /// Read and parse a description file.
    pub fn load<P: AsRef<Path>>(path: P) -> SceneResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&text)?.located_at(path))
    }

    /// Resolve mesh paths next to the file at `path` and log what was read.
    ///
    /// For descriptions parsed from a file by some other route, such as a
    /// wrapper format that embeds the description.
    pub fn located_at(mut self, path: &Path) -> Self {
        self.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        log::info!(
            "Loaded scene description {}: {} materials, {} spheres, {} triangles, {} meshes",
            path.display(),
            self.materials.len(),
            self.spheres.len(),
            self.triangles.len(),
            self.meshes.len()
        );
        self
    }

    /// Parse a description from a JSON string. Mesh paths resolve against
    /// the current directory.
    pub fn from_json(text: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn camera(&self) -> Camera {
        self.camera.to_camera()
    }

    /// Assemble the scene buffer, loading meshes and building the BVH.
    pub fn build_scene(&self) -> SceneResult<Scene> {
        let mut scene = Scene::new();
        let mut ids = HashMap::with_capacity(self.materials.len());

        for material in &self.materials {
            let id = scene.add_material(material.to_material())?;
            ids.insert(material.name.as_str(), id);
        }

        let lookup = |name: &str| -> SceneResult<u32> {
            ids.get(name)
                .copied()
                .ok_or_else(|| SceneError::UnknownMaterialName(name.to_string()))
        };

        for sphere in &self.spheres {
            scene.add_sphere(Sphere::new(sphere.center, sphere.radius, lookup(&sphere.material)?))?;
        }

        for triangle in &self.triangles {
            scene.add_triangle(Triangle::new(triangle.vertices, lookup(&triangle.material)?))?;
        }

        for mesh in &self.meshes {
            let material_id = lookup(&mesh.material)?;
            let triangles = load_obj(self.base_dir.join(&mesh.path), material_id)?;
            scene.add_triangles(
                triangles
                    .iter()
                    .map(|t| t.transformed(mesh.scale, mesh.offset)),
            )?;
        }

        let nodes = scene.build_bvh()?;
        log::info!(
            "Scene built: {} spheres, {} triangles, {} BVH nodes",
            scene.sphere_count(),
            scene.triangle_count(),
            nodes
        );

        Ok(scene)
    }
}
