//! GPU models built from [`MeshData`].

use std::{path::Path, sync::Arc};

use glint_core::{
    MeshData, ModelVertex,
    geometry::{self, ModelError},
};
use glow::HasContext;

use crate::abs::{Mesh, Vertex};

/// Rings and segments of the sphere drawn when no model file is configured.
pub const SPHERE_RESOLUTION: (u32, u32) = (64, 128);

impl Vertex for ModelVertex {
    fn vertex_attribs(gl: &glow::Context) {
        let stride = std::mem::size_of::<ModelVertex>() as i32;
        let f = std::mem::size_of::<f32>() as i32;
        unsafe {
            // Position
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            // Normal
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * f);
            // Texture coordinates
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(2, 2, glow::FLOAT, false, stride, 6 * f);
            // Tangent
            gl.enable_vertex_attrib_array(3);
            gl.vertex_attrib_pointer_f32(3, 3, glow::FLOAT, false, stride, 8 * f);
        }
    }
}

/// Attribute names of [`ModelVertex`] in the order of their locations.
pub const ATTRIBUTE_NAMES: [&str; 4] = ["VertexPosition", "VertexNormal", "VertexTexCoord", "VertexTangent"];

/// A set of meshes drawn together.
pub struct Model {
    meshes: Vec<Mesh>,
}

impl Model {
    pub fn from_mesh_data(gl: &Arc<glow::Context>, data: &[MeshData]) -> Result<Self, String> {
        let meshes = data
            .iter()
            .map(|mesh| {
                Mesh::new(
                    gl,
                    &mesh.vertices,
                    &mesh.indices,
                    glow::TRIANGLES,
                    glow::STATIC_DRAW,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { meshes })
    }

    /// Loads an OBJ file, or builds the procedural sphere when `path` is `None`.
    pub fn load(gl: &Arc<glow::Context>, path: Option<&Path>) -> Result<Self, ModelLoadError> {
        let data = match path {
            Some(path) => geometry::load_obj(path)?,
            None => {
                let (rings, segments) = SPHERE_RESOLUTION;
                vec![geometry::uv_sphere(rings, segments)]
            }
        };
        let triangles: usize = data.iter().map(|mesh| mesh.indices.len() / 3).sum();
        log::info!("Model ready: {} meshes, {} triangles", data.len(), triangles);
        Self::from_mesh_data(gl, &data).map_err(ModelLoadError::Gl)
    }

    pub fn draw(&self) {
        for mesh in &self.meshes {
            mesh.draw();
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelLoadError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("unable to upload model: {0}")]
    Gl(String),
}
