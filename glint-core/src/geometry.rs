//! CPU side mesh data: vertices with tangent frames, OBJ import and a procedural sphere.

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};

/// Vertex layout shared by every mesh of the demo.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct ModelVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    pub tangent: Vec3,
}

/// Triangle list of one sub-mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to load {}: {source}", path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("{} contains no meshes", path.display())]
    Empty { path: PathBuf },
}

/// Loads every mesh of an OBJ file.
///
/// Faces are triangulated, texture coordinates are flipped vertically to match GL's origin,
/// missing normals are generated by averaging face normals and tangents are always computed.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Vec<MeshData>, ModelError> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| ModelError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    if models.is_empty() {
        return Err(ModelError::Empty {
            path: path.to_path_buf(),
        });
    }

    let meshes = models
        .into_iter()
        .map(|model| {
            let mesh = model.mesh;
            let mut vertices = mesh
                .positions
                .chunks_exact(3)
                .enumerate()
                .map(|(i, p)| ModelVertex {
                    position: Vec3::new(p[0], p[1], p[2]),
                    normal: mesh
                        .normals
                        .get(i * 3..i * 3 + 3)
                        .map_or(Vec3::ZERO, Vec3::from_slice),
                    tex_coords: mesh
                        .texcoords
                        .get(i * 2..i * 2 + 2)
                        .map_or(Vec2::ZERO, |t| Vec2::new(t[0], 1.0 - t[1])),
                    tangent: Vec3::ZERO,
                })
                .collect::<Vec<_>>();

            if mesh.normals.is_empty() {
                compute_normals(&mut vertices, &mesh.indices);
            }
            compute_tangents(&mut vertices, &mesh.indices);

            log::debug!(
                "Loaded mesh {:?}: {} vertices, {} triangles",
                model.name,
                vertices.len(),
                mesh.indices.len() / 3
            );

            MeshData {
                name: model.name,
                vertices,
                indices: mesh.indices,
            }
        })
        .collect();

    Ok(meshes)
}

/// Replaces every normal with the area weighted average of its adjacent face normals.
pub fn compute_normals(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut normals = vec![Vec3::ZERO; vertices.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let face = (vertices[b].position - vertices[a].position)
            .cross(vertices[c].position - vertices[a].position);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    for (vertex, normal) in vertices.iter_mut().zip(normals) {
        vertex.normal = normal.normalize_or(Vec3::Y);
    }
}

/// Computes per-vertex tangents aligned with the direction of increasing `u`.
///
/// Tangents are orthogonalized against the vertex normal. Vertices without usable texture
/// coordinates get an arbitrary tangent perpendicular to the normal.
pub fn compute_tangents(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut tangents = vec![Vec3::ZERO; vertices.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let edge1 = vertices[b].position - vertices[a].position;
        let edge2 = vertices[c].position - vertices[a].position;
        let duv1 = vertices[b].tex_coords - vertices[a].tex_coords;
        let duv2 = vertices[c].tex_coords - vertices[a].tex_coords;

        let det = duv1.x * duv2.y - duv2.x * duv1.y;
        if det.abs() < f32::EPSILON {
            continue;
        }
        let tangent = (edge1 * duv2.y - edge2 * duv1.y) / det;
        tangents[a] += tangent;
        tangents[b] += tangent;
        tangents[c] += tangent;
    }

    for (vertex, tangent) in vertices.iter_mut().zip(tangents) {
        let n = vertex.normal.normalize_or(Vec3::Y);
        let t = tangent - n * n.dot(tangent);
        vertex.tangent = t
            .try_normalize()
            .unwrap_or_else(|| n.any_orthonormal_vector());
    }
}

/// Builds a unit sphere centered on the origin.
///
/// `u` wraps around the Y axis and `v` runs from the south to the north pole.
pub fn uv_sphere(rings: u32, segments: u32) -> MeshData {
    let rings = rings.max(2);
    let segments = segments.max(3);

    let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
    for r in 0..=rings {
        let theta = r as f32 / rings as f32 * std::f32::consts::PI;
        for s in 0..=segments {
            let phi = s as f32 / segments as f32 * std::f32::consts::TAU;
            let normal = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            vertices.push(ModelVertex {
                position: normal,
                normal,
                tex_coords: Vec2::new(s as f32 / segments as f32, 1.0 - r as f32 / rings as f32),
                tangent: Vec3::new(-phi.sin(), 0.0, phi.cos()),
            });
        }
    }

    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
    for r in 0..rings {
        for s in 0..segments {
            let current = r * (segments + 1) + s;
            let below = current + segments + 1;
            indices.extend_from_slice(&[current, current + 1, below]);
            indices.extend_from_slice(&[current + 1, below + 1, below]);
        }
    }

    MeshData {
        name: "sphere".to_string(),
        vertices,
        indices,
    }
}
