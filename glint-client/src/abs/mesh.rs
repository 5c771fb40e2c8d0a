//! Indexed meshes on the GPU.
//!
//! A [`Mesh`] owns a vertex array with one vertex buffer and one element buffer. The vertex
//! layout comes from the [`Vertex`] implementation of the uploaded type.

use std::sync::Arc;

use glow::HasContext;

/// A vertex type that knows its own attribute layout.
pub trait Vertex {
    /// Enables and describes every attribute. Called with the vertex array and buffer bound.
    fn vertex_attribs(gl: &glow::Context);
}

fn as_bytes<T>(data: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, std::mem::size_of_val(data)) }
}

/// Creates `N` objects, deleting the ones already made when one fails.
fn create_all<T, const N: usize>(
    mut create: impl FnMut() -> Result<T, String>,
    mut delete: impl FnMut(T),
) -> Result<[T; N], String> {
    let mut made = Vec::with_capacity(N);
    for _ in 0..N {
        match create() {
            Ok(object) => made.push(object),
            Err(e) => {
                made.into_iter().for_each(&mut delete);
                return Err(e);
            }
        }
    }
    made.try_into()
        .map_err(|_| "object count mismatch".to_string())
}

pub struct Mesh {
    gl: Arc<glow::Context>,
    draw_mode: u32,
    usage: u32,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    index_count: i32,
}

impl Mesh {
    /// Creates a mesh drawn with `draw_mode`. `usage` is the buffer hint for every upload.
    pub fn new<V: Vertex>(
        gl: &Arc<glow::Context>,
        vertices: &[V],
        indices: &[u32],
        draw_mode: u32,
        usage: u32,
    ) -> Result<Self, String> {
        let vao = unsafe { gl.create_vertex_array()? };
        let [vbo, ebo] = create_all(
            || unsafe { gl.create_buffer() },
            |buffer| unsafe { gl.delete_buffer(buffer) },
        )
        .inspect_err(|_| unsafe { gl.delete_vertex_array(vao) })?;
        let mut mesh = Self {
            gl: Arc::clone(gl),
            draw_mode,
            usage,
            vao,
            vbo,
            ebo,
            index_count: 0,
        };
        mesh.upload(vertices, indices, true);
        Ok(mesh)
    }

    /// Replaces the vertex and index data, keeping the attribute layout.
    pub fn update<V: Vertex>(&mut self, vertices: &[V], indices: &[u32]) {
        self.upload(vertices, indices, false);
    }

    fn upload<V: Vertex>(&mut self, vertices: &[V], indices: &[u32], describe: bool) {
        let gl = &self.gl;
        unsafe {
            // The element buffer binding is stored in the vertex array.
            gl.bind_vertex_array(Some(self.vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, as_bytes(vertices), self.usage);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.ebo));
            gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, as_bytes(indices), self.usage);
            if describe {
                V::vertex_attribs(gl);
            }
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        self.index_count = indices.len() as i32;
    }

    pub fn draw(&self) {
        if self.index_count == 0 {
            return;
        }
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl
                .draw_elements(self.draw_mode, self.index_count, glow::UNSIGNED_INT, 0);
            self.gl.bind_vertex_array(None);
        }
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_buffer(self.ebo);
            self.gl.delete_vertex_array(self.vao);
        }
    }
}
