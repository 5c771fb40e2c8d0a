//! The UI renderer for the parameter overlay.

use std::sync::Arc;

use glam::{Mat4, Vec2, Vec4};
use glow::HasContext;

use crate::{
    abs::{Mesh, ShaderProgram, TextureHandle},
    render::{
        RenderError, programs,
        ui::{UIVertex, font::Font},
    },
};

/// The rendering mode for a UI element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UIRenderMode {
    Texture(TextureHandle, Vec4),
    Color(Vec4),
}

/// A draw command for rendering a UI element.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub rect: [Vec2; 2],
    pub uv_rect: [Vec2; 2],
    pub mode: UIRenderMode,
}

impl DrawCommand {
    /// A solid rectangle.
    pub fn rect(min: Vec2, size: Vec2, color: Vec4) -> Self {
        Self {
            rect: [min, min + size],
            uv_rect: [Vec2::ZERO, Vec2::ONE],
            mode: UIRenderMode::Color(color),
        }
    }
}

/// Quads sharing one render mode, accumulated until the mode changes.
#[derive(Default)]
pub struct QuadBatch {
    mode: Option<UIRenderMode>,
    vertices: Vec<UIVertex>,
    indices: Vec<u32>,
}

impl QuadBatch {
    /// Whether `command` can join the current batch.
    pub fn accepts(&self, command: &DrawCommand) -> bool {
        self.mode.is_none_or(|mode| mode == command.mode)
    }

    pub fn push(&mut self, command: &DrawCommand) {
        let base_index = self.vertices.len() as u32;
        let [min, max] = command.rect;
        let [uv_min, uv_max] = command.uv_rect;

        self.vertices.extend([
            UIVertex {
                position: Vec2::new(max.x, min.y),
                uv: Vec2::new(uv_max.x, uv_min.y),
            },
            UIVertex {
                position: min,
                uv: uv_min,
            },
            UIVertex {
                position: Vec2::new(min.x, max.y),
                uv: Vec2::new(uv_min.x, uv_max.y),
            },
            UIVertex {
                position: max,
                uv: uv_max,
            },
        ]);
        self.indices.extend([
            base_index,
            base_index + 1,
            base_index + 2,
            base_index,
            base_index + 2,
            base_index + 3,
        ]);
        self.mode = Some(command.mode);
    }

    pub fn mode(&self) -> Option<UIRenderMode> {
        self.mode
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.mode = None;
        self.vertices.clear();
        self.indices.clear();
    }
}

/// The UI renderer for rendering 2D elements on the screen.
pub struct UIRenderer {
    gl: Arc<glow::Context>,
    shader_program: ShaderProgram,
    mesh: Mesh,
    font: Font,
    pub projection_matrix: Mat4,
    batch: QuadBatch,
}

impl UIRenderer {
    /// Creates a UI renderer for a window of the given size.
    pub fn new(gl: &Arc<glow::Context>, width: u32, height: u32) -> Result<Self, RenderError> {
        let shader_program = programs::build_program(
            gl,
            &["ui.vert.glsl", "ui.frag.glsl"],
            None,
            &["Position", "UV"],
        )?;
        let mesh = Mesh::new::<UIVertex>(gl, &[], &[], glow::TRIANGLES, glow::DYNAMIC_DRAW)
            .map_err(RenderError::Gl)?;
        let font = Font::new(gl).map_err(RenderError::Gl)?;
        Ok(Self {
            gl: Arc::clone(gl),
            shader_program,
            mesh,
            font,
            projection_matrix: Self::projection(width, height),
            batch: QuadBatch::default(),
        })
    }

    /// Pixel space projection with the origin at the top left corner.
    pub fn projection(width: u32, height: u32) -> Mat4 {
        Mat4::orthographic_rh_gl(0.0, width as f32, height as f32, 0.0, -1.0, 1.0)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection_matrix = Self::projection(width, height);
    }

    /// Sets up blending and disables depth testing for the overlay.
    pub fn begin(&mut self) {
        unsafe {
            self.gl.disable(glow::DEPTH_TEST);
            self.gl.disable(glow::CULL_FACE);
            self.gl.enable(glow::BLEND);
            self.gl
                .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
    }

    /// Queues `text` with its top left corner at `position`.
    pub fn text(&mut self, text: &str, position: Vec2, font_size: f32, color: Vec4) {
        for command in self.font.text(text, position, font_size, color) {
            self.add_command(command);
        }
    }

    /// Adds a draw command to the UI renderer.
    pub fn add_command(&mut self, command: DrawCommand) {
        if !self.batch.accepts(&command) {
            self.finish();
        }
        self.batch.push(&command);
    }

    /// Draws and clears the current batch.
    pub fn finish(&mut self) {
        if let Err(e) = self.draw_batch() {
            log::error!("UI batch dropped: {e}");
        }
        self.batch.clear();
    }

    fn draw_batch(&mut self) -> Result<(), RenderError> {
        let Some(mode) = self.batch.mode() else {
            return Ok(());
        };
        if self.batch.is_empty() {
            return Ok(());
        }

        self.mesh.update(&self.batch.vertices, &self.batch.indices);
        self.shader_program.use_program()?;
        self.shader_program
            .set_uniform("u_projection", self.projection_matrix);
        match mode {
            UIRenderMode::Texture(texture_handle, color) => {
                texture_handle.bind(&self.gl, 0);
                self.shader_program.set_uniform("u_tex", 0);
                self.shader_program.set_uniform("u_color", color);
                self.shader_program.set_uniform("u_solid", false);
            }
            UIRenderMode::Color(color) => {
                self.shader_program.set_uniform("u_color", color);
                self.shader_program.set_uniform("u_solid", true);
            }
        }
        self.mesh.draw();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_builds_two_triangles_per_quad() {
        let mut batch = QuadBatch::default();
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        batch.push(&DrawCommand::rect(Vec2::ZERO, Vec2::new(10.0, 5.0), red));
        batch.push(&DrawCommand::rect(Vec2::new(20.0, 0.0), Vec2::ONE, red));

        assert_eq!(batch.vertices.len(), 8);
        assert_eq!(batch.indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(batch.vertices[1].position, Vec2::ZERO);
        assert_eq!(batch.vertices[3].position, Vec2::new(10.0, 5.0));
        assert_eq!(batch.vertices[0].uv, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_batch_accepts_only_matching_mode() {
        let mut batch = QuadBatch::default();
        let white = DrawCommand::rect(Vec2::ZERO, Vec2::ONE, Vec4::ONE);
        let black = DrawCommand::rect(Vec2::ZERO, Vec2::ONE, Vec4::W);
        assert!(batch.accepts(&black));

        batch.push(&white);
        assert!(batch.accepts(&white));
        assert!(!batch.accepts(&black));

        batch.clear();
        assert!(batch.is_empty());
        assert!(batch.accepts(&black));
    }

    #[test]
    fn test_projection_maps_pixels_to_clip_space() {
        let projection = UIRenderer::projection(200, 100);
        let top_left = projection.project_point3(glam::Vec3::ZERO);
        let bottom_right = projection.project_point3(glam::Vec3::new(200.0, 100.0, 0.0));
        assert!((top_left - glam::Vec3::new(-1.0, 1.0, 0.0)).length() < 1e-6);
        assert!((bottom_right - glam::Vec3::new(1.0, -1.0, 0.0)).length() < 1e-6);
    }
}
