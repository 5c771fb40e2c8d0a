//! The overlay drawn over the scene.
//!
//! A batched quad renderer, the built-in bitmap font and the widgets of the parameter panel.

use glam::Vec2;
use glow::HasContext;

use crate::abs::Vertex;

/// Overlay vertex in pixel coordinates. Colour is a uniform of the batch.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct UIVertex {
    pub position: Vec2,
    pub uv: Vec2,
}

impl Vertex for UIVertex {
    fn vertex_attribs(gl: &glow::Context) {
        let stride = std::mem::size_of::<UIVertex>() as i32;
        let attributes = [
            (0, std::mem::offset_of!(UIVertex, position)),
            (1, std::mem::offset_of!(UIVertex, uv)),
        ];
        for (location, offset) in attributes {
            unsafe {
                gl.enable_vertex_attrib_array(location);
                gl.vertex_attrib_pointer_f32(location, 2, glow::FLOAT, false, stride, offset as i32);
            }
        }
    }
}

pub mod font;
pub mod uirenderer;
pub mod widgets;
