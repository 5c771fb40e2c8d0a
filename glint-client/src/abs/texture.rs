//! GPU textures.
//!
//! [`Texture`] is the RGBA8 image used by the UI font atlas, [`ArrayTexture1D`] holds the float
//! rows of the glint dictionary. Both are deleted when dropped.

use std::{num::NonZero, sync::Arc};

use glow::HasContext;

/// Copyable reference to a 2D texture, used by the UI batches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub NonZero<u32>);

impl TextureHandle {
    pub fn bind(&self, gl: &glow::Context, unit: u32) {
        unsafe {
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(glow::NativeTexture(self.0)));
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

impl Filter {
    fn gl_enum(self) -> i32 {
        match self {
            Filter::Nearest => glow::NEAREST as i32,
            Filter::Linear => glow::LINEAR as i32,
        }
    }
}

/// Single level, clamped sampling on the texture bound to `target`.
unsafe fn configure_sampling(gl: &glow::Context, target: u32, filter: Filter) {
    unsafe {
        gl.tex_parameter_i32(target, glow::TEXTURE_MAX_LEVEL, 0);
        gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, filter.gl_enum());
        gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, filter.gl_enum());
        gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        if target == glow::TEXTURE_2D {
            gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        }
    }
}

/// Checks that `len` elements fill `rows` rows of `width` texels with `channels` components.
fn check_texel_count(len: usize, width: u32, rows: u32, channels: usize) -> Result<(), String> {
    let expected = width as usize * rows as usize * channels;
    if len == expected {
        Ok(())
    } else {
        Err(format!(
            "expected {expected} components for {rows} rows of width {width}, got {len}"
        ))
    }
}

/// Nearest filtered RGBA8 2D texture.
pub struct Texture {
    gl: Arc<glow::Context>,
    id: glow::Texture,
}

impl Texture {
    pub fn new_from_data(
        gl: &Arc<glow::Context>,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<Self, String> {
        check_texel_count(data.len(), width, height, 4)?;
        unsafe {
            let id = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_2D, Some(id));
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(data)),
            );
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
            configure_sampling(gl, glow::TEXTURE_2D, Filter::Nearest);
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id,
            })
        }
    }

    pub fn handle(&self) -> TextureHandle {
        TextureHandle(self.id.0)
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

/// A `GL_TEXTURE_1D_ARRAY`: `layers` rows of `width` texels, one per layer.
pub struct ArrayTexture1D {
    gl: Arc<glow::Context>,
    id: glow::Texture,
    width: u32,
    layers: u32,
}

impl ArrayTexture1D {
    /// Uploads RGBA f32 rows, layer after layer, into a single level texture stored with
    /// `internal_format`.
    pub fn from_rgba_f32(
        gl: &Arc<glow::Context>,
        width: u32,
        layers: u32,
        internal_format: u32,
        texels: &[f32],
        filter: Filter,
    ) -> Result<Self, String> {
        check_texel_count(texels.len(), width, layers, 4)?;
        let bytes = unsafe {
            std::slice::from_raw_parts(texels.as_ptr() as *const u8, std::mem::size_of_val(texels))
        };
        unsafe {
            let id = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_1D_ARRAY, Some(id));
            gl.tex_image_2d(
                glow::TEXTURE_1D_ARRAY,
                0,
                internal_format as i32,
                width as i32,
                layers as i32,
                0,
                glow::RGBA,
                glow::FLOAT,
                glow::PixelUnpackData::Slice(Some(bytes)),
            );
            configure_sampling(gl, glow::TEXTURE_1D_ARRAY, filter);
            gl.bind_texture(glow::TEXTURE_1D_ARRAY, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id,
                width,
                layers,
            })
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn layers(&self) -> u32 {
        self.layers
    }

    pub fn bind(&self, unit: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_1D_ARRAY, Some(self.id));
        }
    }
}

impl Drop for ArrayTexture1D {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texel_count() {
        assert!(check_texel_count(64 * 4 * 4, 64, 4, 4).is_ok());
        let err = check_texel_count(10, 2, 2, 4).unwrap_err();
        assert!(err.contains("expected 16"));
    }

    #[test]
    fn test_filter_enums() {
        assert_eq!(Filter::Nearest.gl_enum(), glow::NEAREST as i32);
        assert_eq!(Filter::Linear.gl_enum(), glow::LINEAR as i32);
    }
}
