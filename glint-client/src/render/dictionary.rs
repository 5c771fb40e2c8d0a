//! The multiscale dictionary of marginal distributions on the GPU.

use std::sync::Arc;

use glint_core::{
    DictionaryLayout, DictionaryParams,
    dictionary::DictionaryError,
};

use crate::abs::{ArrayTexture1D, Filter, ProgramBackend, ShaderProgram};

/// Texture unit the glint shader samples the dictionary from.
pub const DICTIONARY_UNIT: u32 = 0;

#[derive(Debug, thiserror::Error)]
pub enum DictionaryLoadError {
    #[error(transparent)]
    Decode(#[from] DictionaryError),
    #[error("unable to upload dictionary: {0}")]
    Upload(String),
}

/// A decoded dictionary uploaded as one `RGB16F` 1D array texture.
pub struct GpuDictionary {
    texture: ArrayTexture1D,
    params: DictionaryParams,
}

impl GpuDictionary {
    pub fn load(gl: &Arc<glow::Context>, layout: &DictionaryLayout) -> Result<Self, DictionaryLoadError> {
        log::info!(
            "Loading dictionary {} ({} levels, {} distributions per channel)",
            layout.base().display(),
            layout.levels(),
            layout.dists_per_channel()
        );
        let array = layout.load()?;
        let texture = ArrayTexture1D::from_rgba_f32(
            gl,
            array.width,
            array.layers,
            glow::RGB16F,
            &array.texels,
            Filter::Linear,
        )
        .map_err(DictionaryLoadError::Upload)?;
        log::debug!("Dictionary texture: {} x {} layers", texture.width(), texture.layers());

        Ok(Self {
            texture,
            params: layout.params(),
        })
    }

    pub fn params(&self) -> DictionaryParams {
        self.params
    }

    pub fn bind(&self) {
        self.texture.bind(DICTIONARY_UNIT);
    }
}

/// Sets the `Dictionary.*` uniforms on the bound program.
pub fn apply_dictionary_uniforms<B: ProgramBackend>(program: &mut ShaderProgram<B>, params: &DictionaryParams) {
    program.set_uniform("Dictionary.Alpha", params.alpha);
    program.set_uniform("Dictionary.N", params.n);
    program.set_uniform("Dictionary.NLevels", params.n_levels);
    program.set_uniform("Dictionary.Pyramid0Size", params.pyramid0_size);
    program.set_uniform("DictionaryTex", DICTIONARY_UNIT as i32);
}
