//! Module providing the `Scene` trait and all scene implementations.
//!
//! Scenes are looked up by name in [`registry`].

use std::sync::Arc;

use glint_core::{GlintConfig, config::ConfigError, dictionary::DictionaryError};
use indexmap::IndexMap;

use crate::{
    abs::{ProgramError, ProgramErrorKind},
    other::UpdateContext,
    render::{RenderError, dictionary::DictionaryLoadError, model::ModelLoadError, ui::uirenderer::UIRenderer},
};

pub mod glint;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Dictionary(#[from] DictionaryLoadError),
    #[error(transparent)]
    Model(#[from] ModelLoadError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unknown scene name: {0}")]
    UnknownScene(String),
    #[error("{0}")]
    Window(String),
}

impl SceneError {
    /// Category of the shader program failure behind this error, if any.
    pub fn program_error_kind(&self) -> Option<ProgramErrorKind> {
        match self {
            SceneError::Program(e) | SceneError::Render(RenderError::Program(e)) => Some(e.kind()),
            _ => None,
        }
    }
}

impl From<DictionaryError> for SceneError {
    fn from(e: DictionaryError) -> Self {
        SceneError::Dictionary(e.into())
    }
}

/// The Scene trait defines the common interface of every scene the runner can drive.
pub trait Scene {
    /// Records the framebuffer size before [`Scene::init`].
    fn set_dimensions(&mut self, width: u32, height: u32);

    /// Loads textures, compiles shaders and sets the initial GL state.
    fn init(&mut self) -> Result<(), SceneError>;

    /// Advances the scene. `time` is the number of seconds since the runner started.
    fn update(&mut self, time: f32, ctx: &UpdateContext);

    /// Draws the scene and its overlay.
    fn render(&mut self, ui: &mut UIRenderer);

    /// Called after [`Scene::init`] and whenever the framebuffer size changes.
    fn resize(&mut self, width: u32, height: u32);

    /// Handles an event.
    fn handle_event(&mut self, _event: &sdl2::event::Event) {}
}

/// Every scene by name, with a one-line description.
pub fn registry() -> IndexMap<&'static str, &'static str> {
    IndexMap::from([("glint", "Rendering real time glint")])
}

pub const DEFAULT_SCENE: &str = "glint";

/// Help text listing the known scenes.
pub fn usage(program: &str) -> String {
    let mut text = format!("Usage: {program} scene-name\n\nScene names: \n");
    for (name, description) in registry() {
        text.push_str(&format!("  {name:>11} : {description}\n"));
    }
    text
}

/// Creates the scene registered under `name`.
pub fn create(
    name: &str,
    gl: &Arc<glow::Context>,
    config: &GlintConfig,
    introspect: bool,
) -> Result<Box<dyn Scene>, SceneError> {
    match name {
        "glint" => Ok(Box::new(glint::SceneGlint::new(gl, config, introspect))),
        _ => Err(SceneError::UnknownScene(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lists_glint_only() {
        let registry = registry();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(DEFAULT_SCENE), Some(&"Rendering real time glint"));
    }

    #[test]
    fn test_program_error_kind_reaches_through_render_errors() {
        let link = SceneError::from(ProgramError::Link("unresolved".to_string()));
        assert_eq!(link.program_error_kind(), Some(ProgramErrorKind::Link));

        let ui = SceneError::from(RenderError::from(ProgramError::NotCompiled));
        assert_eq!(ui.program_error_kind(), Some(ProgramErrorKind::State));

        let window = SceneError::Window("no display".to_string());
        assert_eq!(window.program_error_kind(), None);
    }

    #[test]
    fn test_usage_lists_scenes() {
        let usage = usage("realtime-glint");
        assert!(usage.starts_with("Usage: realtime-glint scene-name"));
        assert!(usage.contains("        glint : Rendering real time glint"));
    }
}
