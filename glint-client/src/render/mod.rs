//! Module for anything related to rendering.
//!
//! This module contains the GPU model and dictionary, the shader sources and the UI overlay.

use crate::abs::ProgramError;

pub mod dictionary;
pub mod model;
pub mod programs;
pub mod ui;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error("{0}")]
    Gl(String),
}
