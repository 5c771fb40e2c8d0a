//! The GPU independent core of the real-time glint demo.
//!
//! This crate holds everything that can run without a GL context: the shader stage naming
//! convention, the dictionary layout and decoder, mesh data with tangent frames, the camera,
//! material parameters and the runtime configuration.

pub mod camera;
pub mod config;
pub mod dictionary;
pub mod geometry;
pub mod material;
pub mod stage;

pub use camera::{Camera, CameraMovement};
pub use config::GlintConfig;
pub use dictionary::{DictionaryLayout, DictionaryParams, DistributionArray};
pub use geometry::{MeshData, ModelVertex};
pub use material::{GlintMaterial, ParamRange};
pub use stage::ShaderStage;
