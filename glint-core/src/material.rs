//! Parameters of the glinty microfacet material.

use serde::{Deserialize, Serialize};

/// Inclusive range a tunable parameter may take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
}

impl ParamRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Maps `value` to `[0, 1]` within the range.
    pub fn normalize(&self, value: f32) -> f32 {
        ((self.clamp(value) - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    /// Maps `t` in `[0, 1]` back into the range.
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + t.clamp(0.0, 1.0) * (self.max - self.min)
    }
}

/// The user-tunable material parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlintMaterial {
    /// Beckmann roughness along the tangent.
    pub alpha_x: f32,
    /// Beckmann roughness along the bitangent.
    pub alpha_y: f32,
    /// Natural log of the number of microfacets per unit area.
    pub log_microfacet_density: f32,
    /// Fraction of the surface covered by glinty microfacets.
    pub microfacet_relative_area: f32,
    /// Upper bound on footprint samples along the major axis.
    pub max_anisotropy: f32,
}

impl GlintMaterial {
    pub const ROUGHNESS_RANGE: ParamRange = ParamRange::new(0.01, 1.0);
    pub const LOG_DENSITY_RANGE: ParamRange = ParamRange::new(15.0, 40.0);
    pub const RELATIVE_AREA_RANGE: ParamRange = ParamRange::new(0.01, 1.0);

    /// Returns a copy with every slider-controlled parameter inside its range.
    pub fn clamped(&self) -> Self {
        Self {
            alpha_x: Self::ROUGHNESS_RANGE.clamp(self.alpha_x),
            alpha_y: Self::ROUGHNESS_RANGE.clamp(self.alpha_y),
            log_microfacet_density: Self::LOG_DENSITY_RANGE.clamp(self.log_microfacet_density),
            microfacet_relative_area: Self::RELATIVE_AREA_RANGE
                .clamp(self.microfacet_relative_area),
            max_anisotropy: self.max_anisotropy.max(1.0),
        }
    }
}

impl Default for GlintMaterial {
    fn default() -> Self {
        Self {
            alpha_x: 0.5,
            alpha_y: 0.5,
            log_microfacet_density: 27.0,
            microfacet_relative_area: 1.0,
            max_anisotropy: 8.0,
        }
    }
}
