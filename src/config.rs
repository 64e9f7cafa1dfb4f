//! Mount-time configuration for the splash cursor.
//!
//! A [`SplashConfig`] is fixed for the lifetime of a mount. What the effect
//! actually runs with is the result of [`SplashConfig::downgrade`] against the
//! capabilities reported by the canvas.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::device::Capabilities;
use crate::error::{Result, SplashError};

/// Dye resolution used when the device cannot filter or render float fields.
pub const FALLBACK_DYE_RESOLUTION: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplashConfig {
    /// Short side of the velocity/pressure grid.
    pub sim_resolution: u32,
    /// Short side of the dye grid.
    pub dye_resolution: u32,
    /// Short side of images produced by capture.
    pub capture_resolution: u32,
    pub density_dissipation: f32,
    pub velocity_dissipation: f32,
    /// Fraction of last frame's pressure kept as the solver's starting guess.
    pub pressure: f32,
    pub pressure_iterations: u32,
    /// Vorticity confinement strength.
    pub curl: f32,
    pub splat_radius: f32,
    pub splat_force: f32,
    pub shading: bool,
    /// Pointer colors are regenerated every `1 / color_update_speed` seconds.
    pub color_update_speed: f32,
    pub back_color: Rgb,
    pub transparent: bool,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            sim_resolution: 128,
            dye_resolution: 1440,
            capture_resolution: 512,
            density_dissipation: 3.5,
            velocity_dissipation: 2.0,
            pressure: 0.1,
            pressure_iterations: 20,
            curl: 3.0,
            splat_radius: 0.2,
            splat_force: 6000.0,
            shading: true,
            color_update_speed: 10.0,
            back_color: Rgb::new(0.5, 0.0, 0.0),
            transparent: true,
        }
    }
}

impl SplashConfig {
    /// Parses a JSON document; missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let resolutions = [
            ("sim_resolution", self.sim_resolution),
            ("dye_resolution", self.dye_resolution),
            ("capture_resolution", self.capture_resolution),
        ];
        for (name, value) in resolutions {
            if value == 0 {
                return Err(SplashError::InvalidConfig(format!("{name} must be positive")));
            }
        }

        if self.pressure_iterations == 0 {
            return Err(SplashError::InvalidConfig(
                "pressure_iterations must be at least 1".into(),
            ));
        }

        let rates = [
            ("density_dissipation", self.density_dissipation),
            ("velocity_dissipation", self.velocity_dissipation),
            ("pressure", self.pressure),
            ("curl", self.curl),
            ("splat_radius", self.splat_radius),
            ("splat_force", self.splat_force),
            ("color_update_speed", self.color_update_speed),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(SplashError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        let Rgb { r, g, b } = self.back_color;
        if [r, g, b].iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(SplashError::InvalidConfig(
                "back_color channels must lie in [0, 1]".into(),
            ));
        }

        Ok(())
    }

    /// The configuration the device can actually run.
    pub fn downgrade(&self, capabilities: Capabilities) -> SplashConfig {
        let mut effective = self.clone();
        if !capabilities.linear_filtering || !capabilities.float_textures {
            effective.dye_resolution = FALLBACK_DYE_RESOLUTION;
            effective.shading = false;
        }
        effective
    }
}
