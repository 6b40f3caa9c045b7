//! Punctual lights from `KHR_lights_punctual`

use std::f32::consts::FRAC_PI_4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Directional,
    Spot,
    Point,
}

impl LightType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "directional" => Some(Self::Directional),
            "spot" => Some(Self::Spot),
            "point" => Some(Self::Point),
            _ => None,
        }
    }
}

/// A light source attached to nodes by index
///
/// Color and intensity are stored exactly as written (linear, no gamma).
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: Option<String>,
    pub light_type: LightType,
    pub color: [f32; 3],
    pub intensity: f32,
    pub range: Option<f32>,
    /// Spot lights only
    pub inner_cone_angle: Option<f32>,
    /// Spot lights only
    pub outer_cone_angle: Option<f32>,
}

impl Light {
    /// Inner cone angle with the extension's default applied
    pub fn inner_cone(&self) -> f32 {
        self.inner_cone_angle.unwrap_or(0.0)
    }

    /// Outer cone angle with the extension's default applied
    pub fn outer_cone(&self) -> f32 {
        self.outer_cone_angle.unwrap_or(FRAC_PI_4)
    }
}
