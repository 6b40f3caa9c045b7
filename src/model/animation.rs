//! Keyframe animations

/// Node property an animation channel drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

impl AnimationPath {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "translation" => Some(Self::Translation),
            "rotation" => Some(Self::Rotation),
            "scale" => Some(Self::Scale),
            "weights" => Some(Self::Weights),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

impl Interpolation {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LINEAR" => Some(Self::Linear),
            "STEP" => Some(Self::Step),
            "CUBICSPLINE" => Some(Self::CubicSpline),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationChannel {
    /// Index into the owning animation's samplers
    pub sampler_index: usize,
    /// Target node; absent when an extension supplies the target
    pub node_index: Option<usize>,
    pub path: AnimationPath,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSampler {
    /// Accessor with keyframe times
    pub input_accessor: usize,
    /// Accessor with keyframe values
    pub output_accessor: usize,
    pub interpolation: Interpolation,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Animation {
    pub name: Option<String>,
    pub channels: Vec<AnimationChannel>,
    pub samplers: Vec<AnimationSampler>,
}
