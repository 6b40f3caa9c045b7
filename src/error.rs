//! Error types for archetype_gltf

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Cross-reference checked by the validator
///
/// Every variant names the field that holds the index and the sequence it
/// points into, e.g. `TextureImage` is `textures[i].image_index -> images`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    BufferViewBuffer,
    AccessorBufferView,
    SparseIndicesBufferView,
    SparseValuesBufferView,
    ImageBufferView,
    TextureImage,
    TextureFallbackImage,
    TextureSampler,
    MaterialTexture,
    PrimitiveAttribute,
    PrimitiveIndices,
    PrimitiveMaterial,
    MorphTargetAttribute,
    SkinInverseBindMatrices,
    SkinSkeleton,
    SkinJoint,
    AnimationChannelSampler,
    AnimationTargetNode,
    AnimationSamplerInput,
    AnimationSamplerOutput,
    NodeChild,
    NodeMesh,
    NodeSkin,
    NodeCamera,
    NodeLight,
    SceneNode,
    DefaultScene,
}

impl Relation {
    /// Human readable `source -> target` description
    pub fn describe(&self) -> &'static str {
        match self {
            Self::BufferViewBuffer => "bufferView.buffer -> buffers",
            Self::AccessorBufferView => "accessor.bufferView -> bufferViews",
            Self::SparseIndicesBufferView => "accessor.sparse.indices.bufferView -> bufferViews",
            Self::SparseValuesBufferView => "accessor.sparse.values.bufferView -> bufferViews",
            Self::ImageBufferView => "image.bufferView -> bufferViews",
            Self::TextureImage => "texture.source -> images",
            Self::TextureFallbackImage => "texture fallback source -> images",
            Self::TextureSampler => "texture.sampler -> samplers",
            Self::MaterialTexture => "material textureInfo.index -> textures",
            Self::PrimitiveAttribute => "primitive.attributes -> accessors",
            Self::PrimitiveIndices => "primitive.indices -> accessors",
            Self::PrimitiveMaterial => "primitive.material -> materials",
            Self::MorphTargetAttribute => "primitive.targets -> accessors",
            Self::SkinInverseBindMatrices => "skin.inverseBindMatrices -> accessors",
            Self::SkinSkeleton => "skin.skeleton -> nodes",
            Self::SkinJoint => "skin.joints -> nodes",
            Self::AnimationChannelSampler => "animation.channel.sampler -> animation.samplers",
            Self::AnimationTargetNode => "animation.channel.target.node -> nodes",
            Self::AnimationSamplerInput => "animation.sampler.input -> accessors",
            Self::AnimationSamplerOutput => "animation.sampler.output -> accessors",
            Self::NodeChild => "node.children -> nodes",
            Self::NodeMesh => "node.mesh -> meshes",
            Self::NodeSkin => "node.skin -> skins",
            Self::NodeCamera => "node.camera -> cameras",
            Self::NodeLight => "node.KHR_lights_punctual.light -> lights",
            Self::SceneNode => "scene.nodes -> nodes",
            Self::DefaultScene => "scene -> scenes",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Main error type for load, parse and validation operations
///
/// The type is `Clone` so that the parser can keep the last error around
/// after handing it to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("IO error reading {path}: {message}")]
    Io {
        path: PathBuf,
        kind: std::io::ErrorKind,
        message: String,
    },

    #[error("Invalid base directory: {0}")]
    InvalidPath(PathBuf),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid GLB container: {0}")]
    InvalidGlb(String),

    #[error("Invalid glTF: {0}")]
    InvalidGltf(String),

    #[error("The top-level asset object is missing or invalid")]
    InvalidOrMissingAssetField,

    #[error("Unsupported glTF version: {0}")]
    UnsupportedVersion(String),

    #[error("Required extensions are not enabled: {}", .0.join(", "))]
    MissingExtensions(Vec<String>),

    #[error("Required extension is not supported: {0}")]
    UnknownRequiredExtension(String),

    #[error("Index {index} out of range for {relation} (length {bound})")]
    InvalidReference {
        relation: Relation,
        index: usize,
        bound: usize,
    },

    #[error("{path}: {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("{path}: unresolved data source")]
    InvalidDataSource { path: String },

    #[error("{path}: MIME type {mime} is not accepted")]
    InvalidMimeType { path: String, mime: String },

    #[error("{extension} on {path}: {reason}")]
    InvalidExtensionData {
        extension: &'static str,
        path: String,
        reason: String,
    },

    #[error("Buffer allocation failed: {0}")]
    Allocation(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub(crate) fn value(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for errors produced by [`crate::validate`] rather than by loading or parsing
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidReference { .. }
                | Self::InvalidValue { .. }
                | Self::InvalidDataSource { .. }
                | Self::InvalidMimeType { .. }
                | Self::InvalidExtensionData { .. }
        )
    }
}

/// Result type alias for glTF operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_extensions_message_lists_names() {
        let err = Error::MissingExtensions(vec![
            "KHR_texture_basisu".to_string(),
            "KHR_lights_punctual".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Required extensions are not enabled: KHR_texture_basisu, KHR_lights_punctual"
        );
    }

    #[test]
    fn test_reference_error_names_relation() {
        let err = Error::InvalidReference {
            relation: Relation::TextureSampler,
            index: 4,
            bound: 2,
        };
        assert!(err.to_string().contains("texture.sampler -> samplers"));
        assert!(err.is_validation_error());
        assert!(!Error::InvalidJson("eof".into()).is_validation_error());
    }
}
