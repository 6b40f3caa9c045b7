//! Images, samplers and textures

use crate::source::DataSource;

/// An image referenced by textures
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub name: Option<String>,
    pub data: DataSource,
    /// Declared `mimeType` that names no known type; rejected by validation
    pub unknown_mime_type: Option<String>,
}

/// Texture filtering modes (GL enum values)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
    NearestMipMapNearest,
    LinearMipMapNearest,
    NearestMipMapLinear,
    LinearMipMapLinear,
}

impl Filter {
    pub fn from_gl(value: u64) -> Option<Self> {
        match value {
            9728 => Some(Self::Nearest),
            9729 => Some(Self::Linear),
            9984 => Some(Self::NearestMipMapNearest),
            9985 => Some(Self::LinearMipMapNearest),
            9986 => Some(Self::NearestMipMapLinear),
            9987 => Some(Self::LinearMipMapLinear),
            _ => None,
        }
    }

    /// Whether the filter may be used for magnification
    pub fn is_mag_filter(&self) -> bool {
        matches!(self, Self::Nearest | Self::Linear)
    }
}

/// Texture coordinate wrapping modes (GL enum values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    ClampToEdge,
    MirroredRepeat,
    #[default]
    Repeat,
}

impl Wrap {
    pub fn from_gl(value: u64) -> Option<Self> {
        match value {
            33071 => Some(Self::ClampToEdge),
            33648 => Some(Self::MirroredRepeat),
            10497 => Some(Self::Repeat),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sampler {
    pub name: Option<String>,
    pub mag_filter: Option<Filter>,
    pub min_filter: Option<Filter>,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
}

/// Extension that supplied a texture's image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSourceExtension {
    /// `KHR_texture_basisu`
    Basisu,
    /// `MSFT_texture_dds`
    Dds,
    /// `EXT_texture_webp`
    Webp,
}

/// A sampler and image pair
///
/// When an image-source extension is active, `image_index` is the
/// extension's image and `fallback_image_index` is the core `source`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Texture {
    pub name: Option<String>,
    pub image_index: Option<usize>,
    pub fallback_image_index: Option<usize>,
    pub sampler_index: Option<usize>,
    /// Set when `image_index` came from an extension
    pub image_extension: Option<ImageSourceExtension>,
}
