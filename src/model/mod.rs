//! The parsed asset graph
//!
//! Entities reference each other by plain indices into the sequences owned
//! by [`Asset`]. Nothing here checks those indices; see [`crate::validate`].

mod animation;
mod buffer;
mod light;
mod material;
mod mesh;
mod node;
mod texture;

pub use animation::*;
pub use buffer::*;
pub use light::*;
pub use material::*;
pub use mesh::*;
pub use node::*;
pub use texture::*;

use crate::options::{Category, Extensions};
use crate::source::DataSource;

/// Contents of the top-level `asset` object
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetInfo {
    pub version: String,
    pub min_version: Option<String>,
    pub generator: Option<String>,
    pub copyright: Option<String>,
}

/// Everything parsed from one glTF document
///
/// Sequences of categories that were never parsed stay empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Asset {
    /// `None` when the document had no valid `asset` object and that was tolerated
    pub asset_info: Option<AssetInfo>,
    pub extensions_used: Vec<String>,
    pub extensions_required: Vec<String>,
    /// Top-level `scene`
    pub default_scene: Option<usize>,

    pub accessors: Vec<Accessor>,
    pub animations: Vec<Animation>,
    pub buffers: Vec<Buffer>,
    pub buffer_views: Vec<BufferView>,
    pub cameras: Vec<Camera>,
    pub images: Vec<Image>,
    pub lights: Vec<Light>,
    pub materials: Vec<Material>,
    pub meshes: Vec<Mesh>,
    pub nodes: Vec<Node>,
    pub samplers: Vec<Sampler>,
    pub scenes: Vec<Scene>,
    pub skins: Vec<Skin>,
    pub textures: Vec<Texture>,

    pub(crate) parsed: Category,
    pub(crate) enabled: Extensions,
}

impl Asset {
    /// Categories populated by at least one successful `parse` call
    pub fn parsed_categories(&self) -> Category {
        self.parsed
    }

    pub fn is_parsed(&self, category: Category) -> bool {
        self.parsed.contains(category)
    }

    /// Extensions that were enabled when the asset was parsed
    pub fn enabled_extensions(&self) -> Extensions {
        self.enabled
    }

    /// In-memory bytes behind a data source
    ///
    /// Follows buffer views into their buffer. Returns `None` for URI,
    /// custom-buffer and fallback sources, and for out-of-range views.
    pub fn source_bytes<'a>(&'a self, source: &'a DataSource) -> Option<&'a [u8]> {
        match source {
            DataSource::Array(array) => Some(&array.bytes),
            DataSource::BufferView(view) => self.buffer_view_bytes(view.buffer_view),
            _ => None,
        }
    }

    /// Bytes covered by a buffer view whose buffer is held in memory
    pub fn buffer_view_bytes(&self, index: usize) -> Option<&[u8]> {
        let view = self.buffer_views.get(index)?;
        let DataSource::Array(array) = &self.buffers.get(view.buffer_index)?.data else {
            return None;
        };
        let end = view.byte_offset.checked_add(view.byte_length)?;
        array.bytes.get(view.byte_offset..end)
    }

    /// Replace the sequences of `category` with those of `other`
    pub(crate) fn take_category(&mut self, other: &mut Asset, category: Category) {
        use std::mem::take;

        if category == Category::BUFFERS {
            self.buffers = take(&mut other.buffers);
        } else if category == Category::BUFFER_VIEWS {
            self.buffer_views = take(&mut other.buffer_views);
        } else if category == Category::ACCESSORS {
            self.accessors = take(&mut other.accessors);
        } else if category == Category::IMAGES {
            self.images = take(&mut other.images);
        } else if category == Category::SAMPLERS {
            self.samplers = take(&mut other.samplers);
        } else if category == Category::TEXTURES {
            self.textures = take(&mut other.textures);
        } else if category == Category::MATERIALS {
            self.materials = take(&mut other.materials);
        } else if category == Category::MESHES {
            self.meshes = take(&mut other.meshes);
        } else if category == Category::SKINS {
            self.skins = take(&mut other.skins);
        } else if category == Category::CAMERAS {
            self.cameras = take(&mut other.cameras);
        } else if category == Category::LIGHTS {
            self.lights = take(&mut other.lights);
        } else if category == Category::ANIMATIONS {
            self.animations = take(&mut other.animations);
        } else if category == Category::NODES {
            self.nodes = take(&mut other.nodes);
        } else if category == Category::SCENES {
            self.scenes = take(&mut other.scenes);
            self.default_scene = other.default_scene.take();
        }
        self.parsed |= category;
    }
}
