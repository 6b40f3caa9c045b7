//! Caller-supplied configuration bitmasks

use bitflags::bitflags;

bitflags! {
    /// Flags altering how strictly a document is loaded
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Options: u32 {
        /// Accept documents whose top-level `asset` object is missing or invalid.
        ///
        /// A well-formed `asset` object is still checked: a `version` or
        /// `minVersion` other than 2.x fails with `UnsupportedVersion`.
        const DONT_REQUIRE_VALID_ASSET_MEMBER = 1 << 0;
        /// Decompose node `matrix` values into translation/rotation/scale.
        const DECOMPOSE_NODE_MATRICES = 1 << 1;
    }
}

bitflags! {
    /// Extensions the parser is allowed to act on
    ///
    /// Extension keys whose bit is not set are ignored while parsing. A
    /// document requiring such an extension cannot be parsed at all.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Extensions: u64 {
        const KHR_TEXTURE_BASISU = 1 << 0;
        const MSFT_TEXTURE_DDS = 1 << 1;
        const EXT_TEXTURE_WEBP = 1 << 2;
        const KHR_TEXTURE_TRANSFORM = 1 << 3;
        const KHR_LIGHTS_PUNCTUAL = 1 << 4;
        const KHR_MATERIALS_SPECULAR = 1 << 5;
        const KHR_MATERIALS_CLEARCOAT = 1 << 6;
        const KHR_MATERIALS_TRANSMISSION = 1 << 7;
        const KHR_MATERIALS_IOR = 1 << 8;
        const KHR_MATERIALS_EMISSIVE_STRENGTH = 1 << 9;
        const KHR_MATERIALS_UNLIT = 1 << 10;
        const KHR_MESH_QUANTIZATION = 1 << 11;
    }
}

bitflags! {
    /// Parts of the asset graph a `parse` call materializes
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Category: u32 {
        const BUFFERS = 1 << 0;
        const BUFFER_VIEWS = 1 << 1;
        const ACCESSORS = 1 << 2;
        const IMAGES = 1 << 3;
        const SAMPLERS = 1 << 4;
        const TEXTURES = 1 << 5;
        const MATERIALS = 1 << 6;
        const MESHES = 1 << 7;
        const SKINS = 1 << 8;
        const CAMERAS = 1 << 9;
        const LIGHTS = 1 << 10;
        const ANIMATIONS = 1 << 11;
        const NODES = 1 << 12;
        const SCENES = 1 << 13;

        /// Everything needed to read raw bytes out of accessors.
        const ONLY_RENDERABLE = Self::BUFFERS.bits()
            | Self::BUFFER_VIEWS.bits()
            | Self::ACCESSORS.bits()
            | Self::IMAGES.bits()
            | Self::SAMPLERS.bits()
            | Self::TEXTURES.bits()
            | Self::MATERIALS.bits()
            | Self::MESHES.bits()
            | Self::NODES.bits()
            | Self::SCENES.bits();
    }
}

impl Category {
    /// Categories in the order sub-parsers run
    pub const CANONICAL_ORDER: [Category; 14] = [
        Category::BUFFERS,
        Category::BUFFER_VIEWS,
        Category::ACCESSORS,
        Category::IMAGES,
        Category::SAMPLERS,
        Category::TEXTURES,
        Category::MATERIALS,
        Category::MESHES,
        Category::SKINS,
        Category::CAMERAS,
        Category::LIGHTS,
        Category::ANIMATIONS,
        Category::NODES,
        Category::SCENES,
    ];

    /// Top-level JSON key holding the category's array
    ///
    /// Lights live under the root `extensions` object and have no key of their own.
    pub fn json_key(self) -> Option<&'static str> {
        const KEYS: [(Category, &str); 13] = [
            (Category::BUFFERS, "buffers"),
            (Category::BUFFER_VIEWS, "bufferViews"),
            (Category::ACCESSORS, "accessors"),
            (Category::IMAGES, "images"),
            (Category::SAMPLERS, "samplers"),
            (Category::TEXTURES, "textures"),
            (Category::MATERIALS, "materials"),
            (Category::MESHES, "meshes"),
            (Category::SKINS, "skins"),
            (Category::CAMERAS, "cameras"),
            (Category::ANIMATIONS, "animations"),
            (Category::NODES, "nodes"),
            (Category::SCENES, "scenes"),
        ];
        KEYS.iter()
            .find(|(category, _)| *category == self)
            .map(|(_, key)| *key)
    }

    /// Adds categories a requested category cannot be read without
    ///
    /// Node light references are only meaningful together with the light
    /// collection, so `NODES` pulls in `LIGHTS` when lights are enabled.
    pub fn with_dependencies(self, enabled: Extensions) -> Category {
        let mut mask = self;
        if mask.contains(Category::NODES) && enabled.contains(Extensions::KHR_LIGHTS_PUNCTUAL) {
            mask |= Category::LIGHTS;
        }
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_covers_all() {
        let combined = Category::CANONICAL_ORDER
            .iter()
            .fold(Category::empty(), |acc, c| acc | *c);
        assert_eq!(combined, Category::all());
    }

    #[test]
    fn test_nodes_pull_in_lights_only_when_enabled() {
        assert!(Category::NODES
            .with_dependencies(Extensions::KHR_LIGHTS_PUNCTUAL)
            .contains(Category::LIGHTS));
        assert!(!Category::NODES
            .with_dependencies(Extensions::empty())
            .contains(Category::LIGHTS));
    }

    #[test]
    fn test_json_keys() {
        assert_eq!(Category::BUFFER_VIEWS.json_key(), Some("bufferViews"));
        assert_eq!(Category::LIGHTS.json_key(), None);
    }
}
