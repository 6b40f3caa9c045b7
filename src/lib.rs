//! archetype_gltf - Category-selective glTF 2.0 parser and validator
//!
//! # Features
//! - JSON and GLB container detection
//! - Repeatable, category-masked parsing of the asset graph
//! - Static extension registry (texture sources, transforms, lights, materials)
//! - Uniform data sources for URIs, data URIs, GLB chunks and custom buffers
//! - Fail-fast cross-reference validation
//!
//! # Quick Start
//!
//! ```ignore
//! use archetype_gltf::{Category, Extensions, GltfDataBuffer, Options, Parser};
//!
//! let data = GltfDataBuffer::from_path("lamp/Lamp.gltf")?;
//! let mut parser = Parser::new(Extensions::KHR_LIGHTS_PUNCTUAL);
//! let mut document = parser.load_gltf(&data, "lamp", Options::empty())?;
//! document.parse(Category::NODES)?;
//! document.validate()?;
//! let asset = document.into_asset();
//! ```

// Core modules
pub mod alloc;
pub mod extensions;
pub mod loader;
pub mod model;
pub mod validate;

// Support modules
mod json;
pub mod mime;
pub mod options;
pub mod source;
pub mod uri;

// Error types
mod error;
pub use error::{Error, Relation, Result};

// Re-export configuration
pub use options::{Category, Extensions, Options};

// Re-export loader types
pub use loader::gltf::{load_gltf_bytes, load_gltf_file};
pub use loader::{DataOrigin, Document, DocumentState, GltfDataBuffer, Parser};

// Re-export data source types
pub use alloc::{BufferAllocator, CustomBufferId, MemoryAllocator};
pub use mime::MimeType;
pub use source::{ArraySource, BufferViewSource, CustomBufferSource, DataSource, UriSource};
pub use uri::Uri;

// Re-export model types
pub use extensions::{ExtensionField, ExtensionTarget};
pub use model::*;

pub use validate::validate;

// Version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_every_extension_has_a_flag() {
        for name in extensions::registered_extensions() {
            assert!(extensions::extension_flag(name).is_some(), "{name}");
        }
    }
}
