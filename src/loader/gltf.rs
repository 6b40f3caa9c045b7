//! One-call loading helpers
//!
//! These wrap [`Parser`], [`Document::parse`] and [`Document::validate`]
//! for callers that want the whole asset at once.

use super::{Document, GltfDataBuffer, Parser};
use crate::error::Result;
use crate::model::Asset;
use crate::options::{Category, Extensions, Options};
use std::path::Path;

/// Load, fully parse and validate a `.gltf` or `.glb` file
///
/// Relative URIs resolve against the file's directory.
pub fn load_gltf_file<P: AsRef<Path>>(
    path: P,
    extensions: Extensions,
    options: Options,
) -> Result<Asset> {
    let data = GltfDataBuffer::from_path(path.as_ref())?;
    let base_dir = data.parent_dir().unwrap_or(Path::new(".")).to_path_buf();
    let document = Parser::new(extensions).load_gltf(&data, base_dir, options)?;
    finish(document)
}

/// Load, fully parse and validate a document held in memory
pub fn load_gltf_bytes(
    data: &[u8],
    base_dir: impl AsRef<Path>,
    extensions: Extensions,
    options: Options,
) -> Result<Asset> {
    let data = GltfDataBuffer::from_bytes(data);
    let document = Parser::new(extensions).load_gltf(&data, base_dir, options)?;
    finish(document)
}

fn finish(mut document: Document) -> Result<Asset> {
    document.parse(Category::all())?;
    document.validate()?;
    Ok(document.into_asset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_load_empty_bytes() {
        let result = load_gltf_bytes(&[], ".", Extensions::empty(), Options::empty());
        assert!(matches!(result, Err(Error::InvalidJson(_))));
    }

    #[test]
    fn test_load_minimal_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minimal.gltf");
        std::fs::write(
            &path,
            br#"{"asset":{"version":"2.0"},"scenes":[{"nodes":[0]}],"nodes":[{}]}"#,
        )
        .unwrap();

        let asset = load_gltf_file(&path, Extensions::empty(), Options::empty()).unwrap();
        assert_eq!(asset.scenes[0].node_indices, vec![0]);
        assert_eq!(asset.parsed_categories(), Category::all());
    }
}
