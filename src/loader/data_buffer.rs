//! Owned byte buffer holding a glTF or GLB file

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Where the bytes of a [`GltfDataBuffer`] came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOrigin {
    File(PathBuf),
    Memory,
}

/// The raw contents of a `.gltf` or `.glb` file
#[derive(Debug, Clone)]
pub struct GltfDataBuffer {
    bytes: Vec<u8>,
    origin: DataOrigin,
}

impl GltfDataBuffer {
    /// Read a whole file into memory
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        log::debug!("Read {} bytes from {}", bytes.len(), path.display());

        Ok(Self {
            bytes,
            origin: DataOrigin::File(path.to_path_buf()),
        })
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            origin: DataOrigin::Memory,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn origin(&self) -> &DataOrigin {
        &self.origin
    }

    /// Directory containing the source file, if loaded from disk
    pub fn parent_dir(&self) -> Option<&Path> {
        match &self.origin {
            DataOrigin::File(path) => path.parent(),
            DataOrigin::Memory => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_path_records_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.gltf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"{}")
            .unwrap();

        let buffer = GltfDataBuffer::from_path(&path).unwrap();
        assert_eq!(buffer.as_bytes(), b"{}");
        assert_eq!(buffer.origin(), &DataOrigin::File(path.clone()));
        assert_eq!(buffer.parent_dir(), Some(dir.path()));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GltfDataBuffer::from_path(dir.path().join("missing.glb")).unwrap_err();
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::NotFound,
                ..
            }
        ));
    }

    #[test]
    fn test_memory_buffer() {
        let buffer = GltfDataBuffer::from_bytes(vec![1, 2, 3]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.origin(), &DataOrigin::Memory);
        assert_eq!(buffer.parent_dir(), None);
    }
}
