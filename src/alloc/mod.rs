//! Caller-supplied storage for decoded buffer payloads
//!
//! By default decoded bytes (data URIs, the GLB binary chunk) are owned by
//! the [`crate::Asset`] as [`crate::DataSource::Array`]. A parser configured
//! with a [`BufferAllocator`] instead hands those bytes to the allocator and
//! records the returned handle as [`crate::DataSource::CustomBuffer`].

pub mod memory;

use crate::error::Result;
use crate::mime::MimeType;
use std::fmt::{self, Debug};

/// Opaque handle returned by a [`BufferAllocator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomBufferId(pub u64);

impl fmt::Display for CustomBufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Storage backend for decoded payloads
///
/// The parser calls [`allocate`](Self::allocate) once per payload and then
/// [`write`](Self::write) with the full byte range.
///
/// # Example
/// ```ignore
/// let allocator = Arc::new(MemoryAllocator::new());
/// let mut parser = Parser::new(Extensions::empty()).with_allocator(allocator.clone());
/// ```
pub trait BufferAllocator: Send + Sync + Debug {
    /// Reserve `size` bytes for a payload of the given MIME type
    fn allocate(&self, size: usize, mime_type: MimeType) -> Result<CustomBufferId>;

    /// Copy `data` into a reserved region at `offset`
    fn write(&self, id: CustomBufferId, offset: usize, data: &[u8]) -> Result<()>;

    /// Release a region (optional cleanup)
    fn release(&self, _id: CustomBufferId) {
        // Default: storage lives as long as the allocator
    }

    /// Get the name of this backend (for debugging)
    fn backend_name(&self) -> &'static str;
}

/// Allocate and fill a region in one step
pub(crate) fn store(
    allocator: &dyn BufferAllocator,
    bytes: &[u8],
    mime_type: MimeType,
) -> Result<CustomBufferId> {
    let id = allocator.allocate(bytes.len(), mime_type)?;
    allocator.write(id, 0, bytes)?;
    log::trace!(
        "stored {} bytes in {} buffer {id}",
        bytes.len(),
        allocator.backend_name()
    );
    Ok(id)
}

pub use memory::MemoryAllocator;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_allocates_and_writes() {
        let allocator = MemoryAllocator::new();
        let id = store(&allocator, &[9, 8, 7], MimeType::OctetStream).unwrap();
        assert_eq!(allocator.read(id), Some(vec![9, 8, 7]));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(CustomBufferId(12).to_string(), "#12");
    }
}
