//! Heap-backed allocator
//!
//! Keeps every payload in a shared map so tests and tools can read the
//! bytes back by handle.

use super::{BufferAllocator, CustomBufferId};
use crate::error::{Error, Result};
use crate::mime::MimeType;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Region {
    data: Vec<u8>,
    mime_type: MimeType,
}

/// Allocator that stores payloads in memory
///
/// Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryAllocator {
    regions: Arc<RwLock<HashMap<CustomBufferId, Region>>>,
    next_id: Arc<AtomicU64>,
    allocated_bytes: Arc<AtomicU64>,
}

impl MemoryAllocator {
    /// Create an empty allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bytes currently reserved
    pub fn allocated_bytes(&self) -> u64 {
        self.allocated_bytes.load(Ordering::Relaxed)
    }

    /// Number of live regions
    pub fn region_count(&self) -> usize {
        self.regions.read().len()
    }

    /// Copy of a region's bytes
    pub fn read(&self, id: CustomBufferId) -> Option<Vec<u8>> {
        self.regions.read().get(&id).map(|r| r.data.clone())
    }

    /// MIME type the region was allocated with
    pub fn mime_type(&self, id: CustomBufferId) -> Option<MimeType> {
        self.regions.read().get(&id).map(|r| r.mime_type)
    }
}

impl BufferAllocator for MemoryAllocator {
    fn allocate(&self, size: usize, mime_type: MimeType) -> Result<CustomBufferId> {
        if size == 0 {
            return Err(Error::Allocation("zero-sized payload".to_string()));
        }

        // Ids start at 1 so that 0 never names a live region
        let id = CustomBufferId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.regions.write().insert(
            id,
            Region {
                data: vec![0u8; size],
                mime_type,
            },
        );
        self.allocated_bytes.fetch_add(size as u64, Ordering::Relaxed);
        Ok(id)
    }

    fn write(&self, id: CustomBufferId, offset: usize, data: &[u8]) -> Result<()> {
        let mut regions = self.regions.write();
        let region = regions
            .get_mut(&id)
            .ok_or_else(|| Error::Allocation(format!("unknown buffer {id}")))?;

        let end = offset
            .checked_add(data.len())
            .filter(|&end| end <= region.data.len())
            .ok_or_else(|| {
                Error::Allocation(format!(
                    "Data exceeds buffer size: offset={}, data_len={}, buffer_size={}",
                    offset,
                    data.len(),
                    region.data.len()
                ))
            })?;

        region.data[offset..end].copy_from_slice(data);
        Ok(())
    }

    fn release(&self, id: CustomBufferId) {
        if let Some(region) = self.regions.write().remove(&id) {
            self.allocated_bytes
                .fetch_sub(region.data.len() as u64, Ordering::Relaxed);
        }
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_tracks_bytes() {
        let allocator = MemoryAllocator::new();
        let id = allocator.allocate(1024, MimeType::OctetStream).unwrap();

        assert_eq!(allocator.allocated_bytes(), 1024);
        assert_eq!(allocator.region_count(), 1);
        assert_eq!(allocator.mime_type(id), Some(MimeType::OctetStream));
    }

    #[test]
    fn test_write_with_offset() {
        let allocator = MemoryAllocator::new();
        let id = allocator.allocate(8, MimeType::None).unwrap();

        allocator.write(id, 4, &[5, 6, 7, 8]).unwrap();
        assert_eq!(allocator.read(id).unwrap(), vec![0, 0, 0, 0, 5, 6, 7, 8]);
    }

    #[test]
    fn test_write_overflow() {
        let allocator = MemoryAllocator::new();
        let id = allocator.allocate(10, MimeType::None).unwrap();

        assert!(allocator.write(id, 0, &[0u8; 20]).is_err());
        assert!(allocator.write(id, usize::MAX, &[1]).is_err());
    }

    #[test]
    fn test_zero_size_rejected() {
        let allocator = MemoryAllocator::new();
        assert!(allocator.allocate(0, MimeType::None).is_err());
    }

    #[test]
    fn test_release() {
        let allocator = MemoryAllocator::new();
        let id = allocator.allocate(64, MimeType::Png).unwrap();

        allocator.release(id);
        assert_eq!(allocator.allocated_bytes(), 0);
        assert_eq!(allocator.read(id), None);
    }

    #[test]
    fn test_clone_shares_storage() {
        let first = MemoryAllocator::new();
        let id = first.allocate(16, MimeType::None).unwrap();

        let second = first.clone();
        assert_eq!(second.allocated_bytes(), 16);
        assert!(second.read(id).is_some());
    }
}
