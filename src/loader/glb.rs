//! GLB container framing
//!
//! # Layout
//! ```text
//! 0x00: magic   u32  "glTF"
//! 0x04: version u32  (2)
//! 0x08: length  u32  (total file length)
//! 0x0C: chunk 0 JSON, then optionally chunk 1 BIN
//!
//! chunk: length u32, type u32, data [u8; length]
//! ```
//! All integers are little-endian.

use crate::error::{Error, Result};
use bytemuck::{Pod, Zeroable};

pub(crate) const MAGIC: u32 = 0x4654_6C67; // "glTF"
pub(crate) const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
pub(crate) const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

/// GLB file header (12 bytes)
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct GlbHeader {
    magic: u32,
    version: u32,
    length: u32,
}

/// GLB chunk header (8 bytes)
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct ChunkHeader {
    length: u32,
    chunk_type: u32,
}

/// The chunks of a GLB file, borrowed from the input
#[derive(Debug)]
pub(crate) struct GlbChunks<'a> {
    pub json: &'a [u8],
    pub bin: Option<&'a [u8]>,
}

/// Check whether the bytes start with the GLB magic
pub(crate) fn is_glb(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && read_u32(&bytes[..4]) == MAGIC
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_pod<T: Pod>(bytes: &[u8], offset: usize, what: &str) -> Result<T> {
    let size = std::mem::size_of::<T>();
    let slice = offset
        .checked_add(size)
        .and_then(|end| bytes.get(offset..end))
        .ok_or_else(|| Error::InvalidGlb(format!("truncated {what} at offset {offset}")))?;
    Ok(bytemuck::pod_read_unaligned(slice))
}

/// Split a GLB file into its JSON and BIN chunks
///
/// Exactly one JSON chunk must come first; at most one BIN chunk may
/// follow. Chunks of unknown type after those are skipped.
pub(crate) fn split(bytes: &[u8]) -> Result<GlbChunks<'_>> {
    let header: GlbHeader = read_pod(bytes, 0, "header")?;
    if u32::from_le(header.magic) != MAGIC {
        return Err(Error::InvalidGlb("bad magic".to_string()));
    }
    let version = u32::from_le(header.version);
    if version != 2 {
        return Err(Error::InvalidGlb(format!("unsupported container version {version}")));
    }
    let declared = u32::from_le(header.length) as usize;
    if declared > bytes.len() {
        return Err(Error::InvalidGlb(format!(
            "header declares {declared} bytes but only {} are present",
            bytes.len()
        )));
    }
    let bytes = &bytes[..declared];

    let mut offset = std::mem::size_of::<GlbHeader>();
    let mut json = None;
    let mut bin = None;

    while offset < bytes.len() {
        let chunk: ChunkHeader = read_pod(bytes, offset, "chunk header")?;
        let length = u32::from_le(chunk.length) as usize;
        let start = offset + std::mem::size_of::<ChunkHeader>();
        let data = start
            .checked_add(length)
            .and_then(|end| bytes.get(start..end))
            .ok_or_else(|| {
                Error::InvalidGlb(format!("chunk at offset {offset} overruns the file"))
            })?;

        match u32::from_le(chunk.chunk_type) {
            CHUNK_JSON if json.is_none() && bin.is_none() => json = Some(data),
            CHUNK_JSON => return Err(Error::InvalidGlb("unexpected JSON chunk".to_string())),
            CHUNK_BIN if json.is_none() => {
                return Err(Error::InvalidGlb("BIN chunk before JSON chunk".to_string()))
            }
            CHUNK_BIN if bin.is_none() => bin = Some(data),
            CHUNK_BIN => return Err(Error::InvalidGlb("more than one BIN chunk".to_string())),
            other => log::debug!("Skipping unknown GLB chunk type {other:#010x}"),
        }

        // Chunks are 4-byte aligned
        offset = start + length.next_multiple_of(4);
    }

    let json = json.ok_or_else(|| Error::InvalidGlb("missing JSON chunk".to_string()))?;
    log::debug!(
        "GLB container: {} bytes JSON, {} bytes BIN",
        json.len(),
        bin.map_or(0, <[u8]>::len)
    );
    Ok(GlbChunks { json, bin })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(kind: u32, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    fn glb(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC.to_le_bytes());
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&((12 + body.len()) as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn test_split_json_and_bin() {
        let bytes = glb(&[chunk(CHUNK_JSON, b"{}  "), chunk(CHUNK_BIN, &[1, 2, 3, 4])]);
        assert!(is_glb(&bytes));

        let chunks = split(&bytes).unwrap();
        assert_eq!(chunks.json, b"{}  ");
        assert_eq!(chunks.bin, Some(&[1u8, 2, 3, 4][..]));
    }

    #[test]
    fn test_json_only() {
        let bytes = glb(&[chunk(CHUNK_JSON, b"{}  ")]);
        assert_eq!(split(&bytes).unwrap().bin, None);
    }

    #[test]
    fn test_rejects_bad_framing() {
        let mut wrong_version = glb(&[chunk(CHUNK_JSON, b"{}  ")]);
        wrong_version[4] = 1;
        assert!(matches!(split(&wrong_version), Err(Error::InvalidGlb(_))));

        let bin_first = glb(&[chunk(CHUNK_BIN, &[0; 4]), chunk(CHUNK_JSON, b"{}  ")]);
        assert!(split(&bin_first).is_err());

        let two_bins = glb(&[
            chunk(CHUNK_JSON, b"{}  "),
            chunk(CHUNK_BIN, &[0; 4]),
            chunk(CHUNK_BIN, &[0; 4]),
        ]);
        assert!(split(&two_bins).is_err());

        let mut truncated = glb(&[chunk(CHUNK_JSON, b"{}  ")]);
        truncated.truncate(16);
        assert!(split(&truncated).is_err());

        assert!(split(&[0u8; 8]).is_err());
    }
}
