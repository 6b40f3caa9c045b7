//! Data source resolution for buffer and image payloads
//!
//! Every [`Buffer`](crate::Buffer) and [`Image`](crate::Image) carries
//! exactly one [`DataSource`]. Resolution classifies the raw reference
//! without touching the file system or the network: local paths are only
//! joined with the base directory, never read.

use crate::alloc::{self, BufferAllocator, CustomBufferId};
use crate::error::Result;
use crate::extensions;
use crate::mime::MimeType;
use crate::options::Extensions;
use crate::uri::{self, Uri};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use std::path::{Path, PathBuf};

/// Base64 engine accepting payloads with or without trailing padding
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A reference to bytes that live outside the document
#[derive(Debug, Clone, PartialEq)]
pub struct UriSource {
    pub uri: Uri,
    pub mime_type: MimeType,
    /// Local file location joined with the base directory; `None` for remote URIs
    pub path: Option<PathBuf>,
}

/// Bytes decoded during parsing and owned by the asset
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySource {
    pub bytes: Vec<u8>,
    pub mime_type: MimeType,
}

/// Bytes stored in a buffer view of the same asset
#[derive(Debug, Clone, PartialEq)]
pub struct BufferViewSource {
    pub buffer_view: usize,
    pub mime_type: MimeType,
}

/// Bytes handed to a caller-supplied [`BufferAllocator`]
#[derive(Debug, Clone, PartialEq)]
pub struct CustomBufferSource {
    pub id: CustomBufferId,
    pub mime_type: MimeType,
}

/// Resolved origin of a buffer's or image's bytes
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Uri(UriSource),
    Array(ArraySource),
    BufferView(BufferViewSource),
    CustomBuffer(CustomBufferSource),
    /// The reference could not be classified; reported by validation
    Fallback { reason: String },
}

impl DataSource {
    /// MIME type recorded for the payload
    pub fn mime_type(&self) -> MimeType {
        match self {
            Self::Uri(s) => s.mime_type,
            Self::Array(s) => s.mime_type,
            Self::BufferView(s) => s.mime_type,
            Self::CustomBuffer(s) => s.mime_type,
            Self::Fallback { .. } => MimeType::None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub(crate) fn fallback(reason: impl Into<String>) -> Self {
        Self::Fallback {
            reason: reason.into(),
        }
    }
}

/// Which kind of entity a payload belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PayloadKind {
    Buffer,
    Image,
}

/// Raw reference as it appears in the document
#[derive(Debug, Clone, Copy)]
pub(crate) enum Reference<'a> {
    Uri(&'a str),
    BufferView(usize),
    /// The GLB binary chunk
    Embedded(&'a [u8]),
}

/// Everything resolution depends on besides the reference itself
pub(crate) struct Resolver<'a> {
    pub base_dir: &'a Path,
    pub enabled: Extensions,
    pub allocator: Option<&'a dyn BufferAllocator>,
}

impl<'a> Resolver<'a> {
    /// Classify a reference into a [`DataSource`]
    ///
    /// Only allocator failures are returned as errors; anything that cannot
    /// be classified, including an empty embedded payload, becomes
    /// [`DataSource::Fallback`].
    pub fn resolve(
        &self,
        reference: Reference<'_>,
        declared: MimeType,
        kind: PayloadKind,
    ) -> Result<DataSource> {
        match reference {
            Reference::BufferView(buffer_view) => Ok(DataSource::BufferView(BufferViewSource {
                buffer_view,
                mime_type: declared,
            })),
            Reference::Embedded(bytes) => self.own(bytes.to_vec(), declared),
            Reference::Uri(raw) => self.resolve_uri(raw, declared, kind),
        }
    }

    fn resolve_uri(&self, raw: &str, declared: MimeType, kind: PayloadKind) -> Result<DataSource> {
        let uri = match Uri::parse(raw) {
            Ok(uri) => uri,
            Err(err) => {
                log::warn!("Unresolvable URI {raw:?}: {err}");
                return Ok(DataSource::fallback(format!("{err} in {raw:?}")));
            }
        };

        if uri.is_data_uri() {
            return match decode_data_uri(uri.path()) {
                Ok((bytes, embedded_mime)) => {
                    let mime = if declared != MimeType::None {
                        declared
                    } else {
                        embedded_mime
                    };
                    self.own(bytes, mime)
                }
                Err(reason) => {
                    log::warn!("Malformed data URI: {reason}");
                    Ok(DataSource::fallback(reason))
                }
            };
        }

        let mime_type = if declared != MimeType::None {
            declared
        } else {
            self.infer_mime(&uri, kind)
        };
        let path = uri.fs_path(self.base_dir);

        Ok(DataSource::Uri(UriSource {
            uri,
            mime_type,
            path,
        }))
    }

    fn infer_mime(&self, uri: &Uri, kind: PayloadKind) -> MimeType {
        let Some(ext) = uri.file_extension() else {
            return MimeType::None;
        };
        match MimeType::from_core_extension(&ext) {
            MimeType::None if kind == PayloadKind::Image => {
                extensions::image_mime_for_extension(&ext, self.enabled)
            }
            mime => mime,
        }
    }

    fn own(&self, bytes: Vec<u8>, mime_type: MimeType) -> Result<DataSource> {
        if bytes.is_empty() {
            log::warn!("Embedded payload is empty");
            return Ok(DataSource::fallback("embedded payload is empty"));
        }
        match self.allocator {
            Some(allocator) => {
                let id = alloc::store(allocator, &bytes, mime_type)?;
                Ok(DataSource::CustomBuffer(CustomBufferSource { id, mime_type }))
            }
            None => Ok(DataSource::Array(ArraySource { bytes, mime_type })),
        }
    }
}

/// Decode the part of a `data:` URI after the scheme
///
/// Format: `[<mediatype>][;base64],<data>`
fn decode_data_uri(rest: &str) -> std::result::Result<(Vec<u8>, MimeType), String> {
    let comma = rest
        .find(',')
        .ok_or_else(|| "data URI has no ',' separator".to_string())?;
    let (header, payload) = (&rest[..comma], &rest[comma + 1..]);

    let mut params = header.split(';');
    let mime = params.next().map(MimeType::parse).unwrap_or_default();
    let is_base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        LENIENT_BASE64
            .decode(payload.trim())
            .map_err(|e| format!("invalid base64 payload: {e}"))?
    } else {
        uri::percent_decode_bytes(payload).map_err(|e| e.to_string())?
    };

    Ok((bytes, mime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::MemoryAllocator;

    fn resolver(enabled: Extensions) -> Resolver<'static> {
        Resolver {
            base_dir: Path::new("/models/lamp"),
            enabled,
            allocator: None,
        }
    }

    #[test]
    fn test_data_uri_decodes_into_array() {
        let source = resolver(Extensions::empty())
            .resolve(
                Reference::Uri("data:application/octet-stream;base64,AAECAw=="),
                MimeType::None,
                PayloadKind::Buffer,
            )
            .unwrap();

        match source {
            DataSource::Array(array) => {
                assert_eq!(array.bytes, vec![0, 1, 2, 3]);
                assert_eq!(array.mime_type, MimeType::OctetStream);
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn test_unpadded_base64_is_accepted() {
        let source = resolver(Extensions::empty())
            .resolve(
                Reference::Uri("data:image/png;base64,AAECAw"),
                MimeType::None,
                PayloadKind::Image,
            )
            .unwrap();
        assert_eq!(source.mime_type(), MimeType::Png);
    }

    #[test]
    fn test_relative_path_is_not_read() {
        let source = resolver(Extensions::empty())
            .resolve(Reference::Uri("buffer.bin"), MimeType::None, PayloadKind::Buffer)
            .unwrap();

        let DataSource::Uri(uri) = source else {
            panic!("expected URI source");
        };
        assert!(uri.uri.is_local_path());
        assert_eq!(uri.mime_type, MimeType::OctetStream);
        assert_eq!(uri.path, Some(PathBuf::from("/models/lamp/buffer.bin")));
    }

    #[test]
    fn test_ktx2_inferred_only_with_basisu() {
        let with = resolver(Extensions::KHR_TEXTURE_BASISU)
            .resolve(Reference::Uri("glass.ktx2"), MimeType::None, PayloadKind::Image)
            .unwrap();
        let without = resolver(Extensions::empty())
            .resolve(Reference::Uri("glass.ktx2"), MimeType::None, PayloadKind::Image)
            .unwrap();

        assert_eq!(with.mime_type(), MimeType::Ktx2);
        assert_eq!(without.mime_type(), MimeType::None);
    }

    #[test]
    fn test_declared_mime_wins() {
        let source = resolver(Extensions::empty())
            .resolve(Reference::Uri("texture.png"), MimeType::Jpeg, PayloadKind::Image)
            .unwrap();
        assert_eq!(source.mime_type(), MimeType::Jpeg);
    }

    #[test]
    fn test_remote_uri_is_classified_without_path() {
        let source = resolver(Extensions::empty())
            .resolve(
                Reference::Uri("https://cdn.example.com/a.png"),
                MimeType::None,
                PayloadKind::Image,
            )
            .unwrap();

        let DataSource::Uri(uri) = source else {
            panic!("expected URI source");
        };
        assert!(!uri.uri.is_local_path());
        assert_eq!(uri.path, None);
    }

    #[test]
    fn test_malformed_references_fall_back() {
        let r = resolver(Extensions::empty());
        for raw in ["data:image/png;base64", "data:;base64,@@@@", "bad%zzname.png", ""] {
            let source = r
                .resolve(Reference::Uri(raw), MimeType::None, PayloadKind::Image)
                .unwrap();
            assert!(source.is_fallback(), "{raw:?} should fall back");
        }
    }

    #[test]
    fn test_allocator_receives_embedded_bytes() {
        let allocator = MemoryAllocator::new();
        let r = Resolver {
            base_dir: Path::new("."),
            enabled: Extensions::empty(),
            allocator: Some(&allocator),
        };

        let source = r
            .resolve(Reference::Embedded(&[1, 2, 3]), MimeType::None, PayloadKind::Buffer)
            .unwrap();

        let DataSource::CustomBuffer(custom) = source else {
            panic!("expected custom buffer");
        };
        assert_eq!(allocator.read(custom.id), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_empty_payload_never_reaches_allocator() {
        let allocator = MemoryAllocator::new();
        let r = Resolver {
            base_dir: Path::new("."),
            enabled: Extensions::empty(),
            allocator: Some(&allocator),
        };

        let source = r
            .resolve(
                Reference::Uri("data:image/png;base64,"),
                MimeType::None,
                PayloadKind::Image,
            )
            .unwrap();
        assert!(source.is_fallback());
        assert_eq!(allocator.region_count(), 0);
    }

    #[test]
    fn test_buffer_view_reference() {
        let source = resolver(Extensions::empty())
            .resolve(Reference::BufferView(4), MimeType::Png, PayloadKind::Image)
            .unwrap();
        assert_eq!(
            source,
            DataSource::BufferView(BufferViewSource {
                buffer_view: 4,
                mime_type: MimeType::Png
            })
        );
    }
}
