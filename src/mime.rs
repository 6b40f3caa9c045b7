//! MIME types for buffer and image payloads

use std::fmt;

/// Payload MIME types recognised by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MimeType {
    /// Not declared and not inferable
    #[default]
    None,
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
    /// `image/ktx2` (KHR_texture_basisu)
    Ktx2,
    /// `image/vnd-ms.dds` (MSFT_texture_dds)
    Dds,
    /// `image/webp` (EXT_texture_webp)
    Webp,
    /// `application/gltf-buffer`
    GltfBuffer,
    /// `application/octet-stream`
    OctetStream,
}

impl MimeType {
    /// Parse a MIME type string; unrecognised strings map to [`MimeType::None`]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/png" => Self::Png,
            "image/ktx2" => Self::Ktx2,
            "image/vnd-ms.dds" => Self::Dds,
            "image/webp" => Self::Webp,
            "application/gltf-buffer" => Self::GltfBuffer,
            "application/octet-stream" => Self::OctetStream,
            _ => Self::None,
        }
    }

    /// Get the MIME type string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Ktx2 => "image/ktx2",
            Self::Dds => "image/vnd-ms.dds",
            Self::Webp => "image/webp",
            Self::GltfBuffer => "application/gltf-buffer",
            Self::OctetStream => "application/octet-stream",
        }
    }

    /// Get the usual file extension for this type
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Jpeg => Some("jpg"),
            Self::Png => Some("png"),
            Self::Ktx2 => Some("ktx2"),
            Self::Dds => Some("dds"),
            Self::Webp => Some("webp"),
            Self::GltfBuffer | Self::OctetStream => Some("bin"),
        }
    }

    /// Infer a type from a file extension understood by core glTF
    ///
    /// Extension-specific containers (`.ktx2`, `.dds`, `.webp`) are not
    /// listed here; the extension registry adds them when enabled.
    pub fn from_core_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "bin" | "glbin" | "glbuf" => Self::OctetStream,
            _ => Self::None,
        }
    }

    /// Types every core glTF image may use
    pub fn is_core_image(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Png)
    }

    /// Check whether this is an image type
    pub fn is_image(&self) -> bool {
        matches!(
            self,
            Self::Jpeg | Self::Png | Self::Ktx2 | Self::Dds | Self::Webp
        )
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("<none>"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_known_types() {
        for mime in [
            MimeType::Jpeg,
            MimeType::Png,
            MimeType::Ktx2,
            MimeType::Dds,
            MimeType::Webp,
            MimeType::GltfBuffer,
            MimeType::OctetStream,
        ] {
            assert_eq!(MimeType::parse(mime.as_str()), mime);
        }
    }

    #[test]
    fn test_unknown_string_is_none() {
        assert_eq!(MimeType::parse("model/gltf+json"), MimeType::None);
        assert_eq!(MimeType::parse("IMAGE/PNG"), MimeType::Png);
    }

    #[test]
    fn test_core_extensions_exclude_compressed_containers() {
        assert_eq!(MimeType::from_core_extension("PNG"), MimeType::Png);
        assert_eq!(MimeType::from_core_extension("ktx2"), MimeType::None);
        assert!(!MimeType::Ktx2.is_core_image());
        assert!(MimeType::Ktx2.is_image());
    }
}
