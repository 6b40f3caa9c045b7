//! URI classification for buffer and image references

use std::fmt;
use std::path::{Path, PathBuf};

/// A parsed `uri` value from a buffer or image
///
/// Only the scheme and path are kept; query and fragment are dropped since
/// they never address local files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    raw: String,
    scheme: Option<String>,
    path: String,
}

/// Reasons a URI string could not be classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    Empty,
    InvalidScheme,
    InvalidPercentEncoding,
    NonUtf8Path,
}

impl fmt::Display for UriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Empty => "empty URI",
            Self::InvalidScheme => "malformed scheme",
            Self::InvalidPercentEncoding => "malformed percent-encoding",
            Self::NonUtf8Path => "percent-decoded path is not UTF-8",
        };
        f.write_str(reason)
    }
}

impl Uri {
    /// Parse and percent-decode a URI reference
    pub fn parse(raw: &str) -> Result<Self, UriError> {
        if raw.trim().is_empty() {
            return Err(UriError::Empty);
        }

        let (scheme, rest) = split_scheme(raw)?;

        // data: payloads are handled by the resolver and must not be decoded here
        if scheme.as_deref() == Some("data") {
            return Ok(Self {
                raw: raw.to_string(),
                scheme,
                path: rest.to_string(),
            });
        }

        let end = rest.find(['?', '#']).unwrap_or(rest.len());
        let mut path = percent_decode(&rest[..end])?;

        // Authority component of hierarchical URIs like file:///a or http://host/a
        if scheme.is_some() {
            if let Some(stripped) = path.strip_prefix("//") {
                path = match scheme.as_deref() {
                    Some("file") => stripped
                        .find('/')
                        .map(|i| stripped[i..].to_string())
                        .unwrap_or_default(),
                    _ => stripped.to_string(),
                };
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            scheme,
            path,
        })
    }

    /// The original, undecoded string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Lower-cased scheme, if any
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Percent-decoded path component
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_data_uri(&self) -> bool {
        self.scheme() == Some("data")
    }

    /// True for scheme-less references and `file:` URIs
    pub fn is_local_path(&self) -> bool {
        matches!(self.scheme(), None | Some("file"))
    }

    /// True for local paths that are not rooted
    pub fn is_relative_path(&self) -> bool {
        self.is_local_path() && self.scheme().is_none() && !Path::new(&self.path).has_root()
    }

    /// Lower-cased file extension of the path, if any
    pub fn file_extension(&self) -> Option<String> {
        Path::new(&self.path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    /// Resolve a local path against the document's base directory
    ///
    /// Returns `None` for remote and data URIs.
    pub fn fs_path(&self, base_dir: &Path) -> Option<PathBuf> {
        if !self.is_local_path() {
            return None;
        }
        let path = Path::new(&self.path);
        if path.has_root() {
            Some(path.to_path_buf())
        } else {
            Some(base_dir.join(path))
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn split_scheme(raw: &str) -> Result<(Option<String>, &str), UriError> {
    let Some(colon) = raw.find(':') else {
        return Ok((None, raw));
    };

    let candidate = &raw[..colon];
    // A colon after the first path separator belongs to the path
    if candidate.contains(['/', '\\', '?', '#']) {
        return Ok((None, raw));
    }
    // Single letters are Windows drive prefixes, not schemes
    if candidate.len() == 1 && candidate.as_bytes()[0].is_ascii_alphabetic() {
        return Ok((None, raw));
    }

    let mut chars = candidate.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return Err(UriError::InvalidScheme);
    }

    Ok((Some(candidate.to_ascii_lowercase()), &raw[colon + 1..]))
}

pub(crate) fn percent_decode(input: &str) -> Result<String, UriError> {
    if !input.contains('%') {
        return Ok(input.to_string());
    }
    String::from_utf8(percent_decode_bytes(input)?).map_err(|_| UriError::NonUtf8Path)
}

pub(crate) fn percent_decode_bytes(input: &str) -> Result<Vec<u8>, UriError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .ok_or(UriError::InvalidPercentEncoding)?;
            let hi = hex_value(hex[0]).ok_or(UriError::InvalidPercentEncoding)?;
            let lo = hex_value(hex[1]).ok_or(UriError::InvalidPercentEncoding)?;
            out.push(hi << 4 | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_is_local() {
        let uri = Uri::parse("textures/lamp%20glass.ktx2").unwrap();
        assert!(uri.is_local_path());
        assert!(uri.is_relative_path());
        assert_eq!(uri.path(), "textures/lamp glass.ktx2");
        assert_eq!(uri.file_extension().as_deref(), Some("ktx2"));
        assert_eq!(
            uri.fs_path(Path::new("/assets")),
            Some(PathBuf::from("/assets/textures/lamp glass.ktx2"))
        );
    }

    #[test]
    fn test_remote_uri_is_not_local() {
        let uri = Uri::parse("https://example.com/a/b.bin?x=1").unwrap();
        assert_eq!(uri.scheme(), Some("https"));
        assert_eq!(uri.path(), "example.com/a/b.bin");
        assert!(!uri.is_local_path());
        assert_eq!(uri.fs_path(Path::new(".")), None);
    }

    #[test]
    fn test_file_scheme_drops_authority() {
        let uri = Uri::parse("file:///tmp/model.bin").unwrap();
        assert!(uri.is_local_path());
        assert!(!uri.is_relative_path());
        assert_eq!(uri.path(), "/tmp/model.bin");
    }

    #[test]
    fn test_drive_letter_is_path() {
        let uri = Uri::parse("C:/models/a.png").unwrap();
        assert_eq!(uri.scheme(), None);
        assert!(uri.is_local_path());
    }

    #[test]
    fn test_malformed_inputs() {
        assert_eq!(Uri::parse(""), Err(UriError::Empty));
        assert_eq!(Uri::parse("a%2"), Err(UriError::InvalidPercentEncoding));
        assert_eq!(Uri::parse("a%zz.png"), Err(UriError::InvalidPercentEncoding));
        assert_eq!(Uri::parse("1ab:foo"), Err(UriError::InvalidScheme));
    }

    #[test]
    fn test_data_uri_is_not_decoded() {
        let uri = Uri::parse("data:application/octet-stream;base64,AAE%3D").unwrap();
        assert!(uri.is_data_uri());
        assert!(uri.path().ends_with("AAE%3D"));
    }
}
