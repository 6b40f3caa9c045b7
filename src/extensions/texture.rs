//! Texture extensions: alternate image sources and UV transforms

use super::{lookup, ExtensionField, HookContext};
use crate::error::{Error, Result};
use crate::json::JsonObject;
use crate::mime::MimeType;
use crate::model::{Asset, ImageSourceExtension, TextureTransform};

fn image_source(obj: &JsonObject<'_>, extension: ImageSourceExtension) -> Result<ExtensionField> {
    Ok(ExtensionField::ImageSource {
        extension,
        source: obj.required_index("source")?,
    })
}

pub(crate) fn parse_basisu(_: &HookContext, obj: &JsonObject<'_>) -> Result<ExtensionField> {
    image_source(obj, ImageSourceExtension::Basisu)
}

pub(crate) fn parse_dds(_: &HookContext, obj: &JsonObject<'_>) -> Result<ExtensionField> {
    image_source(obj, ImageSourceExtension::Dds)
}

pub(crate) fn parse_webp(_: &HookContext, obj: &JsonObject<'_>) -> Result<ExtensionField> {
    image_source(obj, ImageSourceExtension::Webp)
}

/// When the image's MIME type is known it must match the container
///
/// The image index itself is range-checked with the texture.
pub(crate) fn validate_image_source(
    asset: &Asset,
    field: &ExtensionField,
    path: &str,
) -> Result<()> {
    let ExtensionField::ImageSource { extension, source } = field else {
        return Ok(());
    };
    let Some(image) = asset.images.get(*source) else {
        return Ok(());
    };

    let expected = lookup(extension.extension_name()).and_then(|def| def.image_mime);
    let actual = image.data.mime_type();
    match expected {
        Some((mime, _)) if actual != MimeType::None && actual != mime => {
            Err(Error::InvalidMimeType {
                path: format!("{path} -> images[{source}]"),
                mime: actual.to_string(),
            })
        }
        _ => Ok(()),
    }
}

pub(crate) fn parse_transform(_: &HookContext, obj: &JsonObject<'_>) -> Result<ExtensionField> {
    let defaults = TextureTransform::default();
    Ok(ExtensionField::TextureTransform(TextureTransform {
        uv_offset: obj.floats_or("offset", defaults.uv_offset)?,
        rotation: obj.f32_or("rotation", defaults.rotation)?,
        uv_scale: obj.floats_or("scale", defaults.uv_scale)?,
        tex_coord: obj.index("texCoord")?,
    }))
}

pub(crate) fn validate_transform(_: &Asset, field: &ExtensionField, path: &str) -> Result<()> {
    let ExtensionField::TextureTransform(transform) = field else {
        return Ok(());
    };
    let finite = transform
        .uv_offset
        .iter()
        .chain(&transform.uv_scale)
        .chain(std::iter::once(&transform.rotation))
        .all(|v| v.is_finite());
    if finite {
        Ok(())
    } else {
        Err(Error::InvalidExtensionData {
            extension: field.extension_name(),
            path: path.to_string(),
            reason: "offset, rotation and scale must be finite".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Extensions;
    use serde_json::json;

    fn ctx() -> HookContext {
        HookContext {
            enabled: Extensions::all(),
        }
    }

    #[test]
    fn test_transform_defaults() {
        let value = json!({ "rotation": 1.5707963705062866 });
        let obj = JsonObject::new(&value, "t").unwrap();
        let ExtensionField::TextureTransform(t) = parse_transform(&ctx(), &obj).unwrap() else {
            panic!("expected transform");
        };
        assert_eq!(t.uv_offset, [0.0, 0.0]);
        assert_eq!(t.uv_scale, [1.0, 1.0]);
        assert_eq!(t.rotation, 1.5707963705062866f32);
        assert_eq!(t.tex_coord, None);
    }

    #[test]
    fn test_basisu_requires_source() {
        let value = json!({});
        let obj = JsonObject::new(&value, "textures[0].extensions.KHR_texture_basisu").unwrap();
        assert!(parse_basisu(&ctx(), &obj).is_err());
    }

    #[test]
    fn test_image_source_mime_must_match_container() {
        use crate::model::Image;
        use crate::source::{DataSource, UriSource};
        use crate::uri::Uri;

        let mut asset = Asset::default();
        asset.images.push(Image {
            name: None,
            data: DataSource::Uri(UriSource {
                uri: Uri::parse("albedo.png").unwrap(),
                mime_type: MimeType::Png,
                path: None,
            }),
            unknown_mime_type: None,
        });

        let field = ExtensionField::ImageSource {
            extension: ImageSourceExtension::Basisu,
            source: 0,
        };
        assert!(matches!(
            validate_image_source(&asset, &field, "textures[0]"),
            Err(Error::InvalidMimeType { .. })
        ));

        // Out-of-range sources are reported by the texture check, not here
        let missing = ExtensionField::ImageSource {
            extension: ImageSourceExtension::Basisu,
            source: 9,
        };
        assert_eq!(validate_image_source(&asset, &missing, "textures[0]"), Ok(()));
    }

    #[test]
    fn test_non_finite_transform_rejected() {
        let field = ExtensionField::TextureTransform(TextureTransform {
            rotation: f32::NAN,
            ..Default::default()
        });
        let err = validate_transform(&Asset::default(), &field, "materials[0]").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidExtensionData {
                extension: "KHR_texture_transform",
                ..
            }
        ));
    }
}
