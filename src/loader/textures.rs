//! Images, samplers and textures

use super::ParseContext;
use crate::error::Result;
use crate::extensions::{self, ExtensionField, ExtensionTarget};
use crate::json::JsonObject;
use crate::mime::MimeType;
use crate::model::{Filter, Image, Sampler, Texture, Wrap};
use crate::options::Category;
use crate::source::{DataSource, PayloadKind, Reference};

pub(crate) fn parse_images(ctx: &ParseContext<'_>) -> Result<Vec<Image>> {
    ctx.elements(Category::IMAGES)?
        .iter()
        .map(|obj| {
            let raw_mime = obj.str("mimeType")?;
            let declared = raw_mime.map(MimeType::parse).unwrap_or_default();
            let unknown_mime_type = raw_mime
                .filter(|_| declared == MimeType::None)
                .map(str::to_string);

            let data = match (obj.str("uri")?, obj.index("bufferView")?) {
                (Some(uri), None) => {
                    ctx.resolver
                        .resolve(Reference::Uri(uri), declared, PayloadKind::Image)?
                }
                (None, Some(view)) => ctx.resolver.resolve(
                    Reference::BufferView(view),
                    declared,
                    PayloadKind::Image,
                )?,
                (Some(_), Some(_)) => {
                    DataSource::fallback("image declares both uri and bufferView")
                }
                (None, None) => DataSource::fallback("image declares neither uri nor bufferView"),
            };

            Ok(Image {
                name: obj.name()?,
                data,
                unknown_mime_type,
            })
        })
        .collect()
}

fn filter(obj: &JsonObject<'_>, key: &str) -> Result<Option<Filter>> {
    match obj.enum_code(key)? {
        Some(code) => Filter::from_gl(code)
            .map(Some)
            .ok_or_else(|| obj.field_error(key, &format!("has unknown value {code}"))),
        None => Ok(None),
    }
}

fn wrap(obj: &JsonObject<'_>, key: &str) -> Result<Wrap> {
    match obj.enum_code(key)? {
        Some(code) => Wrap::from_gl(code)
            .ok_or_else(|| obj.field_error(key, &format!("has unknown value {code}"))),
        None => Ok(Wrap::default()),
    }
}

pub(crate) fn parse_samplers(ctx: &ParseContext<'_>) -> Result<Vec<Sampler>> {
    ctx.elements(Category::SAMPLERS)?
        .iter()
        .map(|obj| {
            Ok(Sampler {
                name: obj.name()?,
                mag_filter: filter(obj, "magFilter")?,
                min_filter: filter(obj, "minFilter")?,
                wrap_s: wrap(obj, "wrapS")?,
                wrap_t: wrap(obj, "wrapT")?,
            })
        })
        .collect()
}

pub(crate) fn parse_textures(ctx: &ParseContext<'_>) -> Result<Vec<Texture>> {
    ctx.elements(Category::TEXTURES)?
        .iter()
        .map(|obj| {
            let mut texture = Texture {
                name: obj.name()?,
                image_index: obj.index("source")?,
                fallback_image_index: None,
                sampler_index: obj.index("sampler")?,
                image_extension: None,
            };

            let fields = extensions::parse_attached(&ctx.hooks, obj, ExtensionTarget::Texture)?;
            let chosen = fields.into_iter().find_map(|field| match field {
                ExtensionField::ImageSource { extension, source } => Some((extension, source)),
                _ => None,
            });
            // The extension image takes over; the core source becomes the fallback
            if let Some((extension, source)) = chosen {
                texture.fallback_image_index = texture.image_index.replace(source);
                texture.image_extension = Some(extension);
            }

            Ok(texture)
        })
        .collect()
}
