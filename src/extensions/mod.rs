//! Static registry of supported glTF extensions
//!
//! Each registered extension names the entity kinds it attaches to, an
//! optional parse hook producing an [`ExtensionField`] and an optional
//! validate hook checking that field against the rest of the asset.
//! Sub-parsers dispatch through [`parse_attached`]; the validator through
//! [`validate_field`].

pub(crate) mod lights;
pub(crate) mod materials;
pub(crate) mod texture;

use crate::error::Result;
use crate::json::JsonObject;
use crate::mime::MimeType;
use crate::model::{
    Asset, ImageSourceExtension, Material, MaterialClearcoat, MaterialSpecular,
    MaterialTransmission, Node, Texture, TextureInfo, TextureTransform,
};
use crate::options::Extensions;

/// Entity kinds an extension can attach a field to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionTarget {
    Texture,
    TextureInfo,
    Material,
    Node,
}

/// A field attached to a core entity by an extension
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionField {
    /// Alternate image for a texture
    ImageSource {
        extension: ImageSourceExtension,
        source: usize,
    },
    TextureTransform(TextureTransform),
    /// Index into [`Asset::lights`]
    NodeLight(usize),
    MaterialSpecular(MaterialSpecular),
    MaterialClearcoat(MaterialClearcoat),
    MaterialTransmission(MaterialTransmission),
    MaterialIor(f32),
    MaterialEmissiveStrength(f32),
    MaterialUnlit,
}

impl ExtensionField {
    /// Name of the extension that produced the field
    pub fn extension_name(&self) -> &'static str {
        match self {
            Self::ImageSource { extension, .. } => extension.extension_name(),
            Self::TextureTransform(_) => "KHR_texture_transform",
            Self::NodeLight(_) => "KHR_lights_punctual",
            Self::MaterialSpecular(_) => "KHR_materials_specular",
            Self::MaterialClearcoat(_) => "KHR_materials_clearcoat",
            Self::MaterialTransmission(_) => "KHR_materials_transmission",
            Self::MaterialIor(_) => "KHR_materials_ior",
            Self::MaterialEmissiveStrength(_) => "KHR_materials_emissive_strength",
            Self::MaterialUnlit => "KHR_materials_unlit",
        }
    }
}

impl ImageSourceExtension {
    pub fn extension_name(&self) -> &'static str {
        match self {
            Self::Basisu => "KHR_texture_basisu",
            Self::Dds => "MSFT_texture_dds",
            Self::Webp => "EXT_texture_webp",
        }
    }
}

/// State shared by parse hooks
pub(crate) struct HookContext {
    pub enabled: Extensions,
}

pub(crate) type ParseHook = fn(&HookContext, &JsonObject<'_>) -> Result<ExtensionField>;
pub(crate) type ValidateHook = fn(&Asset, &ExtensionField, &str) -> Result<()>;

/// One row of the registry
pub(crate) struct ExtensionDef {
    pub name: &'static str,
    pub flag: Extensions,
    pub targets: &'static [ExtensionTarget],
    /// Image MIME type this extension makes acceptable, with its file extension
    pub image_mime: Option<(MimeType, &'static str)>,
    pub parse: Option<ParseHook>,
    pub validate: Option<ValidateHook>,
}

/// Registry order is dispatch order: when several image-source extensions
/// are present on one texture the earliest enabled entry wins.
pub(crate) static REGISTRY: [ExtensionDef; 12] = [
    ExtensionDef {
        name: "KHR_texture_basisu",
        flag: Extensions::KHR_TEXTURE_BASISU,
        targets: &[ExtensionTarget::Texture],
        image_mime: Some((MimeType::Ktx2, "ktx2")),
        parse: Some(texture::parse_basisu),
        validate: Some(texture::validate_image_source),
    },
    ExtensionDef {
        name: "MSFT_texture_dds",
        flag: Extensions::MSFT_TEXTURE_DDS,
        targets: &[ExtensionTarget::Texture],
        image_mime: Some((MimeType::Dds, "dds")),
        parse: Some(texture::parse_dds),
        validate: Some(texture::validate_image_source),
    },
    ExtensionDef {
        name: "EXT_texture_webp",
        flag: Extensions::EXT_TEXTURE_WEBP,
        targets: &[ExtensionTarget::Texture],
        image_mime: Some((MimeType::Webp, "webp")),
        parse: Some(texture::parse_webp),
        validate: Some(texture::validate_image_source),
    },
    ExtensionDef {
        name: "KHR_texture_transform",
        flag: Extensions::KHR_TEXTURE_TRANSFORM,
        targets: &[ExtensionTarget::TextureInfo],
        image_mime: None,
        parse: Some(texture::parse_transform),
        validate: Some(texture::validate_transform),
    },
    ExtensionDef {
        name: "KHR_lights_punctual",
        flag: Extensions::KHR_LIGHTS_PUNCTUAL,
        targets: &[ExtensionTarget::Node],
        image_mime: None,
        parse: Some(lights::parse_node_light),
        validate: Some(lights::validate_node_light),
    },
    ExtensionDef {
        name: "KHR_materials_specular",
        flag: Extensions::KHR_MATERIALS_SPECULAR,
        targets: &[ExtensionTarget::Material],
        image_mime: None,
        parse: Some(materials::parse_specular),
        validate: Some(materials::validate_specular),
    },
    ExtensionDef {
        name: "KHR_materials_clearcoat",
        flag: Extensions::KHR_MATERIALS_CLEARCOAT,
        targets: &[ExtensionTarget::Material],
        image_mime: None,
        parse: Some(materials::parse_clearcoat),
        validate: Some(materials::validate_clearcoat),
    },
    ExtensionDef {
        name: "KHR_materials_transmission",
        flag: Extensions::KHR_MATERIALS_TRANSMISSION,
        targets: &[ExtensionTarget::Material],
        image_mime: None,
        parse: Some(materials::parse_transmission),
        validate: Some(materials::validate_transmission),
    },
    ExtensionDef {
        name: "KHR_materials_ior",
        flag: Extensions::KHR_MATERIALS_IOR,
        targets: &[ExtensionTarget::Material],
        image_mime: None,
        parse: Some(materials::parse_ior),
        validate: Some(materials::validate_ior),
    },
    ExtensionDef {
        name: "KHR_materials_emissive_strength",
        flag: Extensions::KHR_MATERIALS_EMISSIVE_STRENGTH,
        targets: &[ExtensionTarget::Material],
        image_mime: None,
        parse: Some(materials::parse_emissive_strength),
        validate: Some(materials::validate_emissive_strength),
    },
    ExtensionDef {
        name: "KHR_materials_unlit",
        flag: Extensions::KHR_MATERIALS_UNLIT,
        targets: &[ExtensionTarget::Material],
        image_mime: None,
        parse: Some(materials::parse_unlit),
        validate: None,
    },
    // Only changes which accessor component types vertex attributes may use
    ExtensionDef {
        name: "KHR_mesh_quantization",
        flag: Extensions::KHR_MESH_QUANTIZATION,
        targets: &[],
        image_mime: None,
        parse: None,
        validate: None,
    },
];

pub(crate) fn lookup(name: &str) -> Option<&'static ExtensionDef> {
    REGISTRY.iter().find(|def| def.name == name)
}

/// Names of every extension this crate understands
pub fn registered_extensions() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|def| def.name)
}

/// Bit controlling a registered extension, if it is registered
pub fn extension_flag(name: &str) -> Option<Extensions> {
    lookup(name).map(|def| def.flag)
}

/// MIME type an enabled image-source extension assigns to a file extension
pub(crate) fn image_mime_for_extension(file_extension: &str, enabled: Extensions) -> MimeType {
    REGISTRY
        .iter()
        .filter(|def| enabled.contains(def.flag))
        .filter_map(|def| def.image_mime)
        .find(|(_, ext)| ext.eq_ignore_ascii_case(file_extension))
        .map(|(mime, _)| mime)
        .unwrap_or(MimeType::None)
}

/// Whether images may use `mime` given the enabled extensions
pub(crate) fn is_accepted_image_mime(mime: MimeType, enabled: Extensions) -> bool {
    mime.is_core_image()
        || REGISTRY
            .iter()
            .filter(|def| enabled.contains(def.flag))
            .any(|def| matches!(def.image_mime, Some((accepted, _)) if accepted == mime))
}

/// Run the parse hooks of every enabled extension present on `entity`
///
/// Fields come back in registry order. Unregistered and disabled keys are
/// skipped.
pub(crate) fn parse_attached(
    ctx: &HookContext,
    entity: &JsonObject<'_>,
    target: ExtensionTarget,
) -> Result<Vec<ExtensionField>> {
    let Some(map) = entity.extensions()? else {
        return Ok(Vec::new());
    };

    let mut fields = Vec::new();
    for def in REGISTRY.iter().filter(|def| def.targets.contains(&target)) {
        let (Some(value), Some(hook)) = (map.get(def.name), def.parse) else {
            continue;
        };
        if !ctx.enabled.contains(def.flag) {
            log::trace!("{}: skipping disabled extension {}", entity.path(), def.name);
            continue;
        }
        let obj = JsonObject::new(value, format!("{}.extensions.{}", entity.path(), def.name))?;
        fields.push(hook(ctx, &obj)?);
    }

    if log::log_enabled!(log::Level::Trace) {
        for name in map.keys().filter(|name| lookup(name).is_none()) {
            log::trace!("{}: ignoring unregistered extension {name}", entity.path());
        }
    }

    Ok(fields)
}

/// Run the validate hook registered for `field`
pub(crate) fn validate_field(asset: &Asset, field: &ExtensionField, path: &str) -> Result<()> {
    match lookup(field.extension_name()).and_then(|def| def.validate) {
        Some(hook) => hook(asset, field, path),
        None => Ok(()),
    }
}

impl Texture {
    /// Extension fields carried by this texture
    pub fn attached_extensions(&self) -> Vec<ExtensionField> {
        match (self.image_extension, self.image_index) {
            (Some(extension), Some(source)) => {
                vec![ExtensionField::ImageSource { extension, source }]
            }
            _ => Vec::new(),
        }
    }
}

impl TextureInfo {
    pub fn attached_extensions(&self) -> Vec<ExtensionField> {
        self.transform
            .iter()
            .map(|t| ExtensionField::TextureTransform((**t).clone()))
            .collect()
    }
}

impl Material {
    /// Extension fields carried by this material, in registry order
    ///
    /// Texture references inside the fields are also reachable through
    /// [`Material::texture_infos`].
    pub fn attached_extensions(&self) -> Vec<ExtensionField> {
        let mut fields = Vec::new();
        if let Some(specular) = &self.specular {
            fields.push(ExtensionField::MaterialSpecular((**specular).clone()));
        }
        if let Some(clearcoat) = &self.clearcoat {
            fields.push(ExtensionField::MaterialClearcoat((**clearcoat).clone()));
        }
        if let Some(transmission) = &self.transmission {
            fields.push(ExtensionField::MaterialTransmission((**transmission).clone()));
        }
        if let Some(ior) = self.ior {
            fields.push(ExtensionField::MaterialIor(ior));
        }
        if let Some(strength) = self.emissive_strength {
            fields.push(ExtensionField::MaterialEmissiveStrength(strength));
        }
        if self.unlit {
            fields.push(ExtensionField::MaterialUnlit);
        }
        fields
    }

    /// Every texture reference of the material, extension slots included
    pub fn texture_infos(&self) -> Vec<(&'static str, &TextureInfo)> {
        let mut infos: Vec<_> = self.core_textures().collect();
        if let Some(specular) = &self.specular {
            infos.extend(slot("specularTexture", &specular.specular_texture));
            infos.extend(slot("specularColorTexture", &specular.specular_color_texture));
        }
        if let Some(clearcoat) = &self.clearcoat {
            infos.extend(slot("clearcoatTexture", &clearcoat.clearcoat_texture));
            infos.extend(slot(
                "clearcoatRoughnessTexture",
                &clearcoat.clearcoat_roughness_texture,
            ));
            infos.extend(slot("clearcoatNormalTexture", &clearcoat.clearcoat_normal_texture));
        }
        if let Some(transmission) = &self.transmission {
            infos.extend(slot("transmissionTexture", &transmission.transmission_texture));
        }
        infos
    }
}

fn slot<'a>(
    name: &'static str,
    info: &'a Option<TextureInfo>,
) -> Option<(&'static str, &'a TextureInfo)> {
    info.as_ref().map(|info| (name, info))
}

impl Node {
    pub fn attached_extensions(&self) -> Vec<ExtensionField> {
        self.lights_index
            .map(ExtensionField::NodeLight)
            .into_iter()
            .collect()
    }
}
