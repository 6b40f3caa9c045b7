//! Materials and texture references

use super::ParseContext;
use crate::error::Result;
use crate::extensions::{self, ExtensionField, ExtensionTarget, HookContext};
use crate::json::JsonObject;
use crate::model::{AlphaMode, Material, PbrData, TextureInfo};
use crate::options::Category;

/// Read a `textureInfo` object, including its attached transform
///
/// `normalTexture.scale` and `occlusionTexture.strength` are read by the
/// caller since they only exist on those slots.
pub(crate) fn parse_texture_info(ctx: &HookContext, obj: &JsonObject<'_>) -> Result<TextureInfo> {
    let mut info = TextureInfo::new(obj.required_index("index")?);
    info.tex_coord = obj.index_or("texCoord", 0)?;

    for field in extensions::parse_attached(ctx, obj, ExtensionTarget::TextureInfo)? {
        if let ExtensionField::TextureTransform(transform) = field {
            info.transform = Some(Box::new(transform));
        }
    }
    Ok(info)
}

fn texture_slot(
    ctx: &HookContext,
    obj: &JsonObject<'_>,
    key: &str,
    scale_key: Option<&str>,
) -> Result<Option<TextureInfo>> {
    let Some(child) = obj.child(key)? else {
        return Ok(None);
    };
    let mut info = parse_texture_info(ctx, &child)?;
    if let Some(scale_key) = scale_key {
        info.scale = child.f32_or(scale_key, 1.0)?;
    }
    Ok(Some(info))
}

pub(crate) fn parse_materials(ctx: &ParseContext<'_>) -> Result<Vec<Material>> {
    ctx.elements(Category::MATERIALS)?
        .iter()
        .map(|obj| parse_material(&ctx.hooks, obj))
        .collect()
}

fn parse_material(hooks: &HookContext, obj: &JsonObject<'_>) -> Result<Material> {
    let pbr_data = match obj.child("pbrMetallicRoughness")? {
        Some(pbr) => {
            let defaults = PbrData::default();
            Some(PbrData {
                base_color_factor: pbr.floats_or("baseColorFactor", defaults.base_color_factor)?,
                base_color_texture: texture_slot(hooks, &pbr, "baseColorTexture", None)?,
                metallic_factor: pbr.f32_or("metallicFactor", defaults.metallic_factor)?,
                roughness_factor: pbr.f32_or("roughnessFactor", defaults.roughness_factor)?,
                metallic_roughness_texture: texture_slot(
                    hooks,
                    &pbr,
                    "metallicRoughnessTexture",
                    None,
                )?,
            })
        }
        None => None,
    };

    let alpha_mode = match obj.str("alphaMode")? {
        Some(mode) => AlphaMode::parse(mode)
            .ok_or_else(|| obj.field_error("alphaMode", &format!("has unknown value {mode:?}")))?,
        None => AlphaMode::default(),
    };

    let mut material = Material {
        name: obj.name()?,
        pbr_data,
        normal_texture: texture_slot(hooks, obj, "normalTexture", Some("scale"))?,
        occlusion_texture: texture_slot(hooks, obj, "occlusionTexture", Some("strength"))?,
        emissive_texture: texture_slot(hooks, obj, "emissiveTexture", None)?,
        emissive_factor: obj.floats_or("emissiveFactor", [0.0, 0.0, 0.0])?,
        alpha_mode,
        alpha_cutoff: obj.f32_or("alphaCutoff", 0.5)?,
        double_sided: obj.bool_or("doubleSided", false)?,
        ..Default::default()
    };

    for field in extensions::parse_attached(hooks, obj, ExtensionTarget::Material)? {
        match field {
            ExtensionField::MaterialSpecular(s) => material.specular = Some(Box::new(s)),
            ExtensionField::MaterialClearcoat(c) => material.clearcoat = Some(Box::new(c)),
            ExtensionField::MaterialTransmission(t) => {
                material.transmission = Some(Box::new(t))
            }
            ExtensionField::MaterialIor(ior) => material.ior = Some(ior),
            ExtensionField::MaterialEmissiveStrength(s) => material.emissive_strength = Some(s),
            ExtensionField::MaterialUnlit => material.unlit = true,
            other => log::trace!("{}: ignoring {}", obj.path(), other.extension_name()),
        }
    }

    log::trace!(
        "Loaded material {}: {:?} (unlit: {})",
        obj.path(),
        material.name,
        material.unlit
    );
    Ok(material)
}
