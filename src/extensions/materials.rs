//! Material extensions

use super::{ExtensionField, HookContext};
use crate::error::{Error, Result};
use crate::json::JsonObject;
use crate::loader::materials::parse_texture_info;
use crate::model::{
    Asset, MaterialClearcoat, MaterialSpecular, MaterialTransmission, TextureInfo,
};

fn texture_slot(
    ctx: &HookContext,
    obj: &JsonObject<'_>,
    key: &str,
) -> Result<Option<TextureInfo>> {
    obj.child(key)?
        .map(|info| parse_texture_info(ctx, &info))
        .transpose()
}

pub(crate) fn parse_specular(ctx: &HookContext, obj: &JsonObject<'_>) -> Result<ExtensionField> {
    Ok(ExtensionField::MaterialSpecular(MaterialSpecular {
        specular_factor: obj.f32("specularFactor")?,
        specular_texture: texture_slot(ctx, obj, "specularTexture")?,
        specular_color_factor: obj.floats("specularColorFactor")?,
        specular_color_texture: texture_slot(ctx, obj, "specularColorTexture")?,
    }))
}

pub(crate) fn parse_clearcoat(ctx: &HookContext, obj: &JsonObject<'_>) -> Result<ExtensionField> {
    let clearcoat_normal_texture = match obj.child("clearcoatNormalTexture")? {
        Some(info) => {
            let mut normal = parse_texture_info(ctx, &info)?;
            normal.scale = info.f32_or("scale", 1.0)?;
            Some(normal)
        }
        None => None,
    };

    Ok(ExtensionField::MaterialClearcoat(MaterialClearcoat {
        clearcoat_factor: obj.f32_or("clearcoatFactor", 0.0)?,
        clearcoat_texture: texture_slot(ctx, obj, "clearcoatTexture")?,
        clearcoat_roughness_factor: obj.f32_or("clearcoatRoughnessFactor", 0.0)?,
        clearcoat_roughness_texture: texture_slot(ctx, obj, "clearcoatRoughnessTexture")?,
        clearcoat_normal_texture,
    }))
}

pub(crate) fn parse_transmission(
    ctx: &HookContext,
    obj: &JsonObject<'_>,
) -> Result<ExtensionField> {
    Ok(ExtensionField::MaterialTransmission(MaterialTransmission {
        transmission_factor: obj.f32_or("transmissionFactor", 0.0)?,
        transmission_texture: texture_slot(ctx, obj, "transmissionTexture")?,
    }))
}

pub(crate) fn parse_ior(_: &HookContext, obj: &JsonObject<'_>) -> Result<ExtensionField> {
    Ok(ExtensionField::MaterialIor(obj.f32_or("ior", 1.5)?))
}

pub(crate) fn parse_emissive_strength(
    _: &HookContext,
    obj: &JsonObject<'_>,
) -> Result<ExtensionField> {
    Ok(ExtensionField::MaterialEmissiveStrength(
        obj.f32_or("emissiveStrength", 1.0)?,
    ))
}

pub(crate) fn parse_unlit(_: &HookContext, _: &JsonObject<'_>) -> Result<ExtensionField> {
    Ok(ExtensionField::MaterialUnlit)
}

fn invalid(field: &ExtensionField, path: &str, reason: &str) -> Error {
    Error::InvalidExtensionData {
        extension: field.extension_name(),
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

fn unit_range(value: f32) -> bool {
    (0.0..=1.0).contains(&value)
}

pub(crate) fn validate_specular(_: &Asset, field: &ExtensionField, path: &str) -> Result<()> {
    let ExtensionField::MaterialSpecular(specular) = field else {
        return Ok(());
    };
    if matches!(specular.specular_factor, Some(f) if !unit_range(f)) {
        return Err(invalid(field, path, "specularFactor must be within [0, 1]"));
    }
    if matches!(specular.specular_color_factor, Some(c) if c.iter().any(|v| !(*v >= 0.0))) {
        return Err(invalid(field, path, "specularColorFactor must be non-negative"));
    }
    Ok(())
}

pub(crate) fn validate_clearcoat(_: &Asset, field: &ExtensionField, path: &str) -> Result<()> {
    let ExtensionField::MaterialClearcoat(clearcoat) = field else {
        return Ok(());
    };
    if !unit_range(clearcoat.clearcoat_factor) || !unit_range(clearcoat.clearcoat_roughness_factor)
    {
        return Err(invalid(field, path, "clearcoat factors must be within [0, 1]"));
    }
    Ok(())
}

pub(crate) fn validate_transmission(_: &Asset, field: &ExtensionField, path: &str) -> Result<()> {
    match field {
        ExtensionField::MaterialTransmission(t) if !unit_range(t.transmission_factor) => Err(
            invalid(field, path, "transmissionFactor must be within [0, 1]"),
        ),
        _ => Ok(()),
    }
}

/// Zero is allowed and means the material is not refractive
pub(crate) fn validate_ior(_: &Asset, field: &ExtensionField, path: &str) -> Result<()> {
    match field {
        ExtensionField::MaterialIor(ior) if !(*ior == 0.0 || *ior >= 1.0) => {
            Err(invalid(field, path, "ior must be 0 or at least 1"))
        }
        _ => Ok(()),
    }
}

pub(crate) fn validate_emissive_strength(
    _: &Asset,
    field: &ExtensionField,
    path: &str,
) -> Result<()> {
    match field {
        ExtensionField::MaterialEmissiveStrength(s) if !(*s >= 0.0) => {
            Err(invalid(field, path, "emissiveStrength must be non-negative"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Extensions;
    use serde_json::json;

    fn ctx(enabled: Extensions) -> HookContext {
        HookContext { enabled }
    }

    #[test]
    fn test_specular_keeps_absent_members_absent() {
        let value = json!({ "specularColorTexture": { "index": 2 } });
        let obj = JsonObject::new(&value, "materials[12].extensions.KHR_materials_specular")
            .unwrap();
        let ExtensionField::MaterialSpecular(specular) =
            parse_specular(&ctx(Extensions::KHR_MATERIALS_SPECULAR), &obj).unwrap()
        else {
            panic!("expected specular");
        };

        assert_eq!(specular.specular_factor, None);
        assert_eq!(specular.specular_color_factor, None);
        assert_eq!(
            specular.specular_color_texture.map(|t| t.texture_index),
            Some(2)
        );
    }

    #[test]
    fn test_nested_transform_follows_enabled_mask() {
        let value = json!({
            "clearcoatTexture": {
                "index": 0,
                "extensions": { "KHR_texture_transform": { "offset": [0.5, 0.0] } }
            }
        });
        let obj = JsonObject::new(&value, "m").unwrap();

        let field = parse_clearcoat(&ctx(Extensions::KHR_MATERIALS_CLEARCOAT), &obj).unwrap();
        let ExtensionField::MaterialClearcoat(c) = field else {
            panic!("expected clearcoat");
        };
        assert!(c.clearcoat_texture.as_ref().unwrap().transform.is_none());

        let enabled = Extensions::KHR_MATERIALS_CLEARCOAT | Extensions::KHR_TEXTURE_TRANSFORM;
        let ExtensionField::MaterialClearcoat(c) = parse_clearcoat(&ctx(enabled), &obj).unwrap()
        else {
            panic!("expected clearcoat");
        };
        let transform = c.clearcoat_texture.unwrap().transform.unwrap();
        assert_eq!(transform.uv_offset, [0.5, 0.0]);
    }

    #[test]
    fn test_value_ranges() {
        let asset = Asset::default();
        assert!(validate_ior(&asset, &ExtensionField::MaterialIor(0.0), "m").is_ok());
        assert!(validate_ior(&asset, &ExtensionField::MaterialIor(0.5), "m").is_err());
        assert!(validate_emissive_strength(
            &asset,
            &ExtensionField::MaterialEmissiveStrength(-2.0),
            "m"
        )
        .is_err());

        let too_shiny = ExtensionField::MaterialSpecular(MaterialSpecular {
            specular_factor: Some(1.5),
            ..Default::default()
        });
        assert!(validate_specular(&asset, &too_shiny, "m").is_err());
    }
}
