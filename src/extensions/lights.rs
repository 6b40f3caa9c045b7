//! `KHR_lights_punctual`: the root light collection and node attachments

use super::{ExtensionField, HookContext};
use crate::error::{Error, Relation, Result};
use crate::json::JsonObject;
use crate::model::{Asset, Light, LightType};
use crate::options::Category;
use std::f32::consts::FRAC_PI_2;

const NAME: &str = "KHR_lights_punctual";

/// Read `extensions.KHR_lights_punctual.lights` from the document root
///
/// A document without the extension object yields no lights.
pub(crate) fn parse_lights(root: &JsonObject<'_>) -> Result<Vec<Light>> {
    let Some(extensions) = root.child("extensions")? else {
        return Ok(Vec::new());
    };
    let Some(punctual) = extensions.child(NAME)? else {
        return Ok(Vec::new());
    };
    punctual
        .child_array("lights")?
        .iter()
        .map(parse_light)
        .collect()
}

fn parse_light(obj: &JsonObject<'_>) -> Result<Light> {
    let type_name = obj.required_str("type")?;
    let light_type = LightType::parse(type_name)
        .ok_or_else(|| obj.field_error("type", &format!("has unknown value {type_name:?}")))?;

    let mut light = Light {
        name: obj.name()?,
        light_type,
        color: obj.floats_or("color", [1.0, 1.0, 1.0])?,
        intensity: obj.f32_or("intensity", 1.0)?,
        range: obj.f32("range")?,
        inner_cone_angle: None,
        outer_cone_angle: None,
    };

    if light_type == LightType::Spot {
        let spot = obj
            .child("spot")?
            .ok_or_else(|| obj.field_error("spot", "is required for spot lights"))?;
        light.inner_cone_angle = spot.f32("innerConeAngle")?;
        light.outer_cone_angle = spot.f32("outerConeAngle")?;
    }

    Ok(light)
}

pub(crate) fn parse_node_light(_: &HookContext, obj: &JsonObject<'_>) -> Result<ExtensionField> {
    Ok(ExtensionField::NodeLight(obj.required_index("light")?))
}

pub(crate) fn validate_node_light(asset: &Asset, field: &ExtensionField, _: &str) -> Result<()> {
    let ExtensionField::NodeLight(index) = field else {
        return Ok(());
    };
    if asset.is_parsed(Category::LIGHTS) && *index >= asset.lights.len() {
        return Err(Error::InvalidReference {
            relation: Relation::NodeLight,
            index: *index,
            bound: asset.lights.len(),
        });
    }
    Ok(())
}

/// Value constraints of a single light
pub(crate) fn validate_light(light: &Light, path: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidExtensionData {
        extension: NAME,
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if !(light.intensity >= 0.0) {
        return Err(invalid("intensity must be non-negative"));
    }
    if light.color.iter().any(|c| !(*c >= 0.0)) {
        return Err(invalid("color components must be non-negative"));
    }
    if matches!(light.range, Some(range) if !(range > 0.0)) {
        return Err(invalid("range must be positive"));
    }
    if light.light_type == LightType::Spot {
        let (inner, outer) = (light.inner_cone(), light.outer_cone());
        if !(0.0 <= inner && inner < outer && outer <= FRAC_PI_2) {
            return Err(invalid(
                "cone angles must satisfy 0 <= innerConeAngle < outerConeAngle <= PI/2",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root_with(lights: serde_json::Value) -> serde_json::Value {
        json!({ "extensions": { "KHR_lights_punctual": { "lights": lights } } })
    }

    #[test]
    fn test_parse_point_light() {
        let value = root_with(json!([{
            "name": "Point",
            "type": "point",
            "color": [1.0, 0.63187497854232788, 0.23909975588321689],
            "intensity": 15.0
        }]));
        let root = JsonObject::new(&value, "").unwrap();
        let lights = parse_lights(&root).unwrap();

        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].name.as_deref(), Some("Point"));
        assert_eq!(lights[0].light_type, LightType::Point);
        assert_eq!(lights[0].intensity, 15.0);
        assert_eq!(lights[0].range, None);
    }

    #[test]
    fn test_spot_light_needs_spot_object() {
        let value = root_with(json!([{ "type": "spot" }]));
        let root = JsonObject::new(&value, "").unwrap();
        assert!(parse_lights(&root).is_err());
    }

    #[test]
    fn test_unknown_light_type() {
        let value = root_with(json!([{ "type": "area" }]));
        let root = JsonObject::new(&value, "").unwrap();
        assert!(matches!(parse_lights(&root), Err(Error::InvalidGltf(_))));
    }

    #[test]
    fn test_cone_ordering_enforced() {
        let light = Light {
            name: None,
            light_type: LightType::Spot,
            color: [1.0; 3],
            intensity: 2.0,
            range: None,
            inner_cone_angle: Some(0.8),
            outer_cone_angle: Some(0.5),
        };
        assert!(validate_light(&light, "lights[0]").is_err());

        let ok = Light {
            inner_cone_angle: Some(0.2),
            ..light
        };
        assert!(validate_light(&ok, "lights[0]").is_ok());
    }

    #[test]
    fn test_negative_intensity_rejected() {
        let light = Light {
            name: None,
            light_type: LightType::Point,
            color: [1.0; 3],
            intensity: -1.0,
            range: Some(10.0),
            inner_cone_angle: None,
            outer_cone_angle: None,
        };
        assert!(validate_light(&light, "lights[0]").is_err());
    }
}
