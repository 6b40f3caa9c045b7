//! Meshes and skins

use super::ParseContext;
use crate::error::Result;
use crate::json::JsonObject;
use crate::model::{Attribute, Mesh, Primitive, PrimitiveType, Skin};
use crate::options::Category;

pub(crate) fn parse_meshes(ctx: &ParseContext<'_>) -> Result<Vec<Mesh>> {
    ctx.elements(Category::MESHES)?
        .iter()
        .map(|obj| {
            if !obj.contains("primitives") {
                return Err(obj.field_error("primitives", "is required"));
            }
            let primitives = obj
                .child_array("primitives")?
                .iter()
                .map(parse_primitive)
                .collect::<Result<Vec<_>>>()?;

            Ok(Mesh {
                name: obj.name()?,
                primitives,
                weights: obj.float_vec("weights")?.unwrap_or_default(),
            })
        })
        .collect()
}

fn parse_primitive(obj: &JsonObject<'_>) -> Result<Primitive> {
    let attributes = obj
        .child("attributes")?
        .ok_or_else(|| obj.field_error("attributes", "is required"))?;

    let primitive_type = match obj.enum_code("mode")? {
        Some(code) => PrimitiveType::from_gl(code)
            .ok_or_else(|| obj.field_error("mode", &format!("has unknown value {code}")))?,
        None => PrimitiveType::default(),
    };

    let targets = obj
        .child_array("targets")?
        .iter()
        .map(parse_attributes)
        .collect::<Result<Vec<_>>>()?;

    Ok(Primitive {
        attributes: parse_attributes(&attributes)?,
        indices_accessor: obj.index("indices")?,
        material_index: obj.index("material")?,
        primitive_type,
        targets,
    })
}

/// Attribute name to accessor index pairs, in document key order
fn parse_attributes(obj: &JsonObject<'_>) -> Result<Vec<Attribute>> {
    obj.keys()
        .map(|name| {
            Ok(Attribute {
                name: name.clone(),
                accessor_index: obj.required_index(name)?,
            })
        })
        .collect()
}

pub(crate) fn parse_skins(ctx: &ParseContext<'_>) -> Result<Vec<Skin>> {
    ctx.elements(Category::SKINS)?
        .iter()
        .map(|obj| {
            Ok(Skin {
                name: obj.name()?,
                inverse_bind_matrices: obj.index("inverseBindMatrices")?,
                skeleton: obj.index("skeleton")?,
                joints: obj.indices("joints")?,
            })
        })
        .collect()
}
