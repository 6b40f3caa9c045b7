//! Buffers, buffer views and accessors

use super::ParseContext;
use crate::error::Result;
use crate::json::JsonObject;
use crate::mime::MimeType;
use crate::model::{
    Accessor, AccessorType, Buffer, BufferTarget, BufferView, ComponentType, SparseAccessor,
};
use crate::options::Category;
use crate::source::{DataSource, PayloadKind, Reference};

pub(crate) fn parse_buffers(ctx: &ParseContext<'_>) -> Result<Vec<Buffer>> {
    ctx.elements(Category::BUFFERS)?
        .iter()
        .enumerate()
        .map(|(i, obj)| parse_buffer(ctx, i, obj))
        .collect()
}

fn parse_buffer(ctx: &ParseContext<'_>, index: usize, obj: &JsonObject<'_>) -> Result<Buffer> {
    let byte_length = obj.required_index("byteLength")?;

    let data = match obj.str("uri")? {
        Some(uri) => ctx
            .resolver
            .resolve(Reference::Uri(uri), MimeType::None, PayloadKind::Buffer)?,
        // Only the first buffer may refer to the GLB binary chunk
        None => match ctx.glb_bin {
            Some(bin) if index == 0 => ctx.resolver.resolve(
                Reference::Embedded(bin),
                MimeType::GltfBuffer,
                PayloadKind::Buffer,
            )?,
            _ => {
                log::warn!("{}: no uri and no GLB binary chunk", obj.path());
                DataSource::fallback("buffer has no uri and no GLB binary chunk")
            }
        },
    };

    Ok(Buffer {
        name: obj.name()?,
        byte_length,
        data,
    })
}

pub(crate) fn parse_buffer_views(ctx: &ParseContext<'_>) -> Result<Vec<BufferView>> {
    ctx.elements(Category::BUFFER_VIEWS)?
        .iter()
        .map(|obj| {
            let target = match obj.enum_code("target")? {
                Some(code) => Some(
                    BufferTarget::from_gl(code)
                        .ok_or_else(|| obj.field_error("target", "has an unknown value"))?,
                ),
                None => None,
            };
            Ok(BufferView {
                name: obj.name()?,
                buffer_index: obj.required_index("buffer")?,
                byte_offset: obj.index_or("byteOffset", 0)?,
                byte_length: obj.required_index("byteLength")?,
                byte_stride: obj.index("byteStride")?,
                target,
            })
        })
        .collect()
}

fn component_type(obj: &JsonObject<'_>) -> Result<ComponentType> {
    let code = obj
        .enum_code("componentType")?
        .ok_or_else(|| obj.field_error("componentType", "is required"))?;
    ComponentType::from_gl(code)
        .ok_or_else(|| obj.field_error("componentType", &format!("has unknown value {code}")))
}

pub(crate) fn parse_accessors(ctx: &ParseContext<'_>) -> Result<Vec<Accessor>> {
    ctx.elements(Category::ACCESSORS)?
        .iter()
        .map(parse_accessor)
        .collect()
}

fn parse_accessor(obj: &JsonObject<'_>) -> Result<Accessor> {
    let type_name = obj.required_str("type")?;
    let accessor_type = AccessorType::parse(type_name)
        .ok_or_else(|| obj.field_error("type", &format!("has unknown value {type_name:?}")))?;

    let sparse = match obj.child("sparse")? {
        Some(sparse) => Some(parse_sparse(&sparse)?),
        None => None,
    };

    Ok(Accessor {
        name: obj.name()?,
        buffer_view_index: obj.index("bufferView")?,
        byte_offset: obj.index_or("byteOffset", 0)?,
        component_type: component_type(obj)?,
        normalized: obj.bool_or("normalized", false)?,
        count: obj.required_index("count")?,
        accessor_type,
        min: obj.f64_vec("min")?,
        max: obj.f64_vec("max")?,
        sparse,
    })
}

fn parse_sparse(obj: &JsonObject<'_>) -> Result<SparseAccessor> {
    let indices = obj
        .child("indices")?
        .ok_or_else(|| obj.field_error("indices", "is required"))?;
    let values = obj
        .child("values")?
        .ok_or_else(|| obj.field_error("values", "is required"))?;

    Ok(SparseAccessor {
        count: obj.required_index("count")?,
        indices_buffer_view: indices.required_index("bufferView")?,
        indices_byte_offset: indices.index_or("byteOffset", 0)?,
        indices_component_type: component_type(&indices)?,
        values_buffer_view: values.required_index("bufferView")?,
        values_byte_offset: values.index_or("byteOffset", 0)?,
    })
}
