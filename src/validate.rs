//! Cross-reference and value validation of a parsed [`Asset`]
//!
//! Validation is read-only and stops at the first violation. References
//! into a category that was never parsed are not checked.

use crate::error::{Error, Relation, Result};
use crate::extensions::{self, lights};
use crate::mime::MimeType;
use crate::model::{
    Accessor, AccessorType, Asset, CameraProjection, ComponentType, Primitive, TextureInfo,
};
use crate::options::{Category, Extensions};
use crate::source::DataSource;

/// Check every parsed category of `asset`
pub fn validate(asset: &Asset) -> Result<()> {
    let checks: [(Category, fn(&Asset) -> Result<()>); 14] = [
        (Category::BUFFERS, validate_buffers),
        (Category::BUFFER_VIEWS, validate_buffer_views),
        (Category::ACCESSORS, validate_accessors),
        (Category::IMAGES, validate_images),
        (Category::SAMPLERS, validate_samplers),
        (Category::TEXTURES, validate_textures),
        (Category::MATERIALS, validate_materials),
        (Category::MESHES, validate_meshes),
        (Category::SKINS, validate_skins),
        (Category::CAMERAS, validate_cameras),
        (Category::LIGHTS, validate_lights),
        (Category::ANIMATIONS, validate_animations),
        (Category::NODES, validate_nodes),
        (Category::SCENES, validate_scenes),
    ];

    for (category, check) in checks {
        if asset.is_parsed(category) {
            check(asset)?;
        }
    }
    Ok(())
}

/// Length of a target sequence, or `None` when its category was not parsed
fn bound(asset: &Asset, category: Category, len: usize) -> Option<usize> {
    asset.is_parsed(category).then_some(len)
}

fn reference(relation: Relation, index: usize, bound: Option<usize>) -> Result<()> {
    match bound {
        Some(bound) if index >= bound => Err(Error::InvalidReference {
            relation,
            index,
            bound,
        }),
        _ => Ok(()),
    }
}

fn data_source(source: &DataSource, path: &str) -> Result<()> {
    if let DataSource::Fallback { reason } = source {
        log::debug!("{path}: fallback data source ({reason})");
        return Err(Error::InvalidDataSource {
            path: path.to_string(),
        });
    }
    Ok(())
}

fn validate_buffers(asset: &Asset) -> Result<()> {
    for (i, buffer) in asset.buffers.iter().enumerate() {
        let path = format!("buffers[{i}]");
        data_source(&buffer.data, &path)?;
        if buffer.byte_length == 0 {
            return Err(Error::value(path, "byteLength must be at least 1"));
        }
        if let DataSource::Array(array) = &buffer.data {
            if array.bytes.len() < buffer.byte_length {
                return Err(Error::value(
                    path,
                    format!(
                        "holds {} bytes but byteLength is {}",
                        array.bytes.len(),
                        buffer.byte_length
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn validate_buffer_views(asset: &Asset) -> Result<()> {
    let buffers = bound(asset, Category::BUFFERS, asset.buffers.len());

    for (i, view) in asset.buffer_views.iter().enumerate() {
        let path = format!("bufferViews[{i}]");
        reference(Relation::BufferViewBuffer, view.buffer_index, buffers)?;

        if view.byte_length == 0 {
            return Err(Error::value(path, "byteLength must be at least 1"));
        }
        if let Some(stride) = view.byte_stride {
            if !(4..=252).contains(&stride) || stride % 4 != 0 {
                return Err(Error::value(
                    path,
                    format!("byteStride {stride} must be a multiple of 4 in 4..=252"),
                ));
            }
        }
        if buffers.is_some() {
            let buffer = &asset.buffers[view.buffer_index];
            let end = view.byte_offset.checked_add(view.byte_length);
            if end.map_or(true, |end| end > buffer.byte_length) {
                return Err(Error::value(
                    path,
                    format!(
                        "range {}+{} exceeds buffer {} of {} bytes",
                        view.byte_offset, view.byte_length, view.buffer_index, buffer.byte_length
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn validate_accessors(asset: &Asset) -> Result<()> {
    let views = bound(asset, Category::BUFFER_VIEWS, asset.buffer_views.len());

    for (i, accessor) in asset.accessors.iter().enumerate() {
        let path = format!("accessors[{i}]");

        if accessor.count == 0 {
            return Err(Error::value(path, "count must be at least 1"));
        }
        if accessor.byte_offset % accessor.component_type.byte_size() != 0 {
            return Err(Error::value(
                path,
                "byteOffset must be a multiple of the component size",
            ));
        }
        let components = accessor.accessor_type.component_count();
        for (key, bounds) in [("min", &accessor.min), ("max", &accessor.max)] {
            if matches!(bounds, Some(values) if values.len() != components) {
                return Err(Error::value(
                    path,
                    format!("{key} must have {components} components"),
                ));
            }
        }

        if let Some(view_index) = accessor.buffer_view_index {
            reference(Relation::AccessorBufferView, view_index, views)?;
            if views.is_some() {
                accessor_fits_view(asset, accessor, view_index, &path)?;
            }
        }

        if let Some(sparse) = &accessor.sparse {
            reference(
                Relation::SparseIndicesBufferView,
                sparse.indices_buffer_view,
                views,
            )?;
            reference(
                Relation::SparseValuesBufferView,
                sparse.values_buffer_view,
                views,
            )?;
            if !sparse.indices_component_type.is_unsigned_integer() {
                return Err(Error::value(
                    path,
                    "sparse indices must use an unsigned integer component type",
                ));
            }
            if sparse.count == 0 || sparse.count > accessor.count {
                return Err(Error::value(path, "sparse count must be in 1..=count"));
            }
        }
    }
    Ok(())
}

fn accessor_fits_view(asset: &Asset, accessor: &Accessor, view: usize, path: &str) -> Result<()> {
    let view = &asset.buffer_views[view];
    let element = accessor.element_size();
    let stride = view.byte_stride.unwrap_or(element);
    let needed = stride
        .checked_mul(accessor.count - 1)
        .and_then(|n| n.checked_add(element))
        .and_then(|n| n.checked_add(accessor.byte_offset));

    match needed {
        Some(needed) if needed <= view.byte_length => Ok(()),
        _ => Err(Error::value(
            path,
            format!(
                "{} elements of {element} bytes do not fit in a bufferView of {} bytes",
                accessor.count, view.byte_length
            ),
        )),
    }
}

fn validate_images(asset: &Asset) -> Result<()> {
    let views = bound(asset, Category::BUFFER_VIEWS, asset.buffer_views.len());

    for (i, image) in asset.images.iter().enumerate() {
        let path = format!("images[{i}]");
        data_source(&image.data, &path)?;
        if let Some(raw) = &image.unknown_mime_type {
            return Err(Error::InvalidMimeType {
                path,
                mime: raw.clone(),
            });
        }

        let mime = image.data.mime_type();
        if let DataSource::BufferView(source) = &image.data {
            reference(Relation::ImageBufferView, source.buffer_view, views)?;
            if mime == MimeType::None {
                return Err(Error::InvalidMimeType {
                    path,
                    mime: mime.to_string(),
                });
            }
        }
        if mime != MimeType::None && !extensions::is_accepted_image_mime(mime, asset.enabled) {
            return Err(Error::InvalidMimeType {
                path,
                mime: mime.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_samplers(asset: &Asset) -> Result<()> {
    for (i, sampler) in asset.samplers.iter().enumerate() {
        if matches!(sampler.mag_filter, Some(f) if !f.is_mag_filter()) {
            return Err(Error::value(
                format!("samplers[{i}]"),
                "magFilter must be NEAREST or LINEAR",
            ));
        }
    }
    Ok(())
}

fn validate_textures(asset: &Asset) -> Result<()> {
    let images = bound(asset, Category::IMAGES, asset.images.len());
    let samplers = bound(asset, Category::SAMPLERS, asset.samplers.len());

    for (i, texture) in asset.textures.iter().enumerate() {
        if let Some(image) = texture.image_index {
            reference(Relation::TextureImage, image, images)?;
        }
        if let Some(fallback) = texture.fallback_image_index {
            reference(Relation::TextureFallbackImage, fallback, images)?;
        }
        if let Some(sampler) = texture.sampler_index {
            reference(Relation::TextureSampler, sampler, samplers)?;
        }

        let path = format!("textures[{i}]");
        for field in texture.attached_extensions() {
            extensions::validate_field(asset, &field, &path)?;
        }
    }
    Ok(())
}

fn texture_info(asset: &Asset, info: &TextureInfo, path: &str) -> Result<()> {
    let textures = bound(asset, Category::TEXTURES, asset.textures.len());
    reference(Relation::MaterialTexture, info.texture_index, textures)?;
    for field in info.attached_extensions() {
        extensions::validate_field(asset, &field, path)?;
    }
    Ok(())
}

fn validate_materials(asset: &Asset) -> Result<()> {
    for (i, material) in asset.materials.iter().enumerate() {
        let path = format!("materials[{i}]");

        if !(material.alpha_cutoff >= 0.0) {
            return Err(Error::value(path, "alphaCutoff must be non-negative"));
        }
        for (slot, info) in material.texture_infos() {
            texture_info(asset, info, &format!("{path}.{slot}"))?;
        }
        for field in material.attached_extensions() {
            extensions::validate_field(asset, &field, &path)?;
        }
    }
    Ok(())
}

fn validate_meshes(asset: &Asset) -> Result<()> {
    let accessors = bound(asset, Category::ACCESSORS, asset.accessors.len());
    let materials = bound(asset, Category::MATERIALS, asset.materials.len());

    for (m, mesh) in asset.meshes.iter().enumerate() {
        if mesh.primitives.is_empty() {
            return Err(Error::value(
                format!("meshes[{m}]"),
                "must have at least one primitive",
            ));
        }
        for (p, primitive) in mesh.primitives.iter().enumerate() {
            let path = format!("meshes[{m}].primitives[{p}]");
            validate_primitive(asset, primitive, accessors, &path)?;
            if let Some(material) = primitive.material_index {
                reference(Relation::PrimitiveMaterial, material, materials)?;
            }
        }
    }
    Ok(())
}

fn validate_primitive(
    asset: &Asset,
    primitive: &Primitive,
    accessors: Option<usize>,
    path: &str,
) -> Result<()> {
    for attribute in &primitive.attributes {
        reference(
            Relation::PrimitiveAttribute,
            attribute.accessor_index,
            accessors,
        )?;
        if accessors.is_some() {
            let accessor = &asset.accessors[attribute.accessor_index];
            if !attribute_accepts(&attribute.name, accessor, asset.enabled) {
                return Err(Error::value(
                    format!("{path}.attributes.{}", attribute.name),
                    format!(
                        "accessor {} has type {:?}/{:?} which is not allowed here",
                        attribute.accessor_index, accessor.accessor_type, accessor.component_type
                    ),
                ));
            }
        }
    }

    if let Some(indices) = primitive.indices_accessor {
        reference(Relation::PrimitiveIndices, indices, accessors)?;
        if accessors.is_some() {
            let accessor = &asset.accessors[indices];
            if accessor.accessor_type != AccessorType::Scalar
                || !accessor.component_type.is_unsigned_integer()
            {
                return Err(Error::value(
                    format!("{path}.indices"),
                    "index accessor must be an unsigned integer SCALAR",
                ));
            }
        }
    }

    for target in &primitive.targets {
        for attribute in target {
            reference(
                Relation::MorphTargetAttribute,
                attribute.accessor_index,
                accessors,
            )?;
        }
    }
    Ok(())
}

/// Accessor layouts allowed for the standard vertex attributes
///
/// Custom (`_`-prefixed) and unknown semantics are not restricted.
fn attribute_accepts(name: &str, accessor: &Accessor, enabled: Extensions) -> bool {
    use AccessorType::*;
    use ComponentType::*;

    let quantized = enabled.contains(Extensions::KHR_MESH_QUANTIZATION);
    let ty = accessor.accessor_type;
    let ct = accessor.component_type;
    let norm = accessor.normalized;
    let semantic = name.split_once('_').map_or(name, |(base, _)| base);

    let float_or_unorm = ct == Float || (norm && matches!(ct, UnsignedByte | UnsignedShort));
    let float_or_snorm = ct == Float || (norm && matches!(ct, Byte | Short));

    match semantic {
        "POSITION" => ty == Vec3 && (ct == Float || (quantized && ct != UnsignedInt)),
        "NORMAL" => ty == Vec3 && (ct == Float || (quantized && float_or_snorm)),
        "TANGENT" => ty == Vec4 && (ct == Float || (quantized && float_or_snorm)),
        "TEXCOORD" => ty == Vec2 && (float_or_unorm || (quantized && ct != UnsignedInt)),
        "COLOR" => matches!(ty, Vec3 | Vec4) && float_or_unorm,
        "JOINTS" => ty == Vec4 && matches!(ct, UnsignedByte | UnsignedShort),
        "WEIGHTS" => ty == Vec4 && float_or_unorm,
        _ => true,
    }
}

fn validate_skins(asset: &Asset) -> Result<()> {
    let accessors = bound(asset, Category::ACCESSORS, asset.accessors.len());
    let nodes = bound(asset, Category::NODES, asset.nodes.len());

    for skin in &asset.skins {
        if let Some(matrices) = skin.inverse_bind_matrices {
            reference(Relation::SkinInverseBindMatrices, matrices, accessors)?;
        }
        if let Some(skeleton) = skin.skeleton {
            reference(Relation::SkinSkeleton, skeleton, nodes)?;
        }
        for &joint in &skin.joints {
            reference(Relation::SkinJoint, joint, nodes)?;
        }
    }
    Ok(())
}

fn validate_cameras(asset: &Asset) -> Result<()> {
    for (i, camera) in asset.cameras.iter().enumerate() {
        let valid = match camera.projection {
            CameraProjection::Perspective {
                aspect_ratio,
                yfov,
                zfar,
                znear,
            } => {
                yfov > 0.0
                    && znear > 0.0
                    && aspect_ratio.map_or(true, |a| a > 0.0)
                    && zfar.map_or(true, |far| far > znear)
            }
            CameraProjection::Orthographic {
                xmag,
                ymag,
                zfar,
                znear,
            } => xmag != 0.0 && ymag != 0.0 && znear >= 0.0 && zfar > znear,
        };
        if !valid {
            return Err(Error::value(
                format!("cameras[{i}]"),
                "projection parameters are out of range",
            ));
        }
    }
    Ok(())
}

fn validate_lights(asset: &Asset) -> Result<()> {
    for (i, light) in asset.lights.iter().enumerate() {
        lights::validate_light(light, &format!("lights[{i}]"))?;
    }
    Ok(())
}

fn validate_animations(asset: &Asset) -> Result<()> {
    let accessors = bound(asset, Category::ACCESSORS, asset.accessors.len());
    let nodes = bound(asset, Category::NODES, asset.nodes.len());

    for animation in &asset.animations {
        for channel in &animation.channels {
            reference(
                Relation::AnimationChannelSampler,
                channel.sampler_index,
                Some(animation.samplers.len()),
            )?;
            if let Some(node) = channel.node_index {
                reference(Relation::AnimationTargetNode, node, nodes)?;
            }
        }
        for sampler in &animation.samplers {
            reference(
                Relation::AnimationSamplerInput,
                sampler.input_accessor,
                accessors,
            )?;
            reference(
                Relation::AnimationSamplerOutput,
                sampler.output_accessor,
                accessors,
            )?;
        }
    }
    Ok(())
}

fn validate_nodes(asset: &Asset) -> Result<()> {
    let meshes = bound(asset, Category::MESHES, asset.meshes.len());
    let skins = bound(asset, Category::SKINS, asset.skins.len());
    let cameras = bound(asset, Category::CAMERAS, asset.cameras.len());
    let mut parents: Vec<Option<usize>> = vec![None; asset.nodes.len()];

    for (i, node) in asset.nodes.iter().enumerate() {
        let path = format!("nodes[{i}]");

        for &child in &node.children {
            reference(Relation::NodeChild, child, Some(asset.nodes.len()))?;
            if child == i {
                return Err(Error::value(path, "node lists itself as a child"));
            }
            if let Some(parent) = parents[child].replace(i) {
                return Err(Error::value(
                    format!("nodes[{child}]"),
                    format!("node has two parents ({parent} and {i})"),
                ));
            }
        }
        if let Some(mesh) = node.mesh_index {
            reference(Relation::NodeMesh, mesh, meshes)?;
        }
        if let Some(skin) = node.skin_index {
            reference(Relation::NodeSkin, skin, skins)?;
        }
        if let Some(camera) = node.camera_index {
            reference(Relation::NodeCamera, camera, cameras)?;
        }
        for field in node.attached_extensions() {
            extensions::validate_field(asset, &field, &path)?;
        }
    }

    // With at most one parent per node, anything not reachable from a root sits on a cycle
    let mut reached = vec![false; asset.nodes.len()];
    let mut stack: Vec<usize> = (0..asset.nodes.len())
        .filter(|&i| parents[i].is_none())
        .collect();
    while let Some(i) = stack.pop() {
        reached[i] = true;
        stack.extend(&asset.nodes[i].children);
    }
    if let Some(i) = reached.iter().position(|&r| !r) {
        return Err(Error::value(
            format!("nodes[{i}]"),
            "node is part of a cycle in the hierarchy",
        ));
    }
    Ok(())
}

/// Parent of every node, ignoring out-of-range children
fn node_parents(asset: &Asset) -> Vec<Option<usize>> {
    let mut parents = vec![None; asset.nodes.len()];
    for (i, node) in asset.nodes.iter().enumerate() {
        for &child in &node.children {
            if let Some(parent) = parents.get_mut(child) {
                *parent = Some(i);
            }
        }
    }
    parents
}

fn validate_scenes(asset: &Asset) -> Result<()> {
    let nodes = bound(asset, Category::NODES, asset.nodes.len());

    let parents = nodes.map(|_| node_parents(asset));

    for (s, scene) in asset.scenes.iter().enumerate() {
        for &node in &scene.node_indices {
            reference(Relation::SceneNode, node, nodes)?;
            if let Some(parent) = parents.as_ref().and_then(|p| p[node]) {
                return Err(Error::value(
                    format!("scenes[{s}]"),
                    format!("node {node} is not a root (child of node {parent})"),
                ));
            }
        }
    }
    if let Some(scene) = asset.default_scene {
        reference(Relation::DefaultScene, scene, Some(asset.scenes.len()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, Scene, Texture};

    fn parsed(categories: Category) -> Asset {
        Asset {
            parsed: categories,
            ..Default::default()
        }
    }

    #[test]
    fn test_unparsed_targets_are_skipped() {
        let mut asset = parsed(Category::TEXTURES);
        asset.textures.push(Texture {
            image_index: Some(40),
            sampler_index: Some(7),
            ..Default::default()
        });
        assert_eq!(validate(&asset), Ok(()));

        asset.parsed |= Category::SAMPLERS;
        assert_eq!(
            validate(&asset),
            Err(Error::InvalidReference {
                relation: Relation::TextureSampler,
                index: 7,
                bound: 0
            })
        );
    }

    #[test]
    fn test_self_child_and_shared_child() {
        let mut asset = parsed(Category::NODES);
        asset.nodes = vec![
            Node {
                children: vec![0],
                ..Default::default()
            },
            Node::default(),
        ];
        assert!(matches!(validate(&asset), Err(Error::InvalidValue { .. })));

        asset.nodes = vec![
            Node {
                children: vec![2],
                ..Default::default()
            },
            Node {
                children: vec![2],
                ..Default::default()
            },
            Node::default(),
        ];
        let err = validate(&asset).unwrap_err();
        assert!(err.to_string().contains("two parents"));
    }

    #[test]
    fn test_two_node_cycle() {
        let mut asset = parsed(Category::NODES | Category::SCENES);
        asset.nodes = vec![
            Node {
                children: vec![1],
                ..Default::default()
            },
            Node {
                children: vec![0],
                ..Default::default()
            },
            Node::default(),
        ];
        let err = validate(&asset).unwrap_err();
        assert!(err.to_string().contains("cycle"), "{err}");
    }

    #[test]
    fn test_scene_nodes_must_be_roots() {
        let mut asset = parsed(Category::NODES | Category::SCENES);
        asset.nodes = vec![
            Node {
                children: vec![1],
                ..Default::default()
            },
            Node::default(),
        ];
        asset.scenes.push(Scene {
            name: None,
            node_indices: vec![0, 1],
        });
        let err = validate(&asset).unwrap_err();
        assert!(err.to_string().contains("not a root"), "{err}");

        asset.scenes[0].node_indices = vec![0];
        assert_eq!(validate(&asset), Ok(()));
    }

    #[test]
    fn test_default_scene_checked() {
        let mut asset = parsed(Category::SCENES);
        asset.scenes.push(Scene::default());
        asset.default_scene = Some(1);
        assert_eq!(
            validate(&asset),
            Err(Error::InvalidReference {
                relation: Relation::DefaultScene,
                index: 1,
                bound: 1
            })
        );
    }

    #[test]
    fn test_quantized_positions_need_extension() {
        let accessor = Accessor {
            name: None,
            buffer_view_index: None,
            byte_offset: 0,
            component_type: ComponentType::Short,
            normalized: false,
            count: 1,
            accessor_type: AccessorType::Vec3,
            min: None,
            max: None,
            sparse: None,
        };
        assert!(!attribute_accepts("POSITION", &accessor, Extensions::empty()));
        assert!(attribute_accepts(
            "POSITION",
            &accessor,
            Extensions::KHR_MESH_QUANTIZATION
        ));
        assert!(attribute_accepts("_BATCHID", &accessor, Extensions::empty()));
    }

    #[test]
    fn test_fallback_source_reported() {
        let mut asset = parsed(Category::IMAGES);
        asset.images.push(crate::model::Image {
            name: None,
            data: DataSource::fallback("bad uri"),
            unknown_mime_type: None,
        });
        assert_eq!(
            validate(&asset),
            Err(Error::InvalidDataSource {
                path: "images[0]".to_string()
            })
        );
    }
}
