//! Cameras, animations, nodes and scenes

use super::ParseContext;
use crate::error::Result;
use crate::extensions::{self, ExtensionField, ExtensionTarget};
use crate::json::JsonObject;
use crate::model::{
    Animation, AnimationChannel, AnimationPath, AnimationSampler, Camera, CameraProjection,
    Interpolation, Node, NodeTransform, Scene, Transform,
};
use crate::options::{Category, Options};
use glam::Mat4;

pub(crate) fn parse_cameras(ctx: &ParseContext<'_>) -> Result<Vec<Camera>> {
    ctx.elements(Category::CAMERAS)?
        .iter()
        .map(|obj| {
            let kind = obj.required_str("type")?;
            let child = |key: &str| {
                obj.child(key)?
                    .ok_or_else(|| obj.field_error(key, &format!("is required for {kind} cameras")))
            };

            let projection = match kind {
                "perspective" => {
                    let p = child("perspective")?;
                    CameraProjection::Perspective {
                        aspect_ratio: p.f32("aspectRatio")?,
                        yfov: p.required_f32("yfov")?,
                        zfar: p.f32("zfar")?,
                        znear: p.required_f32("znear")?,
                    }
                }
                "orthographic" => {
                    let o = child("orthographic")?;
                    CameraProjection::Orthographic {
                        xmag: o.required_f32("xmag")?,
                        ymag: o.required_f32("ymag")?,
                        zfar: o.required_f32("zfar")?,
                        znear: o.required_f32("znear")?,
                    }
                }
                other => {
                    return Err(obj.field_error("type", &format!("has unknown value {other:?}")))
                }
            };

            Ok(Camera {
                name: obj.name()?,
                projection,
            })
        })
        .collect()
}

pub(crate) fn parse_animations(ctx: &ParseContext<'_>) -> Result<Vec<Animation>> {
    ctx.elements(Category::ANIMATIONS)?
        .iter()
        .map(|obj| {
            let channels = obj
                .child_array("channels")?
                .iter()
                .map(parse_channel)
                .collect::<Result<Vec<_>>>()?;
            let samplers = obj
                .child_array("samplers")?
                .iter()
                .map(parse_sampler)
                .collect::<Result<Vec<_>>>()?;

            Ok(Animation {
                name: obj.name()?,
                channels,
                samplers,
            })
        })
        .collect()
}

fn parse_channel(obj: &JsonObject<'_>) -> Result<AnimationChannel> {
    let target = obj
        .child("target")?
        .ok_or_else(|| obj.field_error("target", "is required"))?;
    let path = target.required_str("path")?;

    Ok(AnimationChannel {
        sampler_index: obj.required_index("sampler")?,
        node_index: target.index("node")?,
        path: AnimationPath::parse(path)
            .ok_or_else(|| target.field_error("path", &format!("has unknown value {path:?}")))?,
    })
}

fn parse_sampler(obj: &JsonObject<'_>) -> Result<AnimationSampler> {
    let interpolation = match obj.str("interpolation")? {
        Some(value) => Interpolation::parse(value).ok_or_else(|| {
            obj.field_error("interpolation", &format!("has unknown value {value:?}"))
        })?,
        None => Interpolation::default(),
    };

    Ok(AnimationSampler {
        input_accessor: obj.required_index("input")?,
        output_accessor: obj.required_index("output")?,
        interpolation,
    })
}

pub(crate) fn parse_nodes(ctx: &ParseContext<'_>) -> Result<Vec<Node>> {
    ctx.elements(Category::NODES)?
        .iter()
        .map(|obj| {
            let mut node = Node {
                name: obj.name()?,
                transform: parse_transform(obj, ctx.options)?,
                mesh_index: obj.index("mesh")?,
                skin_index: obj.index("skin")?,
                camera_index: obj.index("camera")?,
                lights_index: None,
                children: obj.indices("children")?,
                weights: obj.float_vec("weights")?.unwrap_or_default(),
            };

            for field in extensions::parse_attached(&ctx.hooks, obj, ExtensionTarget::Node)? {
                if let ExtensionField::NodeLight(light) = field {
                    node.lights_index = Some(light);
                }
            }
            Ok(node)
        })
        .collect()
}

fn parse_transform(obj: &JsonObject<'_>, options: Options) -> Result<NodeTransform> {
    if let Some(matrix) = obj.floats::<16>("matrix")? {
        if !options.contains(Options::DECOMPOSE_NODE_MATRICES) {
            return Ok(NodeTransform::Matrix(matrix));
        }
        let (scale, rotation, translation) =
            Mat4::from_cols_array(&matrix).to_scale_rotation_translation();
        return Ok(NodeTransform::Trs(Transform {
            translation: translation.to_array(),
            rotation: rotation.to_array(),
            scale: scale.to_array(),
        }));
    }

    let defaults = Transform::default();
    Ok(NodeTransform::Trs(Transform {
        translation: obj.floats_or("translation", defaults.translation)?,
        rotation: obj.floats_or("rotation", defaults.rotation)?,
        scale: obj.floats_or("scale", defaults.scale)?,
    }))
}

/// Scenes plus the top-level default scene index
pub(crate) fn parse_scenes(ctx: &ParseContext<'_>) -> Result<(Vec<Scene>, Option<usize>)> {
    let scenes = ctx
        .elements(Category::SCENES)?
        .iter()
        .map(|obj| {
            Ok(Scene {
                name: obj.name()?,
                node_indices: obj.indices("nodes")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((scenes, ctx.root.index("scene")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matrix_kept_unless_decomposing() {
        #[rustfmt::skip]
        let matrix = [
            2.0, 0.0, 0.0, 0.0,
            0.0, 2.0, 0.0, 0.0,
            0.0, 0.0, 2.0, 0.0,
            1.0, 2.0, 3.0, 1.0,
        ];
        let value = json!({ "matrix": matrix });
        let obj = JsonObject::new(&value, "nodes[0]").unwrap();

        assert_eq!(
            parse_transform(&obj, Options::empty()).unwrap(),
            NodeTransform::Matrix(matrix)
        );

        let NodeTransform::Trs(trs) =
            parse_transform(&obj, Options::DECOMPOSE_NODE_MATRICES).unwrap()
        else {
            panic!("expected decomposed transform");
        };
        assert_eq!(trs.translation, [1.0, 2.0, 3.0]);
        assert!((trs.scale[0] - 2.0).abs() < 1e-6);
        assert!((trs.rotation[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_trs_defaults() {
        let value = json!({ "translation": [0.0, 1.0, 0.0] });
        let obj = JsonObject::new(&value, "nodes[1]").unwrap();
        let NodeTransform::Trs(trs) = parse_transform(&obj, Options::empty()).unwrap() else {
            panic!("expected TRS");
        };
        assert_eq!(trs.translation, [0.0, 1.0, 0.0]);
        assert_eq!(trs.rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(trs.scale, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_channel_requires_known_path() {
        let value = json!({ "sampler": 0, "target": { "node": 1, "path": "pointer" } });
        let obj = JsonObject::new(&value, "animations[0].channels[0]").unwrap();
        let err = parse_channel(&obj).unwrap_err();
        assert!(err
            .to_string()
            .contains("animations[0].channels[0].target.path"));
    }
}
