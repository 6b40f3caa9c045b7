//! Scene hierarchy: nodes, scenes, skins and cameras

/// Spatial transform (translation, rotation, scale)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: [f32; 3],
    pub rotation: [f32; 4], // quaternion (x, y, z, w)
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0], // identity quaternion
            scale: [1.0; 3],
        }
    }
}

/// A node's local transform as declared
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeTransform {
    Trs(Transform),
    /// Column-major 4x4 matrix
    Matrix([f32; 16]),
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::Trs(Transform::default())
    }
}

/// A node in the scene hierarchy
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub name: Option<String>,
    pub transform: NodeTransform,
    pub mesh_index: Option<usize>,
    pub skin_index: Option<usize>,
    pub camera_index: Option<usize>,
    /// `KHR_lights_punctual` light attached to this node
    pub lights_index: Option<usize>,
    /// Indices of child nodes
    pub children: Vec<usize>,
    /// Morph weights overriding the mesh defaults
    pub weights: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub name: Option<String>,
    /// Root nodes of the scene
    pub node_indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skin {
    pub name: Option<String>,
    pub inverse_bind_matrices: Option<usize>,
    pub skeleton: Option<usize>,
    pub joints: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraProjection {
    Perspective {
        aspect_ratio: Option<f32>,
        yfov: f32,
        zfar: Option<f32>,
        znear: f32,
    },
    Orthographic {
        xmag: f32,
        ymag: f32,
        zfar: f32,
        znear: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: Option<String>,
    pub projection: CameraProjection,
}
