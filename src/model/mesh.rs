//! Meshes and primitives

/// Type of primitive to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveType {
    pub fn from_gl(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Points),
            1 => Some(Self::Lines),
            2 => Some(Self::LineLoop),
            3 => Some(Self::LineStrip),
            4 => Some(Self::Triangles),
            5 => Some(Self::TriangleStrip),
            6 => Some(Self::TriangleFan),
            _ => None,
        }
    }
}

/// A named vertex attribute and the accessor supplying it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub accessor_index: usize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Primitive {
    pub attributes: Vec<Attribute>,
    pub indices_accessor: Option<usize>,
    pub material_index: Option<usize>,
    pub primitive_type: PrimitiveType,
    /// Morph targets, each a list of attribute displacements
    pub targets: Vec<Vec<Attribute>>,
}

impl Primitive {
    /// Look up an attribute's accessor by name
    pub fn find_attribute(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.accessor_index)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
    /// Default morph target weights
    pub weights: Vec<f32>,
}
