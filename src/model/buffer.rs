//! Buffers, buffer views and accessors

use crate::source::DataSource;

/// A block of binary data
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    pub name: Option<String>,
    /// Declared length in bytes
    pub byte_length: usize,
    /// Where the bytes come from
    pub data: DataSource,
}

/// Intended GPU binding of a buffer view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    ArrayBuffer,
    ElementArrayBuffer,
}

impl BufferTarget {
    pub fn from_gl(value: u64) -> Option<Self> {
        match value {
            34962 => Some(Self::ArrayBuffer),
            34963 => Some(Self::ElementArrayBuffer),
            _ => None,
        }
    }
}

/// A contiguous byte range of a buffer
#[derive(Debug, Clone, PartialEq)]
pub struct BufferView {
    pub name: Option<String>,
    pub buffer_index: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
    pub target: Option<BufferTarget>,
}

/// Scalar type of accessor elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    UnsignedInt,
    Float,
}

impl ComponentType {
    pub fn from_gl(value: u64) -> Option<Self> {
        match value {
            5120 => Some(Self::Byte),
            5121 => Some(Self::UnsignedByte),
            5122 => Some(Self::Short),
            5123 => Some(Self::UnsignedShort),
            5125 => Some(Self::UnsignedInt),
            5126 => Some(Self::Float),
            _ => None,
        }
    }

    /// Size of one component in bytes
    pub fn byte_size(&self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::UnsignedInt | Self::Float => 4,
        }
    }

    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self,
            Self::UnsignedByte | Self::UnsignedShort | Self::UnsignedInt
        )
    }
}

/// Shape of accessor elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "SCALAR" => Some(Self::Scalar),
            "VEC2" => Some(Self::Vec2),
            "VEC3" => Some(Self::Vec3),
            "VEC4" => Some(Self::Vec4),
            "MAT2" => Some(Self::Mat2),
            "MAT3" => Some(Self::Mat3),
            "MAT4" => Some(Self::Mat4),
            _ => None,
        }
    }

    /// Number of components per element
    pub fn component_count(&self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// Sparse storage overriding some accessor elements
#[derive(Debug, Clone, PartialEq)]
pub struct SparseAccessor {
    pub count: usize,
    pub indices_buffer_view: usize,
    pub indices_byte_offset: usize,
    pub indices_component_type: ComponentType,
    pub values_buffer_view: usize,
    pub values_byte_offset: usize,
}

/// A typed view into a buffer view
#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub name: Option<String>,
    pub buffer_view_index: Option<usize>,
    pub byte_offset: usize,
    pub component_type: ComponentType,
    pub normalized: bool,
    pub count: usize,
    pub accessor_type: AccessorType,
    pub min: Option<Vec<f64>>,
    pub max: Option<Vec<f64>>,
    pub sparse: Option<SparseAccessor>,
}

impl Accessor {
    /// Size of one element without padding
    pub fn element_size(&self) -> usize {
        self.component_type.byte_size() * self.accessor_type.component_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_type_codes() {
        assert_eq!(ComponentType::from_gl(5126), Some(ComponentType::Float));
        assert_eq!(ComponentType::from_gl(5124), None);
        assert_eq!(ComponentType::UnsignedShort.byte_size(), 2);
    }

    #[test]
    fn test_element_size() {
        let accessor = Accessor {
            name: None,
            buffer_view_index: Some(0),
            byte_offset: 0,
            component_type: ComponentType::Float,
            normalized: false,
            count: 3,
            accessor_type: AccessorType::Mat3,
            min: None,
            max: None,
            sparse: None,
        };
        assert_eq!(accessor.element_size(), 36);
    }
}
